use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{LastReadReplaced, RemoteRecordStore};
use crate::domain::entities::{
    Bookmark, BookmarkDraft, LastRead, LastReadDraft, ReadingPosition,
};
use crate::domain::value_objects::{BookmarkId, BookmarkKind, LastReadKind, RefId};
use crate::shared::config::AccountConfig;
use crate::shared::error::AppError;

/// HTTP adapter over the account record API. The session token scopes every
/// request to the signed-in account; the server enforces bookmark uniqueness
/// per `(kind, ref_id)` and answers 409 on duplicates.
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    session_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookmarkDto {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    ref_id: i64,
    summary: Option<String>,
    url: Option<String>,
    created_at: DateTime<Utc>,
}

impl BookmarkDto {
    fn into_entity(self) -> Result<Bookmark, AppError> {
        let id = BookmarkId::new(self.id.to_string())
            .map_err(|err| AppError::Network(format!("malformed bookmark payload: {err}")))?;
        let kind = BookmarkKind::try_from(self.kind.as_str())
            .map_err(|err| AppError::Network(format!("malformed bookmark payload: {err}")))?;
        let ref_id = RefId::new(self.ref_id)
            .map_err(|err| AppError::Network(format!("malformed bookmark payload: {err}")))?;
        Ok(Bookmark::from_parts(
            id,
            kind,
            ref_id,
            self.summary,
            self.url,
            self.created_at,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LastReadDto {
    #[serde(rename = "type")]
    kind: String,
    surah_id: Option<i64>,
    ayah_number: Option<i64>,
    dua_id: Option<i64>,
    summary: Option<String>,
    url: Option<String>,
    updated_at: DateTime<Utc>,
}

impl LastReadDto {
    fn into_entity(self) -> Result<LastRead, AppError> {
        let kind = LastReadKind::try_from(self.kind.as_str())
            .map_err(|err| AppError::Network(format!("malformed last-read payload: {err}")))?;
        let position = match kind {
            LastReadKind::Quran => {
                let surah_id = self.surah_id.ok_or_else(|| {
                    AppError::Network("last-read payload missing surahId".to_string())
                })?;
                let ayah_number = self.ayah_number.ok_or_else(|| {
                    AppError::Network("last-read payload missing ayahNumber".to_string())
                })?;
                let surah_id = RefId::new(surah_id).map_err(|err| {
                    AppError::Network(format!("malformed last-read payload: {err}"))
                })?;
                ReadingPosition::quran(surah_id, ayah_number as u32).map_err(|err| {
                    AppError::Network(format!("malformed last-read payload: {err}"))
                })?
            }
            LastReadKind::Dua => {
                let dua_id = self.dua_id.ok_or_else(|| {
                    AppError::Network("last-read payload missing duaId".to_string())
                })?;
                let dua_id = RefId::new(dua_id).map_err(|err| {
                    AppError::Network(format!("malformed last-read payload: {err}"))
                })?;
                ReadingPosition::dua(dua_id)
            }
        };
        Ok(LastRead::from_parts(
            position,
            self.summary,
            self.url,
            self.updated_at,
        ))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookmarkPayload {
    #[serde(rename = "type")]
    kind: String,
    ref_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LastReadPayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    surah_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ayah_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dua_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

/// Mutation responses arrive as `{ "success": true, "data": … }`.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

fn error_for(status: StatusCode, context: &str) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(context.to_string()),
        StatusCode::CONFLICT => AppError::Conflict(context.to_string()),
        other => AppError::Network(format!("{context} returned {other}")),
    }
}

impl HttpRemoteStore {
    pub fn new(config: &AccountConfig, session_token: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session_token: session_token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn fetch_last_read(
        &self,
        kind: LastReadKind,
    ) -> Result<Option<LastRead>, AppError> {
        let response = self
            .client
            .get(self.url("/last-read"))
            .query(&[("type", kind.as_str())])
            .bearer_auth(&self.session_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_for(response.status(), "last-read fetch"));
        }
        let dto: Option<LastReadDto> = response.json().await?;
        dto.map(LastReadDto::into_entity).transpose()
    }
}

#[async_trait]
impl RemoteRecordStore for HttpRemoteStore {
    async fn add_bookmark(&self, draft: BookmarkDraft) -> Result<Bookmark, AppError> {
        let payload = BookmarkPayload {
            kind: draft.kind.as_str().to_string(),
            ref_id: draft.ref_id.value(),
            summary: draft.summary,
            url: draft.url,
        };
        let response = self
            .client
            .post(self.url("/bookmarks"))
            .bearer_auth(&self.session_token)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_for(response.status(), "bookmark create"));
        }
        let envelope: DataEnvelope<BookmarkDto> = response.json().await?;
        envelope.data.into_entity()
    }

    async fn remove_bookmark(
        &self,
        kind: BookmarkKind,
        ref_id: RefId,
    ) -> Result<Option<Bookmark>, AppError> {
        // The delete endpoint is keyed by server id, so resolve it first.
        let bookmarks = self.list_bookmarks(Some(kind)).await?;
        let Some(existing) = bookmarks.into_iter().find(|b| b.matches(kind, ref_id)) else {
            return Ok(None);
        };

        let response = self
            .client
            .delete(self.url(&format!("/bookmarks/{}", existing.id())))
            .bearer_auth(&self.session_token)
            .send()
            .await?;
        match response.status() {
            status if status.is_success() => Ok(Some(existing)),
            // Already gone on the server; nothing left to roll back.
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(error_for(status, "bookmark delete")),
        }
    }

    async fn list_bookmarks(
        &self,
        kind: Option<BookmarkKind>,
    ) -> Result<Vec<Bookmark>, AppError> {
        let mut request = self
            .client
            .get(self.url("/bookmarks"))
            .bearer_auth(&self.session_token);
        if let Some(kind) = kind {
            request = request.query(&[("type", kind.as_str())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(error_for(response.status(), "bookmark list"));
        }
        let dtos: Vec<BookmarkDto> = response.json().await?;
        dtos.into_iter().map(BookmarkDto::into_entity).collect()
    }

    async fn set_last_read(&self, draft: LastReadDraft) -> Result<LastReadReplaced, AppError> {
        let kind = draft.position.kind();
        // Capture the record being superseded so callers can restore it.
        let previous = self.fetch_last_read(kind).await?;

        let (surah_id, ayah_number, dua_id) = match draft.position {
            ReadingPosition::Quran {
                surah_id,
                ayah_number,
            } => (Some(surah_id.value()), Some(ayah_number as i64), None),
            ReadingPosition::Dua { dua_id } => (None, None, Some(dua_id.value())),
        };
        let payload = LastReadPayload {
            kind: kind.as_str().to_string(),
            surah_id,
            ayah_number,
            dua_id,
            summary: draft.summary,
            url: draft.url,
        };

        let response = self
            .client
            .put(self.url("/last-read"))
            .bearer_auth(&self.session_token)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_for(response.status(), "last-read update"));
        }
        let envelope: DataEnvelope<LastReadDto> = response.json().await?;
        Ok(LastReadReplaced {
            current: envelope.data.into_entity()?,
            previous,
        })
    }

    async fn get_last_read(&self, kind: LastReadKind) -> Result<Option<LastRead>, AppError> {
        self.fetch_last_read(kind).await
    }
}
