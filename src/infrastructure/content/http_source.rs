use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::application::ports::ContentSource;
use crate::domain::entities::{Ayah, Dua, DuaCategory, Surah, SurahSummary};
use crate::infrastructure::cache::MemoryCache;
use crate::shared::config::ContentConfig;
use crate::shared::error::AppError;

const MIN_SURAH: u32 = 1;
const MAX_SURAH: u32 = 114;

/// HTTP client for the reference-content provider. Raw response payloads are
/// held in a TTL'd memory cache for the provider's 24-hour stability window,
/// keyed by request path.
pub struct HttpContentSource {
    client: Client,
    base_url: String,
    responses: MemoryCache<Value>,
}

/// Chapter endpoints wrap their payload in a code/message envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: u16,
    message: Option<String>,
    data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SurahSummaryDto {
    nomor: u32,
    nama: String,
    nama_latin: String,
    jumlah_ayat: u32,
    tempat_turun: String,
    arti: String,
}

impl SurahSummaryDto {
    fn into_domain(self) -> SurahSummary {
        SurahSummary {
            number: self.nomor,
            name: self.nama,
            latin_name: self.nama_latin,
            verse_count: self.jumlah_ayat,
            revelation: self.tempat_turun,
            meaning: self.arti,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AyahDto {
    nomor_ayat: u32,
    teks_arab: String,
    teks_latin: String,
    teks_indonesia: String,
}

impl AyahDto {
    fn into_domain(self) -> Ayah {
        Ayah {
            number: self.nomor_ayat,
            arabic: self.teks_arab,
            transliteration: self.teks_latin,
            translation: self.teks_indonesia,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SurahDetailDto {
    #[serde(flatten)]
    summary: SurahSummaryDto,
    ayat: Vec<AyahDto>,
}

impl SurahDetailDto {
    fn into_domain(self) -> Surah {
        Surah {
            summary: self.summary.into_domain(),
            verses: self.ayat.into_iter().map(AyahDto::into_domain).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DuaDto {
    id: i64,
    category_id: i64,
    title_id: String,
    arabic_text: String,
    transliteration: Option<String>,
    meaning_id: String,
    reference: Option<String>,
    order: i64,
}

impl DuaDto {
    fn into_domain(self) -> Dua {
        Dua {
            id: self.id,
            category_id: self.category_id,
            title: self.title_id,
            arabic: self.arabic_text,
            transliteration: self.transliteration,
            translation: self.meaning_id,
            reference: self.reference,
            order: self.order,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DuaCategoryDto {
    id: i64,
    name_id: String,
    slug: String,
    order: i64,
    dua_count: Option<i64>,
}

impl DuaCategoryDto {
    fn into_domain(self) -> DuaCategory {
        DuaCategory {
            id: self.id,
            name: self.name_id,
            slug: self.slug,
            order: self.order,
            dua_count: self.dua_count,
        }
    }
}

impl HttpContentSource {
    pub fn new(config: &ContentConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            responses: MemoryCache::new(config.cache_ttl),
        })
    }

    /// Fetch an enveloped chapter endpoint, serving from the response cache
    /// when fresh.
    async fn fetch_enveloped(&self, path: &str) -> Result<Value, AppError> {
        if let Some(cached) = self.responses.get(path).await {
            debug!("provider response cache hit: {path}");
            return Ok(cached);
        }

        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::ContentSource(format!(
                "{path} returned {}",
                response.status()
            )));
        }
        let envelope: Envelope = response.json().await?;
        if envelope.code != 200 {
            return Err(AppError::ContentSource(envelope.message.unwrap_or_else(
                || format!("{path} returned provider code {}", envelope.code),
            )));
        }

        self.responses
            .set(path.to_string(), envelope.data.clone())
            .await;
        Ok(envelope.data)
    }

    /// Fetch a plain-array supplication endpoint.
    async fn fetch_plain(&self, path: &str) -> Result<Value, AppError> {
        if let Some(cached) = self.responses.get(path).await {
            debug!("provider response cache hit: {path}");
            return Ok(cached);
        }

        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::ContentSource(format!(
                "{path} returned {}",
                response.status()
            )));
        }
        let data: Value = response.json().await?;

        self.responses.set(path.to_string(), data.clone()).await;
        Ok(data)
    }
}

fn decode<T: serde::de::DeserializeOwned>(path: &str, data: Value) -> Result<T, AppError> {
    serde_json::from_value(data)
        .map_err(|err| AppError::ContentSource(format!("unexpected {path} payload: {err}")))
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn surah_index(&self) -> Result<Vec<SurahSummary>, AppError> {
        let data = self.fetch_enveloped("/surat").await?;
        let dtos: Vec<SurahSummaryDto> = decode("/surat", data)?;
        Ok(dtos.into_iter().map(SurahSummaryDto::into_domain).collect())
    }

    async fn surah_detail(&self, number: u32) -> Result<Surah, AppError> {
        if !(MIN_SURAH..=MAX_SURAH).contains(&number) {
            return Err(AppError::InvalidInput(format!(
                "surah number must be between {MIN_SURAH} and {MAX_SURAH}, got {number}"
            )));
        }
        let path = format!("/surat/{number}");
        let data = self.fetch_enveloped(&path).await?;
        let dto: SurahDetailDto = decode(&path, data)?;
        Ok(dto.into_domain())
    }

    async fn dua_categories(&self) -> Result<Vec<DuaCategory>, AppError> {
        let data = self.fetch_plain("/dua/categories").await?;
        let dtos: Vec<DuaCategoryDto> = decode("/dua/categories", data)?;
        Ok(dtos.into_iter().map(DuaCategoryDto::into_domain).collect())
    }

    async fn duas(&self) -> Result<Vec<Dua>, AppError> {
        let data = self.fetch_plain("/dua").await?;
        let dtos: Vec<DuaDto> = decode("/dua", data)?;
        Ok(dtos.into_iter().map(DuaDto::into_domain).collect())
    }
}
