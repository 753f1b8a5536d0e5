use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Idle,
    Downloading,
    Completed,
    Cancelled,
    Error,
}

/// Progress snapshot emitted while a bulk download runs. The stream
/// terminates with `Completed`, `Cancelled`, or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub current: u32,
    pub total: u32,
    pub percentage: u8,
    pub status: DownloadStatus,
    pub error: Option<String>,
}

impl DownloadProgress {
    pub fn downloading(current: u32, total: u32) -> Self {
        Self {
            current,
            total,
            percentage: percentage_of(current, total),
            status: DownloadStatus::Downloading,
            error: None,
        }
    }

    pub fn completed(current: u32, total: u32) -> Self {
        Self {
            current,
            total,
            percentage: percentage_of(current, total),
            status: DownloadStatus::Completed,
            error: None,
        }
    }

    pub fn cancelled(current: u32, total: u32) -> Self {
        Self {
            current,
            total,
            percentage: percentage_of(current, total),
            status: DownloadStatus::Cancelled,
            error: None,
        }
    }

    pub fn error(total: u32, message: impl Into<String>) -> Self {
        Self {
            current: 0,
            total,
            percentage: 0,
            status: DownloadStatus::Error,
            error: Some(message.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            DownloadStatus::Completed | DownloadStatus::Cancelled | DownloadStatus::Error
        )
    }
}

pub(crate) fn percentage_of(current: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    ((current as f64 / total as f64) * 100.0).round() as u8
}

/// Aggregate cache state, one flag and progress counter per collection.
/// A collection's `*_downloaded` flag is true only after a gap-free run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineStatus {
    pub quran_downloaded: bool,
    pub duas_downloaded: bool,
    pub last_quran_update: Option<DateTime<Utc>>,
    pub last_duas_update: Option<DateTime<Utc>>,
    pub quran_progress: u8,
    pub duas_progress: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage_of(0, 114), 0);
        assert_eq!(percentage_of(57, 114), 50);
        assert_eq!(percentage_of(113, 114), 99);
        assert_eq!(percentage_of(114, 114), 100);
        assert_eq!(percentage_of(1, 3), 33);
        assert_eq!(percentage_of(2, 3), 67);
    }

    #[test]
    fn percentage_of_empty_total_is_zero() {
        assert_eq!(percentage_of(0, 0), 0);
    }

    #[test]
    fn terminal_statuses() {
        assert!(DownloadProgress::completed(114, 114).is_terminal());
        assert!(DownloadProgress::cancelled(3, 114).is_terminal());
        assert!(DownloadProgress::error(114, "boom").is_terminal());
        assert!(!DownloadProgress::downloading(3, 114).is_terminal());
    }
}
