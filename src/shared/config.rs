use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub content: ContentConfig,
    pub account: AccountConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    pub base_url: String,
    pub request_timeout: u64,
    /// Provider responses are assumed stable for 24 hours.
    pub cache_ttl: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub base_url: String,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Courtesy delay between chapter fetches during a bulk download.
    pub request_delay_ms: u64,
    pub progress_buffer: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: 5,
                connection_timeout: 30,
            },
            content: ContentConfig {
                base_url: "https://equran.id/api/v2".to_string(),
                request_timeout: 30,
                cache_ttl: 24 * 60 * 60,
            },
            account: AccountConfig {
                base_url: "https://taslim.app/api".to_string(),
                request_timeout: 30,
            },
            download: DownloadConfig::default(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 100,
            progress_buffer: 32,
        }
    }
}

fn default_database_url() -> String {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("./data"))
        .join("taslim");
    format!("sqlite:{}", dir.join("taslim.db").display())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("TASLIM_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("TASLIM_DATABASE_MAX_CONNECTIONS") {
            if let Some(value) = parse_u32(&v) {
                cfg.database.max_connections = value;
            }
        }
        if let Ok(v) = std::env::var("TASLIM_CONTENT_BASE_URL") {
            if !v.trim().is_empty() {
                cfg.content.base_url = v;
            }
        }
        if let Ok(v) = std::env::var("TASLIM_CONTENT_CACHE_TTL") {
            if let Some(value) = parse_u64(&v) {
                cfg.content.cache_ttl = value;
            }
        }
        if let Ok(v) = std::env::var("TASLIM_ACCOUNT_BASE_URL") {
            if !v.trim().is_empty() {
                cfg.account.base_url = v;
            }
        }
        if let Ok(v) = std::env::var("TASLIM_DOWNLOAD_DELAY_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.download.request_delay_ms = value;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.database.url.trim().is_empty() {
            return Err("Database url cannot be empty".to_string());
        }
        if self.content.base_url.trim().is_empty() {
            return Err("Content base_url cannot be empty".to_string());
        }
        if self.account.base_url.trim().is_empty() {
            return Err("Account base_url cannot be empty".to_string());
        }
        if self.download.progress_buffer == 0 {
            return Err("Download progress_buffer must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
