//! Client configuration from the environment

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// `SOCIALSYNC_DB_PATH` value that keeps everything in memory
const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub backend_url: String,
    /// `None` selects the in-memory store
    pub db_path: Option<PathBuf>,
    /// Correlates every chat turn of this process
    pub session_id: String,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend_url = get("SOCIALSYNC_BACKEND_URL")
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let db_path = match get("SOCIALSYNC_DB_PATH") {
            Some(path) if path == IN_MEMORY => None,
            Some(path) => Some(PathBuf::from(path)),
            None => {
                let home = get("HOME").unwrap_or_else(|| "/tmp".to_string());
                Some(PathBuf::from(format!("{home}/.socialsync/socialsync.db")))
            }
        };

        let session_id =
            get("SOCIALSYNC_SESSION_ID").unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let timeout_secs = match get("SOCIALSYNC_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Ignoring unparseable SOCIALSYNC_TIMEOUT_SECS");
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            backend_url,
            db_path,
            session_id,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}
