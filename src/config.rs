//! Store configuration
//!
//! The cache toggle is an explicit value injected at construction rather
//! than read from the environment at call sites. `from_env` exists as a
//! bridge for deployments that still configure through environment
//! variables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a session auth-state store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Root directory holding one subdirectory per session
    pub root_dir: PathBuf,

    /// Relational store URL (e.g. "sqlite://auth/credentials.db")
    pub database_url: String,

    /// Cache URL; when set, keyed entries are served by the cache backend
    /// instead of the filesystem
    pub cache_url: Option<String>,
}

impl StoreConfig {
    /// Build configuration from environment variables, falling back to the
    /// defaults used for local runs
    pub fn from_env() -> Self {
        let root_dir = std::env::var("AUTH_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("auth_state"));
        let database_url = std::env::var("AUTH_STORE_DB")
            .unwrap_or_else(|_| "sqlite://auth_state/credentials.db".to_string());
        let cache_url = std::env::var("AUTH_STORE_REDIS_URL").ok();

        Self {
            root_dir,
            database_url,
            cache_url,
        }
    }

    /// Whether keyed entries are served by the cache backend
    pub fn cache_enabled(&self) -> bool {
        self.cache_url.is_some()
    }

    /// Directory holding one session's keyed-entry files
    pub fn session_dir(&self, session_id: &str) -> PathBuf {
        self.root_dir.join(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_dir() {
        let config = StoreConfig {
            root_dir: PathBuf::from("/data/auth"),
            database_url: "sqlite://creds.db".to_string(),
            cache_url: None,
        };

        assert_eq!(
            config.session_dir("session-1"),
            PathBuf::from("/data/auth/session-1")
        );
        assert!(!config.cache_enabled());
    }

    #[test]
    fn test_cache_enabled() {
        let config = StoreConfig {
            root_dir: PathBuf::from("/data/auth"),
            database_url: "sqlite://creds.db".to_string(),
            cache_url: Some("redis://127.0.0.1/".to_string()),
        };

        assert!(config.cache_enabled());
    }
}
