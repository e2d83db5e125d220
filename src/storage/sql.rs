//! Relational credentials backend
//!
//! Store of record for the Credentials Record, one row per session id.
//! The forgiving error policy here is a behavioral contract the callers
//! depend on: existence checks and loads resolve to "absent" on backend
//! failure so a first-run client can still bootstrap, and save/delete
//! report failure without raising.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, error, warn};

use crate::error::Result;

/// Relational store for credentials records
pub struct SqlCredentialStore {
    pool: SqlitePool,
}

impl SqlCredentialStore {
    /// Connect to the database, creating it and the credentials table if
    /// missing
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS credentials (
                 session_id TEXT PRIMARY KEY,
                 creds TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await?;

        debug!("Credential store ready at {}", database_url);
        Ok(Self { pool })
    }

    /// True iff a credentials record exists for the session; backend errors
    /// resolve to `false`
    pub async fn exists(&self, session_id: &str) -> bool {
        match self.exists_inner(session_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Credential existence check failed for {}: {}", session_id, e);
                false
            }
        }
    }

    async fn exists_inner(&self, session_id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM credentials WHERE session_id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Create-or-update the credentials record; returns `false` on failure
    pub async fn save(&self, session_id: &str, encoded: &str) -> bool {
        match self.save_inner(session_id, encoded).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save credentials for {}: {}", session_id, e);
                false
            }
        }
    }

    async fn save_inner(&self, session_id: &str, encoded: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO credentials (session_id, creds) VALUES (?, ?)
             ON CONFLICT(session_id) DO UPDATE SET creds = excluded.creds",
        )
        .bind(session_id)
        .bind(encoded)
        .execute(&self.pool)
        .await?;

        debug!("Saved credentials for {}", session_id);
        Ok(())
    }

    /// Load the encoded credentials record, `None` if absent or on any
    /// backend error
    pub async fn load(&self, session_id: &str) -> Option<String> {
        match self.load_inner(session_id).await {
            Ok(creds) => creds,
            Err(e) => {
                warn!("Failed to load credentials for {}: {}", session_id, e);
                None
            }
        }
    }

    async fn load_inner(&self, session_id: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT creds FROM credentials WHERE session_id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("creds")?)),
            None => Ok(None),
        }
    }

    /// Best-effort removal of the credentials record
    pub async fn delete(&self, session_id: &str) {
        let result = sqlx::query("DELETE FROM credentials WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => debug!("Deleted credentials for {}", session_id),
            Err(e) => warn!("Failed to delete credentials for {}: {}", session_id, e),
        }
    }
}
