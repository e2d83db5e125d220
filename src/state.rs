//! Session state facade
//!
//! Composes the codec and the configured backends into the uniform
//! key-value interface the protocol layer consumes. Credentials always go
//! through the relational store; keyed entries go to the cache when one is
//! configured, otherwise to the filesystem.

use futures::future::{join_all, try_join_all};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::codec::{self, StateValue};
use crate::config::StoreConfig;
use crate::error::Result;
use crate::hooks::ProtocolHooks;
use crate::storage::{FileKeyedStore, KeyedStore, RedisKeyedStore, SqlCredentialStore};

/// Entry category whose values are rebuilt into the protocol's app-state
/// key-data shape on read
pub const APP_STATE_SYNC_KEY: &str = "app-state-sync-key";

/// Per-session auth-state facade
///
/// A ready instance owns its session id and an in-memory copy of the
/// credentials record; construction fails rather than yielding a
/// half-initialized facade.
pub struct SessionState {
    session_id: String,
    credentials: RwLock<StateValue>,
    creds_store: SqlCredentialStore,
    keyed_store: Arc<dyn KeyedStore>,
    hooks: Arc<dyn ProtocolHooks>,
}

impl SessionState {
    /// Initialize state for a session: ensure the session directory exists,
    /// connect the backends, and load or create the credentials record
    pub async fn init(
        config: &StoreConfig,
        session_id: &str,
        hooks: Arc<dyn ProtocolHooks>,
    ) -> Result<Self> {
        // The directory is created even in cache mode; other parts of the
        // client expect the per-session path to exist
        let session_dir = config.session_dir(session_id);
        tokio::fs::create_dir_all(&session_dir).await?;

        let creds_store = SqlCredentialStore::connect(&config.database_url).await?;
        let keyed_store: Arc<dyn KeyedStore> = match &config.cache_url {
            Some(url) => Arc::new(RedisKeyedStore::connect(url, session_id).await?),
            None => Arc::new(FileKeyedStore::new(session_dir)?),
        };

        Self::with_backends(session_id, creds_store, keyed_store, hooks).await
    }

    /// Build a facade over explicit backends (for testing)
    pub async fn with_backends(
        session_id: &str,
        creds_store: SqlCredentialStore,
        keyed_store: Arc<dyn KeyedStore>,
        hooks: Arc<dyn ProtocolHooks>,
    ) -> Result<Self> {
        let credentials = match creds_store.load(session_id).await {
            Some(encoded) => codec::decode(&encoded)?,
            None => {
                let fresh = hooks.init_credentials();
                creds_store.save(session_id, &codec::encode(&fresh)).await;
                info!("Created fresh credentials for {}", session_id);
                fresh
            }
        };

        debug!("Session state ready for {}", session_id);
        Ok(Self {
            session_id: session_id.to_string(),
            credentials: RwLock::new(credentials),
            creds_store,
            keyed_store,
            hooks,
        })
    }

    /// Read a set of entries of one category concurrently
    ///
    /// Each id maps to `None` when the entry is absent or unreadable; one
    /// failed read never aborts the others. App-state sync keys are
    /// additionally rebuilt into the protocol's key-data shape.
    pub async fn get_entries(
        &self,
        category: &str,
        ids: &[&str],
    ) -> HashMap<String, Option<StateValue>> {
        let reads = ids.iter().map(|id| {
            let key = format!("{}-{}", category, id);
            async move {
                let value = self.keyed_store.read(&key).await;
                let value = match value {
                    Some(v) if category == APP_STATE_SYNC_KEY => {
                        Some(self.hooks.rebuild_sync_key(v))
                    }
                    other => other,
                };
                (id.to_string(), value)
            }
        });

        join_all(reads).await.into_iter().collect()
    }

    /// Write and remove entries across categories concurrently
    ///
    /// A present value writes the entry; an absent value removes it. The
    /// whole call rejects on the first failure.
    pub async fn set_entries(
        &self,
        data: &HashMap<String, HashMap<String, Option<StateValue>>>,
    ) -> Result<()> {
        let mut ops = Vec::new();
        for (category, entries) in data {
            for (id, value) in entries {
                let key = format!("{}-{}", category, id);
                ops.push(async move {
                    match value {
                        Some(value) => self.keyed_store.write(&key, value).await,
                        None => self.keyed_store.remove(&key).await,
                    }
                });
            }
        }

        try_join_all(ops).await?;
        Ok(())
    }

    /// Persist the in-memory credentials record; returns `false` on failure
    pub async fn save_credentials(&self) -> bool {
        let encoded = codec::encode(&*self.credentials.read().await);
        self.creds_store.save(&self.session_id, &encoded).await
    }

    /// Replace the in-memory credentials record
    pub async fn update_credentials(&self, credentials: StateValue) {
        *self.credentials.write().await = credentials;
    }

    /// Current in-memory credentials record
    pub async fn credentials(&self) -> StateValue {
        self.credentials.read().await.clone()
    }

    /// Tear down the session: best-effort removal of the credentials record
    pub async fn teardown(&self) {
        self.creds_store.delete(&self.session_id).await;
        info!("Tore down session {}", self.session_id);
    }

    /// The session this facade serves
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}
