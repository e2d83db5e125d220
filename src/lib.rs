//! # auth-store
//!
//! Session authentication state persistence for a messaging-protocol client:
//! - Lossless textual codec for structured, binary-bearing values
//! - Credentials in a relational store; keyed entries in a distributed cache
//!   or on the local filesystem, selected at construction
//! - A per-session facade with concurrent bulk get/set/remove over named
//!   entries

pub mod codec;
pub mod config;
pub mod error;
pub mod hooks;
pub mod state;
pub mod storage;

pub use codec::{decode, encode, StateValue};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use hooks::ProtocolHooks;
pub use state::{SessionState, APP_STATE_SYNC_KEY};
pub use storage::{FileKeyedStore, KeyedStore, RedisKeyedStore, SqlCredentialStore};
