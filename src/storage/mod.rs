//! Storage backends for session auth state
//!
//! Credentials always live in the relational store. Keyed entries go to the
//! cache backend when one is configured, otherwise to the filesystem.

mod cache;
mod file;
mod sql;
mod traits;

pub use cache::RedisKeyedStore;
pub use file::FileKeyedStore;
pub use sql::SqlCredentialStore;
pub use traits::KeyedStore;
