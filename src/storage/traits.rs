//! Keyed-entry storage contract

use async_trait::async_trait;

use crate::codec::StateValue;
use crate::error::Result;

/// Contract shared by the keyed-entry backends
///
/// Reads are tolerant: absence and backend failures both resolve to `None`
/// (implementations log the failure). Writes and removals propagate their
/// errors; callers rely on a failed removal being observable.
#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// Create or overwrite an entry
    async fn write(&self, key: &str, value: &StateValue) -> Result<()>;

    /// Read an entry, `None` if absent or unreadable
    async fn read(&self, key: &str) -> Option<StateValue>;

    /// Remove an entry; removing a missing entry is an error
    async fn remove(&self, key: &str) -> Result<()>;
}
