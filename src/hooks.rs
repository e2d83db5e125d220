//! Protocol-layer capabilities consumed by the store
//!
//! The surrounding client supplies both; the store treats them as opaque.

use crate::codec::StateValue;

/// Capabilities supplied by the protocol layer
pub trait ProtocolHooks: Send + Sync {
    /// Produce fresh initial credentials for a brand-new session
    fn init_credentials(&self) -> StateValue;

    /// Reconstruct stored app-state sync key material into the protocol's
    /// structured key-data shape
    fn rebuild_sync_key(&self, value: StateValue) -> StateValue;
}
