//! Profile Persistence
//!
//! Snapshot format and the gateways that store it. The engine calls
//! [`PersistenceGateway::save`] after every mutating operation and once at
//! shutdown; failures are the caller's to log, never fatal.

mod file;
mod memory;
mod snapshot;

pub use file::JsonFileGateway;
pub use memory::MemoryGateway;
pub use snapshot::{ProfileSnapshot, SNAPSHOT_SCHEMA_VERSION};

use anyhow::Result;

/// Storage backend for the single local profile
pub trait PersistenceGateway {
    /// Load the stored snapshot. `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<ProfileSnapshot>>;

    fn save(&self, snapshot: &ProfileSnapshot) -> Result<()>;
}
