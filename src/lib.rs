//! Trust Engine
//!
//! Certification and trust authorization for a single local player profile:
//! capability credentials earned along ladders of tiers, a trust score that
//! drives rank, and permission checks that gate actions elsewhere.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs          - Crate root with re-exports
//! ├── main.rs         - Host entrypoint
//! ├── config.rs       - Configuration management
//! ├── clock.rs        - System and manual clocks
//! ├── audit.rs        - Bounded in-memory audit trail
//! ├── definitions/    - Ladder, tier and rank definitions
//! │   ├── model.rs    - Definition data types
//! │   ├── catalog.rs  - Derived lookup indices
//! │   └── loader.rs   - JSON definitions provider
//! ├── trust/          - Authorization engine
//! │   ├── state.rs      - Profile state and transitions
//! │   ├── rank.rs       - Trust score → rank
//! │   ├── expiration.rs - Version and duration expiry
//! │   ├── permission.rs - Permission resolution
//! │   └── manager.rs    - Orchestrator
//! └── persistence/    - Profile snapshots
//!     ├── snapshot.rs - Snapshot format
//!     ├── file.rs     - JSON file gateway
//!     └── memory.rs   - In-memory gateway
//! ```

pub mod audit;
pub mod clock;
pub mod config;
pub mod definitions;
pub mod persistence;
pub mod trust;

// Re-export main types for convenience
pub use audit::{AuditAction, AuditEntry, AuditLog, DEFAULT_AUDIT_CAPACITY};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TrustConfig;
pub use definitions::{
    CertId, CertificationLadder, CertificationTier, DefinitionCatalog, DefinitionSet, ExpiryMode,
    ExpiryPolicy, RankThreshold,
};
pub use persistence::{
    JsonFileGateway, MemoryGateway, PersistenceGateway, ProfileSnapshot, SNAPSHOT_SCHEMA_VERSION,
};
pub use trust::{
    CertificationRecord, DenialReason, ExpirationEvaluator, ExpiredCertification, ExpiryCause,
    Faction, PermissionDecision, PermissionResolver, RankEvaluator, TrustManager, TrustState,
};
