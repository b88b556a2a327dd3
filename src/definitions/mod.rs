//! Certification Definitions
//!
//! Immutable ladder, tier and rank configuration plus the derived lookup
//! indices the rest of the engine queries.
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────┐     ┌───────────────────┐
//! │ DefinitionSet    │────►│ DefinitionCatalog │
//! │ (JSON provider)  │     │ (derived indices) │
//! └──────────────────┘     └───────────────────┘
//!                                   │
//!              ┌────────────────────┼─────────────────────┐
//!              ▼                    ▼                     ▼
//!      certId → tier        permission → certIds    ranks (asc minTrust)
//! ```
//!
//! Validation of the definitions (duplicate ids, cost references) belongs to
//! the provider. The catalog indexes whatever it is handed.

mod catalog;
mod loader;
mod model;

pub use catalog::{DefinitionCatalog, FALLBACK_RANK_ID};
pub use loader::DefinitionSet;
pub use model::{
    CertId, CertificationLadder, CertificationTier, ExpiryMode, ExpiryPolicy, RankThreshold,
};
