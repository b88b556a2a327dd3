//! Trust & Certification Authorization
//!
//! Grants, revokes and expires certifications for the local profile, derives
//! rank from trust score, and answers permission checks.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌────────────────────┐
//! │ RankEvaluator    │────►│ TrustManager     │◄────│ PermissionResolver │
//! │ (score → rank)   │     │ (orchestrator)   │     │ (Can / Require)    │
//! └──────────────────┘     └──────────────────┘     └────────────────────┘
//!                            │      │      │
//!                            ▼      ▼      ▼
//!                    TrustState  AuditLog  PersistenceGateway
//!                            ▲
//!                            │
//!                  ┌─────────────────────┐
//!                  │ ExpirationEvaluator │
//!                  │ (caller-driven)     │
//!                  └─────────────────────┘
//! ```
//!
//! ## State Model
//!
//! - Records are created on first grant and only removed by a profile reset
//! - `is_active` implies `!is_expired`; expired records cannot be re-activated
//! - A definition version bump expires records earned under older versions
//! - Trust score never drops below zero; rank is re-derived on every change
//! - Faction changes zero the score and deactivate (not delete) every record

mod expiration;
mod manager;
mod permission;
mod rank;
mod state;

pub use expiration::{ExpirationEvaluator, ExpiredCertification, ExpiryCause};
pub use manager::TrustManager;
pub use permission::{DenialReason, PermissionDecision, PermissionResolver};
pub use rank::RankEvaluator;
pub use state::{CertificationRecord, Faction, TrustState};
