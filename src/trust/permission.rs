//! Permission resolution against held certifications.

use super::state::TrustState;
use crate::definitions::{CertId, DefinitionCatalog};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a permission check was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DenialReason {
    MissingCertification,
    CertificationExpired,
    CertificationInactive,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::MissingCertification => "Missing certification",
            DenialReason::CertificationExpired => "Certification expired",
            DenialReason::CertificationInactive => "Certification inactive",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a permission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionDecision {
    /// Granted by the first usable candidate certification
    Allowed { cert_id: CertId },
    Denied(DenialReason),
}

impl PermissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PermissionDecision::Allowed { .. })
    }

    /// Denial text, empty when allowed
    pub fn reason(&self) -> &'static str {
        match self {
            PermissionDecision::Allowed { .. } => "",
            PermissionDecision::Denied(reason) => reason.as_str(),
        }
    }

    pub fn denial(&self) -> Option<DenialReason> {
        match self {
            PermissionDecision::Allowed { .. } => None,
            PermissionDecision::Denied(reason) => Some(*reason),
        }
    }

    /// `(allowed, reason)` pair for callers that branch on plain values
    pub fn as_tuple(&self) -> (bool, &'static str) {
        (self.is_allowed(), self.reason())
    }
}

/// Resolves permissions through every certification declaring them.
///
/// Holding any active, unexpired candidate is enough; expired or inactive
/// candidates elsewhere in the list do not block it.
#[derive(Debug, Clone, Copy)]
pub struct PermissionResolver<'a> {
    catalog: &'a DefinitionCatalog,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(catalog: &'a DefinitionCatalog) -> Self {
        Self { catalog }
    }

    pub fn can(&self, state: Option<&TrustState>, permission: &str) -> PermissionDecision {
        let Some(state) = state else {
            return PermissionDecision::Denied(DenialReason::MissingCertification);
        };

        let mut found_expired = false;
        let mut found_inactive = false;

        // Blank permissions have no candidates
        for cert_id in self.catalog.certs_granting_permission(permission) {
            let Some(record) = state.record(cert_id.as_str()) else {
                continue;
            };
            if record.is_expired {
                found_expired = true;
            } else if !record.is_active {
                found_inactive = true;
            } else {
                return PermissionDecision::Allowed {
                    cert_id: cert_id.clone(),
                };
            }
        }

        let reason = if found_expired {
            DenialReason::CertificationExpired
        } else if found_inactive {
            DenialReason::CertificationInactive
        } else {
            DenialReason::MissingCertification
        };
        PermissionDecision::Denied(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{CertificationLadder, CertificationTier};
    use crate::trust::Faction;
    use chrono::{DateTime, Utc};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn catalog() -> DefinitionCatalog {
        DefinitionCatalog::new(
            vec![
                CertificationLadder::new("pilot", "flight")
                    .with_tier(CertificationTier::new(1, "c1").with_permissions(["p1"]))
                    .with_tier(CertificationTier::new(2, "c2").with_permissions(["p1", "p2"])),
                CertificationLadder::new("salvage", "industry")
                    .with_tier(CertificationTier::new(1, "c3").with_permissions(["p1"])),
            ],
            Vec::new(),
        )
    }

    fn expire(state: &mut TrustState, cert_id: &str) {
        for record in state.records_mut() {
            if record.cert_id.as_str() == cert_id {
                record.is_expired = true;
                record.is_active = false;
            }
        }
    }

    #[test]
    fn test_missing_state_or_blank_permission() {
        let catalog = catalog();
        let resolver = PermissionResolver::new(&catalog);
        let state = TrustState::new("p1", Faction::neutral(), &catalog);

        assert_eq!(
            resolver.can(None, "p1"),
            PermissionDecision::Denied(DenialReason::MissingCertification)
        );
        assert_eq!(resolver.can(Some(&state), "").as_tuple(), (false, "Missing certification"));
        assert_eq!(
            resolver.can(Some(&state), "unknown").as_tuple(),
            (false, "Missing certification")
        );
        assert_eq!(resolver.can(Some(&state), "p1").as_tuple(), (false, "Missing certification"));
    }

    #[test]
    fn test_active_candidate_wins_over_expired_one() {
        let catalog = catalog();
        let mut state = TrustState::new("p1", Faction::neutral(), &catalog);
        state.grant_certification(&catalog, "c1", now());
        state.grant_certification(&catalog, "c2", now());
        expire(&mut state, "c1");

        let decision = PermissionResolver::new(&catalog).can(Some(&state), "p1");
        assert_eq!(decision, PermissionDecision::Allowed { cert_id: CertId::new("c2") });
        assert_eq!(decision.as_tuple(), (true, ""));
    }

    #[test]
    fn test_first_usable_candidate_is_reported() {
        let catalog = catalog();
        let mut state = TrustState::new("p1", Faction::neutral(), &catalog);
        state.grant_certification(&catalog, "c3", now());
        state.grant_certification(&catalog, "c1", now());

        let decision = PermissionResolver::new(&catalog).can(Some(&state), "p1");
        assert_eq!(decision, PermissionDecision::Allowed { cert_id: CertId::new("c1") });
    }

    #[test]
    fn test_expired_outranks_inactive_reason() {
        let catalog = catalog();
        let mut state = TrustState::new("p1", Faction::neutral(), &catalog);
        state.grant_certification(&catalog, "c1", now());
        state.grant_certification(&catalog, "c3", now());
        state.revoke_certification("c1");
        expire(&mut state, "c3");

        let decision = PermissionResolver::new(&catalog).can(Some(&state), "p1");
        assert_eq!(decision.denial(), Some(DenialReason::CertificationExpired));
        assert_eq!(decision.reason(), "Certification expired");
    }

    #[test]
    fn test_inactive_reason() {
        let catalog = catalog();
        let mut state = TrustState::new("p1", Faction::neutral(), &catalog);
        state.grant_certification(&catalog, "c2", now());
        state.set_certification_active("c2", false);

        let decision = PermissionResolver::new(&catalog).can(Some(&state), "p2");
        assert_eq!(decision.as_tuple(), (false, "Certification inactive"));
    }
}
