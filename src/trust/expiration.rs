//! Certification Expiry
//!
//! Re-derives each held record's expired flag from the current catalog and
//! the clock. A record expires when:
//!
//! 1. its certification was removed from the definitions,
//! 2. its definition version moved past the version it was earned under, or
//! 3. its tier expires by duration and that many days have elapsed since it
//!    was earned.
//!
//! Evaluation is caller-driven; nothing here is scheduled.

use super::state::{CertificationRecord, TrustState};
use crate::definitions::{CertId, DefinitionCatalog};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Why a record is (now) expired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum ExpiryCause {
    /// Certification no longer exists in the catalog
    Retired,
    /// Definition revised after the record was earned
    VersionBumped { earned: u32, current: u32 },
    /// Duration-based lifetime ran out
    DurationElapsed { days: u32 },
}

/// A record that flipped from valid to expired during a recompute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredCertification {
    pub cert_id: CertId,
    pub cause: ExpiryCause,
}

#[derive(Debug, Clone, Copy)]
pub struct ExpirationEvaluator<'a> {
    catalog: &'a DefinitionCatalog,
}

impl<'a> ExpirationEvaluator<'a> {
    pub fn new(catalog: &'a DefinitionCatalog) -> Self {
        Self { catalog }
    }

    /// Expiry cause for a record at `now`, or `None` while it is still valid
    pub fn evaluate(
        &self,
        record: &CertificationRecord,
        now: DateTime<Utc>,
    ) -> Option<ExpiryCause> {
        let Some(definition) = self.catalog.tier(record.cert_id.as_str()) else {
            return Some(ExpiryCause::Retired);
        };

        if definition.version > record.version_earned {
            return Some(ExpiryCause::VersionBumped {
                earned: record.version_earned,
                current: definition.version,
            });
        }

        let days = definition.expiry_policy.duration_days();
        let earned_at = record.earned_at_utc.filter(|t| t.timestamp() > 0);
        if let (Some(days), Some(earned_at)) = (days, earned_at) {
            if now - earned_at >= Duration::days(i64::from(days)) {
                return Some(ExpiryCause::DurationElapsed { days });
            }
        }

        None
    }

    /// Update every record's expired flag in place.
    ///
    /// Records crossing from valid to expired are deactivated and reported;
    /// records that were already expired are not reported again.
    pub fn recompute(
        &self,
        state: &mut TrustState,
        now: DateTime<Utc>,
    ) -> Vec<ExpiredCertification> {
        let mut newly_expired = Vec::new();

        for record in state.records_mut() {
            let cause = self.evaluate(record, now);
            let was_expired = record.is_expired;
            record.is_expired = cause.is_some();

            if let (Some(cause), false) = (cause, was_expired) {
                record.is_active = false;
                newly_expired.push(ExpiredCertification {
                    cert_id: record.cert_id.clone(),
                    cause,
                });
            }
        }

        newly_expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{CertificationLadder, CertificationTier, ExpiryPolicy};
    use crate::trust::Faction;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn ladders(pilot_version: u32) -> Vec<CertificationLadder> {
        vec![CertificationLadder::new("pilot", "flight")
            .with_tier(CertificationTier::new(1, "pilot_1").with_version(pilot_version))
            .with_tier(
                CertificationTier::new(2, "permit").with_expiry(ExpiryPolicy::after_days(30)),
            )]
    }

    fn state_with_both(catalog: &DefinitionCatalog) -> TrustState {
        let mut state = TrustState::new("p1", Faction::neutral(), catalog);
        state.grant_certification(catalog, "pilot_1", start());
        state.grant_certification(catalog, "permit", start());
        state
    }

    #[test]
    fn test_current_records_stay_valid() {
        let catalog = DefinitionCatalog::new(ladders(1), Vec::new());
        let mut state = state_with_both(&catalog);

        let expired =
            ExpirationEvaluator::new(&catalog).recompute(&mut state, start() + Duration::days(29));
        assert!(expired.is_empty());
        assert!(state.records().all(|r| r.is_usable()));
    }

    #[test]
    fn test_version_bump_expires_record() {
        let catalog = DefinitionCatalog::new(ladders(1), Vec::new());
        let mut state = state_with_both(&catalog);

        let bumped = DefinitionCatalog::new(ladders(2), Vec::new());
        let expired = ExpirationEvaluator::new(&bumped).recompute(&mut state, start());

        assert_eq!(
            expired,
            vec![ExpiredCertification {
                cert_id: CertId::new("pilot_1"),
                cause: ExpiryCause::VersionBumped { earned: 1, current: 2 },
            }]
        );
        let record = state.record("pilot_1").unwrap();
        assert!(record.is_expired);
        assert!(!record.is_active);
        assert_eq!(record.version_earned, 1);
    }

    #[test]
    fn test_duration_expiry_boundary() {
        let catalog = DefinitionCatalog::new(ladders(1), Vec::new());
        let mut state = state_with_both(&catalog);
        let evaluator = ExpirationEvaluator::new(&catalog);

        let just_before = start() + Duration::days(30) - Duration::seconds(1);
        assert!(evaluator.recompute(&mut state, just_before).is_empty());

        let expired = evaluator.recompute(&mut state, start() + Duration::days(30));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].cause, ExpiryCause::DurationElapsed { days: 30 });
        assert!(state.record("permit").unwrap().is_expired);
        assert!(!state.record("pilot_1").unwrap().is_expired);
    }

    #[test]
    fn test_removed_definition_expires_record() {
        let catalog = DefinitionCatalog::new(ladders(1), Vec::new());
        let mut state = state_with_both(&catalog);

        let emptied = DefinitionCatalog::default();
        let expired = ExpirationEvaluator::new(&emptied).recompute(&mut state, start());
        assert_eq!(expired.len(), 2);
        assert!(expired.iter().all(|e| e.cause == ExpiryCause::Retired));
        assert_eq!(state.record_count(), 2);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let catalog = DefinitionCatalog::new(ladders(2), Vec::new());
        let mut state = state_with_both(&DefinitionCatalog::new(ladders(1), Vec::new()));
        let evaluator = ExpirationEvaluator::new(&catalog);

        assert_eq!(evaluator.recompute(&mut state, start()).len(), 1);
        let after_first = state.clone();
        assert!(evaluator.recompute(&mut state, start()).is_empty());
        assert_eq!(state, after_first);
    }

    #[test]
    fn test_record_without_earned_time_never_expires_by_duration() {
        let catalog = DefinitionCatalog::new(ladders(1), Vec::new());
        let mut state = state_with_both(&catalog);
        for record in state.records_mut() {
            record.earned_at_utc = None;
        }

        let far_future = start() + Duration::days(10_000);
        assert!(ExpirationEvaluator::new(&catalog).recompute(&mut state, far_future).is_empty());
    }

    #[test]
    fn test_epoch_earned_time_counts_as_unset() {
        let catalog = DefinitionCatalog::new(ladders(1), Vec::new());
        let mut state = state_with_both(&catalog);
        for record in state.records_mut() {
            record.earned_at_utc = DateTime::from_timestamp(0, 0);
        }

        assert!(ExpirationEvaluator::new(&catalog).recompute(&mut state, start()).is_empty());
        assert!(state.record("permit").unwrap().is_usable());
    }
}
