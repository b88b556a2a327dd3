//! Trust Manager - Main Orchestrator
//!
//! Owns the single local profile and runs every operation other subsystems
//! call: state transition, rank upkeep, audit entry, then a snapshot flush.
//! Hosts create exactly one manager per process and pass it to callers.

use super::expiration::{ExpirationEvaluator, ExpiredCertification};
use super::permission::{PermissionDecision, PermissionResolver};
use super::rank::RankEvaluator;
use super::state::{Faction, TrustState};
use crate::audit::{AuditAction, AuditLog};
use crate::clock::Clock;
use crate::config::TrustConfig;
use crate::definitions::{CertId, CertificationLadder, DefinitionCatalog, RankThreshold};
use crate::persistence::{PersistenceGateway, ProfileSnapshot};
use serde_json::json;
use std::rc::Rc;
use tracing::{debug, info, warn};

pub struct TrustManager {
    catalog: DefinitionCatalog,
    state: TrustState,
    audit: AuditLog,
    gateway: Box<dyn PersistenceGateway>,
    clock: Rc<dyn Clock>,
    baseline_cert_id: CertId,
}

impl TrustManager {
    /// Load the stored profile, or create and save a fresh one when the
    /// snapshot is missing, unreadable or from an unsupported schema.
    pub fn bootstrap(
        config: &TrustConfig,
        catalog: DefinitionCatalog,
        gateway: Box<dyn PersistenceGateway>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let snapshot = match gateway.load() {
            Ok(Some(snapshot)) if snapshot.is_supported() => Some(snapshot),
            Ok(Some(snapshot)) => {
                warn!(
                    schema_version = snapshot.schema_version,
                    "Discarding trust snapshot with unsupported schema version"
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Trust snapshot unusable, starting a fresh profile: {:#}", e);
                None
            }
        };

        let restored = snapshot.is_some();
        let state = match snapshot {
            Some(snapshot) => snapshot.into_state(&catalog),
            None => TrustState::new(config.profile.player_id.clone(), Faction::neutral(), &catalog),
        };

        let mut manager = Self {
            catalog,
            state,
            audit: AuditLog::with_capacity(config.audit.capacity),
            gateway,
            clock,
            baseline_cert_id: CertId::new(config.profile.baseline_cert_id.clone()),
        };

        if restored {
            info!(
                player_id = %manager.state.player_id(),
                faction = %manager.state.faction(),
                trust_score = manager.state.trust_score(),
                rank = %manager.state.rank_id(),
                certs = manager.state.record_count(),
                "Restored trust profile"
            );
        } else {
            info!(player_id = %manager.state.player_id(), "Creating fresh trust profile");
            manager.grant_baseline();
        }

        manager
    }

    pub fn state(&self) -> &TrustState {
        &self.state
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn catalog(&self) -> &DefinitionCatalog {
        &self.catalog
    }

    pub fn baseline_cert_id(&self) -> &CertId {
        &self.baseline_cert_id
    }

    /// Swap in new definitions. Rank is re-derived immediately; expiry
    /// catches up on the next [`TrustManager::recompute_expiration`].
    pub fn reload_definitions(
        &mut self,
        ladders: Vec<CertificationLadder>,
        ranks: Vec<RankThreshold>,
    ) {
        self.catalog.load(ladders, ranks);
        self.state.recompute_rank(&self.catalog);
        info!(
            certs = self.catalog.cert_count(),
            ranks = self.catalog.ranks().len(),
            rank = %self.state.rank_id(),
            "Reloaded certification definitions"
        );
    }

    pub fn grant_certification(&mut self, cert_id: &str) -> bool {
        let now = self.clock.now();
        let Some(record) = self.state.grant_certification(&self.catalog, cert_id, now) else {
            debug!(cert_id = %cert_id, "Ignoring grant of unknown certification");
            return false;
        };
        let payload = json!({
            "certId": record.cert_id,
            "tier": record.tier,
            "version": record.version_earned,
        });

        info!(cert_id = %cert_id, rank = %self.state.rank_id(), "Granted certification");
        self.record_audit(AuditAction::CertGranted, payload);
        self.persist();
        true
    }

    pub fn revoke_certification(&mut self, cert_id: &str) -> bool {
        if !self.state.revoke_certification(cert_id) {
            return false;
        }

        info!(cert_id = %cert_id, "Revoked certification");
        self.record_audit(AuditAction::CertRevoked, json!({ "certId": cert_id }));
        self.persist();
        true
    }

    /// Toggle a held certification. Not audited, unlike grant and revoke.
    pub fn set_certification_active(&mut self, cert_id: &str, active: bool) -> bool {
        if !self.state.set_certification_active(cert_id, active) {
            return false;
        }

        debug!(cert_id = %cert_id, active, "Set certification activation");
        self.persist();
        true
    }

    /// Touch the last-used time. Best effort: rides along with the next flush.
    pub fn mark_certification_used(&mut self, cert_id: &str) {
        let now = self.clock.now();
        if self.state.mark_certification_used(cert_id, now) {
            debug!(cert_id = %cert_id, "Marked certification used");
        }
    }

    /// Change allegiance. Returns false when already in that faction.
    pub fn set_faction(&mut self, faction: impl Into<Faction>) -> bool {
        let Some(previous) = self.state.set_faction(&self.catalog, faction.into()) else {
            return false;
        };

        info!(
            from = %previous,
            to = %self.state.faction(),
            deactivated = self.state.record_count(),
            "Faction changed; trust reset"
        );
        let payload = json!({ "from": previous, "to": self.state.faction() });
        self.record_audit(AuditAction::FactionChanged, payload);
        self.persist();
        true
    }

    /// Apply a score delta (clamped at zero). Returns the new score.
    pub fn adjust_trust_score(&mut self, delta: i64) -> u32 {
        let score = self.state.adjust_trust_score(&self.catalog, delta);
        debug!(delta, score, rank = %self.state.rank_id(), "Adjusted trust score");
        self.persist();
        score
    }

    /// Re-derive expiry for every held record and flush once
    pub fn recompute_expiration(&mut self) -> Vec<ExpiredCertification> {
        let now = self.clock.now();
        let expired = ExpirationEvaluator::new(&self.catalog).recompute(&mut self.state, now);

        for entry in &expired {
            self.record_audit(
                AuditAction::CertExpired,
                json!({ "certId": entry.cert_id, "expiry": entry.cause }),
            );
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "Certifications expired");
        }

        self.persist();
        expired
    }

    pub fn evaluate_rank_id(&self, trust_score: u32) -> &str {
        RankEvaluator::new(&self.catalog).evaluate_rank_id(trust_score)
    }

    pub fn certs_granting_permission(&self, permission: &str) -> &[CertId] {
        self.catalog.certs_granting_permission(permission)
    }

    pub fn can(&self, permission: &str) -> PermissionDecision {
        PermissionResolver::new(&self.catalog).can(Some(&self.state), permission)
    }

    /// Check a permission, auditing the denial. Callers branch on the result.
    pub fn require(&mut self, permission: &str) -> bool {
        let decision = self.can(permission);
        if let PermissionDecision::Denied(reason) = decision {
            debug!(permission = %permission, reason = %reason, "Permission denied");
            self.record_audit(
                AuditAction::PermissionDenied,
                json!({ "permission": permission, "reason": reason.as_str() }),
            );
            return false;
        }
        true
    }

    /// Drop every record and start over as a fresh profile
    pub fn reset_profile(&mut self) {
        let discarded = self.state.record_count();
        let player_id = self.state.player_id().to_string();
        self.state = TrustState::new(player_id, Faction::neutral(), &self.catalog);

        info!(player_id = %self.state.player_id(), discarded, "Trust profile reset");
        self.record_audit(AuditAction::ProfileReset, json!({ "discardedCerts": discarded }));
        self.grant_baseline();
    }

    /// Write the current snapshot
    pub fn flush(&self) {
        self.persist();
    }

    /// Final flush before the host exits
    pub fn shutdown(self) {
        self.persist();
        info!(player_id = %self.state.player_id(), "Trust manager shut down");
    }

    fn grant_baseline(&mut self) {
        let baseline = self.baseline_cert_id.clone();
        if !self.grant_certification(baseline.as_str()) {
            warn!(
                cert_id = %baseline,
                "Baseline certification is not defined; profile starts without it"
            );
            self.persist();
        }
    }

    fn record_audit(&mut self, action: AuditAction, payload: serde_json::Value) {
        let now = self.clock.now();
        self.audit.add(
            now,
            self.state.player_id(),
            self.state.faction().as_str(),
            action,
            payload,
        );
    }

    fn persist(&self) {
        let snapshot = ProfileSnapshot::capture(&self.state);
        if let Err(e) = self.gateway.save(&snapshot) {
            warn!("Failed to persist trust profile, keeping in-memory state: {:#}", e);
        }
    }
}
