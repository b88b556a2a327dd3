//! Derived lookup indices over the certification definitions.

use super::model::{CertId, CertificationLadder, CertificationTier, RankThreshold};
use std::collections::HashMap;

/// Rank synthesized when the provider supplies no thresholds at all
pub const FALLBACK_RANK_ID: &str = "UNRANKED";

/// Read-only index over ladders, tiers and ranks.
///
/// Every query the engine makes against definitions goes through here. A
/// catalog is rebuilt wholesale on [`DefinitionCatalog::load`]; callers never
/// observe a half-built set of indices.
#[derive(Debug, Clone)]
pub struct DefinitionCatalog {
    ladders: Vec<CertificationLadder>,
    tiers: HashMap<CertId, CertificationTier>,
    ladder_by_cert: HashMap<CertId, String>,
    /// Ordered by ladder/tier declaration, no duplicates
    certs_by_permission: HashMap<String, Vec<CertId>>,
    /// Ascending by `min_trust`, never empty
    ranks: Vec<RankThreshold>,
}

impl DefinitionCatalog {
    pub fn new(ladders: Vec<CertificationLadder>, ranks: Vec<RankThreshold>) -> Self {
        let mut tiers = HashMap::new();
        let mut ladder_by_cert = HashMap::new();
        let mut certs_by_permission: HashMap<String, Vec<CertId>> = HashMap::new();

        for ladder in &ladders {
            for tier in &ladder.tiers {
                // Later duplicates win; rejecting them is the provider's job
                tiers.insert(tier.cert_id.clone(), tier.clone());
                ladder_by_cert.insert(tier.cert_id.clone(), ladder.ladder_id.clone());

                for permission in &tier.permissions {
                    let granting = certs_by_permission.entry(permission.clone()).or_default();
                    if !granting.contains(&tier.cert_id) {
                        granting.push(tier.cert_id.clone());
                    }
                }
            }
        }

        let mut ranks = ranks;
        if ranks.is_empty() {
            ranks.push(RankThreshold {
                rank_id: FALLBACK_RANK_ID.to_string(),
                display_name: "Unranked".to_string(),
                min_trust: 0,
                track: "default".to_string(),
            });
        }
        ranks.sort_by_key(|rank| rank.min_trust);

        Self {
            ladders,
            tiers,
            ladder_by_cert,
            certs_by_permission,
            ranks,
        }
    }

    /// Replace every derived index with ones built from the new definitions
    pub fn load(&mut self, ladders: Vec<CertificationLadder>, ranks: Vec<RankThreshold>) {
        *self = Self::new(ladders, ranks);
    }

    /// Certifications granting `permission`, in declaration order
    pub fn certs_granting_permission(&self, permission: &str) -> &[CertId] {
        if permission.trim().is_empty() {
            return &[];
        }
        self.certs_by_permission
            .get(permission)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn tier(&self, cert_id: &str) -> Option<&CertificationTier> {
        self.tiers.get(cert_id)
    }

    pub fn ladder_id(&self, cert_id: &str) -> Option<&str> {
        self.ladder_by_cert.get(cert_id).map(String::as_str)
    }

    pub fn contains(&self, cert_id: &str) -> bool {
        self.tiers.contains_key(cert_id)
    }

    pub fn cert_count(&self) -> usize {
        self.tiers.len()
    }

    pub fn ladders(&self) -> &[CertificationLadder] {
        &self.ladders
    }

    /// Rank thresholds sorted ascending by `min_trust`
    pub fn ranks(&self) -> &[RankThreshold] {
        &self.ranks
    }
}

impl Default for DefinitionCatalog {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}
