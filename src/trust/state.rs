//! Player Trust State
//!
//! The mutable per-profile record: faction, trust score, derived rank and the
//! certification records earned so far. Every operation here is a pure state
//! transition; audit and persistence side effects live in the manager.

use super::rank::RankEvaluator;
use crate::definitions::{CertId, DefinitionCatalog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Mutually exclusive allegiance of a profile
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Faction(String);

impl Faction {
    pub const NEUTRAL: &'static str = "Neutral";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn neutral() -> Self {
        Self(Self::NEUTRAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Faction {
    fn default() -> Self {
        Self::neutral()
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for Faction {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Faction {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A held certification. Created on first grant, kept until a profile reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationRecord {
    pub cert_id: CertId,
    pub tier: u32,
    /// Definition version this record was (last) earned under
    pub version_earned: u32,
    pub is_active: bool,
    pub is_expired: bool,
    #[serde(default, with = "unix_seconds")]
    pub earned_at_utc: Option<DateTime<Utc>>,
    #[serde(default, with = "unix_seconds")]
    pub last_used_at_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ladder_id: String,
}

/// Unix-second timestamps where `0` (or `null`) means unset.
mod unix_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.map_or(0, |t| t.timestamp()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let seconds = Option::<i64>::deserialize(deserializer)?;
        Ok(seconds
            .filter(|&s| s > 0)
            .and_then(|s| DateTime::from_timestamp(s, 0)))
    }
}

impl CertificationRecord {
    fn unearned(cert_id: CertId) -> Self {
        Self {
            cert_id,
            tier: 0,
            version_earned: 0,
            is_active: false,
            is_expired: false,
            earned_at_utc: None,
            last_used_at_utc: None,
            ladder_id: String::new(),
        }
    }

    /// Active and not expired
    pub fn is_usable(&self) -> bool {
        self.is_active && !self.is_expired
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustState {
    player_id: String,
    faction: Faction,
    trust_score: u32,
    rank_id: String,
    certs: BTreeMap<CertId, CertificationRecord>,
}

impl TrustState {
    /// A profile with no certifications and a zero score
    pub fn new(
        player_id: impl Into<String>,
        faction: Faction,
        catalog: &DefinitionCatalog,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            faction,
            trust_score: 0,
            rank_id: RankEvaluator::new(catalog).evaluate_rank_id(0).to_string(),
            certs: BTreeMap::new(),
        }
    }

    /// Rebuild a state from persisted parts. The rank is re-derived from the
    /// score so it always matches the current catalog.
    pub(crate) fn from_parts(
        player_id: String,
        faction: Faction,
        trust_score: u32,
        certs: impl IntoIterator<Item = CertificationRecord>,
        catalog: &DefinitionCatalog,
    ) -> Self {
        let mut state = Self {
            player_id,
            faction,
            trust_score,
            rank_id: String::new(),
            certs: certs
                .into_iter()
                .map(|record| (record.cert_id.clone(), record))
                .collect(),
        };
        state.recompute_rank(catalog);
        state
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn faction(&self) -> &Faction {
        &self.faction
    }

    pub fn trust_score(&self) -> u32 {
        self.trust_score
    }

    pub fn rank_id(&self) -> &str {
        &self.rank_id
    }

    pub fn record(&self, cert_id: &str) -> Option<&CertificationRecord> {
        self.certs.get(cert_id)
    }

    /// Held records ordered by cert id
    pub fn records(&self) -> impl ExactSizeIterator<Item = &CertificationRecord> {
        self.certs.values()
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut CertificationRecord> {
        self.certs.values_mut()
    }

    pub fn record_count(&self) -> usize {
        self.certs.len()
    }

    pub fn recompute_rank(&mut self, catalog: &DefinitionCatalog) {
        self.rank_id = RankEvaluator::new(catalog)
            .evaluate_rank_id(self.trust_score)
            .to_string();
    }

    /// Grant (or re-grant) a certification under its current definition.
    ///
    /// Returns the updated record, or `None` without touching anything when
    /// the cert id is not in the catalog.
    pub fn grant_certification(
        &mut self,
        catalog: &DefinitionCatalog,
        cert_id: &str,
        now: DateTime<Utc>,
    ) -> Option<&CertificationRecord> {
        let definition = catalog.tier(cert_id)?;
        let ladder_id = catalog.ladder_id(cert_id).unwrap_or_default().to_string();

        let record = self
            .certs
            .entry(definition.cert_id.clone())
            .or_insert_with(|| CertificationRecord::unearned(definition.cert_id.clone()));

        record.tier = definition.tier;
        record.version_earned = definition.version;
        record.is_expired = false;
        record.is_active = true;
        record.earned_at_utc = record
            .earned_at_utc
            .filter(|earned| earned.timestamp() > 0)
            .or(Some(now));
        record.last_used_at_utc = Some(now);
        record.ladder_id = ladder_id;

        self.recompute_rank(catalog);
        self.certs.get(cert_id)
    }

    /// Deactivate a held record. Expiry state is left as is.
    pub fn revoke_certification(&mut self, cert_id: &str) -> bool {
        match self.certs.get_mut(cert_id) {
            Some(record) => {
                record.is_active = false;
                true
            }
            None => false,
        }
    }

    /// Toggle a held record. Expired records cannot be re-activated.
    pub fn set_certification_active(&mut self, cert_id: &str, active: bool) -> bool {
        let Some(record) = self.certs.get_mut(cert_id) else {
            return false;
        };
        if active && record.is_expired {
            debug!(cert_id = %cert_id, "Refusing to activate expired certification");
            return false;
        }
        record.is_active = active;
        true
    }

    pub fn mark_certification_used(&mut self, cert_id: &str, now: DateTime<Utc>) -> bool {
        match self.certs.get_mut(cert_id) {
            Some(record) => {
                record.last_used_at_utc = Some(now);
                true
            }
            None => false,
        }
    }

    /// Switch allegiance: score resets to zero and every record is
    /// deactivated (but kept). Returns the previous faction on change.
    pub fn set_faction(
        &mut self,
        catalog: &DefinitionCatalog,
        faction: Faction,
    ) -> Option<Faction> {
        if self.faction == faction {
            return None;
        }
        let previous = std::mem::replace(&mut self.faction, faction);

        self.trust_score = 0;
        self.recompute_rank(catalog);
        for record in self.certs.values_mut() {
            record.is_active = false;
        }

        Some(previous)
    }

    /// Apply a signed score delta, clamping at zero. Returns the new score.
    pub fn adjust_trust_score(&mut self, catalog: &DefinitionCatalog, delta: i64) -> u32 {
        let adjusted = i64::from(self.trust_score).saturating_add(delta);
        self.trust_score = adjusted.clamp(0, i64::from(u32::MAX)) as u32;
        self.recompute_rank(catalog);
        self.trust_score
    }
}
