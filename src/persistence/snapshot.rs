use crate::definitions::DefinitionCatalog;
use crate::trust::{CertificationRecord, Faction, TrustState};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Current on-disk layout version
pub const SNAPSHOT_SCHEMA_VERSION: i32 = 1;

/// Serialized form of a [`TrustState`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub schema_version: i32,
    pub player_id: String,
    pub faction: Faction,
    pub trust_score: u32,
    pub rank_id: String,
    #[serde(default)]
    pub certs: Vec<CertificationRecord>,
}

impl ProfileSnapshot {
    pub fn capture(state: &TrustState) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            player_id: state.player_id().to_string(),
            faction: state.faction().clone(),
            trust_score: state.trust_score(),
            rank_id: state.rank_id().to_string(),
            certs: state.records().cloned().collect(),
        }
    }

    /// Snapshots written with a non-positive schema version are unusable
    pub fn is_supported(&self) -> bool {
        self.schema_version > 0
    }

    /// Rebuild the live state. The stored rank id is ignored in favour of
    /// one derived from the score against `catalog`.
    pub fn into_state(self, catalog: &DefinitionCatalog) -> TrustState {
        TrustState::from_parts(self.player_id, self.faction, self.trust_score, self.certs, catalog)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize profile snapshot")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse profile snapshot")
    }
}
