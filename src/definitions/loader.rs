//! JSON definitions provider

use super::catalog::DefinitionCatalog;
use super::model::{CertId, CertificationLadder, RankThreshold};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Ladders and rank thresholds as stored in a definitions file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionSet {
    #[serde(default)]
    pub ladders: Vec<CertificationLadder>,
    #[serde(default)]
    pub ranks: Vec<RankThreshold>,
}

impl DefinitionSet {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse certification definitions")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read definitions file {}", path.display()))?;
        let set = Self::from_json_str(&raw)
            .with_context(|| format!("Invalid definitions file {}", path.display()))?;

        for cert_id in set.duplicate_cert_ids() {
            warn!(
                cert_id = %cert_id,
                path = %path.display(),
                "Certification id declared more than once; the last declaration wins"
            );
        }
        debug!(
            ladders = set.ladders.len(),
            ranks = set.ranks.len(),
            "Loaded certification definitions"
        );

        Ok(set)
    }

    /// Cert ids declared by more than one tier, in first-repeat order
    pub fn duplicate_cert_ids(&self) -> Vec<CertId> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for tier in self.ladders.iter().flat_map(|ladder| ladder.tiers.iter()) {
            if !seen.insert(&tier.cert_id) && !duplicates.contains(&tier.cert_id) {
                duplicates.push(tier.cert_id.clone());
            }
        }
        duplicates
    }

    pub fn into_catalog(self) -> DefinitionCatalog {
        DefinitionCatalog::new(self.ladders, self.ranks)
    }
}
