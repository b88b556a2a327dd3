//! Trust score to rank mapping.

use crate::definitions::{DefinitionCatalog, RankThreshold};

/// Selects the highest rank whose `min_trust` the score reaches.
///
/// Scores below every threshold fall back to the lowest rank, so the result
/// is always defined for a catalog with at least one rank.
#[derive(Debug, Clone, Copy)]
pub struct RankEvaluator<'a> {
    ranks: &'a [RankThreshold],
}

impl<'a> RankEvaluator<'a> {
    pub fn new(catalog: &'a DefinitionCatalog) -> Self {
        Self {
            ranks: catalog.ranks(),
        }
    }

    /// Position in the ascending threshold table
    pub fn rank_index(&self, trust_score: u32) -> usize {
        let score = i64::from(trust_score);
        self.ranks
            .iter()
            .rposition(|rank| rank.min_trust <= score)
            .unwrap_or(0)
    }

    pub fn evaluate(&self, trust_score: u32) -> Option<&'a RankThreshold> {
        self.ranks.get(self.rank_index(trust_score))
    }

    pub fn evaluate_rank_id(&self, trust_score: u32) -> &'a str {
        self.evaluate(trust_score)
            .map(|rank| rank.rank_id.as_str())
            .unwrap_or_default()
    }
}
