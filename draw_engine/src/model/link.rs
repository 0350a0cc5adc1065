//! Link model: directed edges between structures.

use serde::{Deserialize, Serialize};

use super::{FeedProfile, LinkCondition, LinkType, StructureId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSource {
    pub structure_id: StructureId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishing_positions: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkTarget {
    pub structure_id: StructureId,
    pub round_number: u32,
    pub feed_profile: FeedProfile,
}

/// Directed rule moving a winner, loser, or finisher between structures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawLink {
    pub link_type: LinkType,
    pub source: LinkSource,
    pub target: LinkTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_condition: Option<LinkCondition>,
}

impl DrawLink {
    pub fn is_conditional(&self) -> bool {
        self.link_condition.is_some()
    }

    /// Whether this link carries the winners or losers of `round_number` in `structure_id`.
    pub fn leaves_round(&self, structure_id: &str, round_number: u32) -> bool {
        self.source.structure_id == structure_id && self.source.round_number == Some(round_number)
    }
}
