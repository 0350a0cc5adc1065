//! Notices emitted after structural mutations.
//!
//! The engine only queues notices on the document handle. Delivery and
//! subscriptions belong to the host, which drains the queue after each
//! operation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{MatchUpId, StructureId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "camelCase")]
pub enum DrawNotice {
    DrawModified { draw_id: String },
    StructuresAdded { structure_ids: Vec<StructureId> },
    MatchUpsAdded { match_up_ids: Vec<MatchUpId> },
    MatchUpsModified { match_up_ids: Vec<MatchUpId> },
}

impl fmt::Display for DrawNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::DrawModified { draw_id } => format!("draw {draw_id} modified"),
            Self::StructuresAdded { structure_ids } => {
                format!("{} structure(s) added", structure_ids.len())
            }
            Self::MatchUpsAdded { match_up_ids } => {
                format!("{} match-up(s) added", match_up_ids.len())
            }
            Self::MatchUpsModified { match_up_ids } => {
                format!("{} match-up(s) modified", match_up_ids.len())
            }
        };
        write!(f, "{repr}")
    }
}
