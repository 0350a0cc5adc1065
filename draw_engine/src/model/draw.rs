//! Draw definition: the root document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::{
    DrawLink, DrawType, EntryStatus, ExtensionTable, LinkType, MatchUpId, MatchUpType,
    ParticipantId, Stage, Structure, StructureId,
};
use crate::error::{DrawError, DrawResult};
use crate::notice::DrawNotice;

/// Participant-to-stage association supplied by the entry layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub participant_id: ParticipantId,
    pub entry_stage: Stage,
    pub entry_status: EntryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_position: Option<u32>,
}

impl Entry {
    pub fn new(participant_id: impl Into<ParticipantId>, entry_stage: Stage) -> Self {
        Self {
            participant_id: participant_id.into(),
            entry_stage,
            entry_status: EntryStatus::DirectAcceptance,
            entry_position: None,
        }
    }

    pub fn with_status(mut self, entry_status: EntryStatus) -> Self {
        self.entry_status = entry_status;
        self
    }
}

/// Root document describing one draw: its structures, links and entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawDefinition {
    pub draw_id: String,
    pub draw_name: String,
    pub draw_type: DrawType,
    pub match_up_type: MatchUpType,
    pub entries: Vec<Entry>,
    pub structures: Vec<Structure>,
    pub links: Vec<DrawLink>,
    #[serde(default, skip_serializing_if = "ExtensionTable::is_empty")]
    pub extensions: ExtensionTable,
    pub updated_at: DateTime<Utc>,
    /// Pending notices for the host; never serialized.
    #[serde(skip)]
    pub(crate) notices: VecDeque<DrawNotice>,
}

impl DrawDefinition {
    pub fn new(draw_id: impl Into<String>, draw_type: DrawType) -> Self {
        Self {
            draw_id: draw_id.into(),
            draw_name: draw_type.as_str().to_string(),
            draw_type,
            match_up_type: MatchUpType::default(),
            entries: Vec::new(),
            structures: Vec::new(),
            links: Vec::new(),
            extensions: ExtensionTable::default(),
            updated_at: Utc::now(),
            notices: VecDeque::new(),
        }
    }

    pub fn structure(&self, structure_id: &str) -> DrawResult<&Structure> {
        self.structures
            .iter()
            .find(|s| s.structure_id == structure_id)
            .ok_or_else(|| DrawError::StructureNotFound(structure_id.to_string()))
    }

    pub fn structure_mut(&mut self, structure_id: &str) -> DrawResult<&mut Structure> {
        self.structures
            .iter_mut()
            .find(|s| s.structure_id == structure_id)
            .ok_or_else(|| DrawError::StructureNotFound(structure_id.to_string()))
    }

    pub fn main_structure(&self) -> Option<&Structure> {
        self.structures
            .iter()
            .filter(|s| s.stage == Stage::Main)
            .min_by_key(|s| s.stage_sequence)
    }

    /// Id of the structure holding the match-up.
    pub fn structure_id_of_match_up(&self, match_up_id: &str) -> DrawResult<StructureId> {
        self.structures
            .iter()
            .find(|s| s.match_up(match_up_id).is_some())
            .map(|s| s.structure_id.clone())
            .ok_or_else(|| DrawError::MatchUpNotFound(match_up_id.to_string()))
    }

    pub fn entry(&self, participant_id: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| e.participant_id == participant_id)
    }

    /// Entries that occupy positions in structures of `stage`.
    pub fn placeable_entries(&self, stage: Stage) -> Vec<&Entry> {
        let entry_stage = stage.entry_stage();
        self.entries
            .iter()
            .filter(|e| e.entry_stage == entry_stage && e.entry_status.is_placeable())
            .collect()
    }

    pub fn has_placeable_entry(&self, participant_id: &str, stage: Stage) -> bool {
        self.placeable_entries(stage)
            .iter()
            .any(|e| e.participant_id == participant_id)
    }

    /// Links leaving a round of a structure.
    pub fn links_from_round(
        &self,
        structure_id: &str,
        round_number: u32,
    ) -> impl Iterator<Item = &DrawLink> {
        self.links
            .iter()
            .filter(move |link| link.leaves_round(structure_id, round_number))
    }

    pub fn links_into(&self, structure_id: &str) -> impl Iterator<Item = &DrawLink> {
        self.links
            .iter()
            .filter(move |link| link.target.structure_id == structure_id)
    }

    /// Unconditional LOSER link leaving a round, if any.
    pub fn loser_link(&self, structure_id: &str, round_number: u32) -> Option<&DrawLink> {
        self.links_from_round(structure_id, round_number)
            .find(|link| link.link_type == LinkType::Loser && !link.is_conditional())
    }

    pub fn winner_link(&self, structure_id: &str, round_number: u32) -> Option<&DrawLink> {
        self.links_from_round(structure_id, round_number)
            .find(|link| link.link_type == LinkType::Winner)
    }

    /// Record a mutation: refresh `updatedAt` and queue a draw-modified notice.
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.notices.push_back(DrawNotice::DrawModified {
            draw_id: self.draw_id.clone(),
        });
    }

    pub(crate) fn notify_modified(&mut self, mut match_up_ids: Vec<MatchUpId>) {
        if match_up_ids.is_empty() {
            return;
        }
        match_up_ids.sort();
        match_up_ids.dedup();
        self.notices
            .push_back(DrawNotice::MatchUpsModified { match_up_ids });
    }

    pub(crate) fn notify(&mut self, notice: DrawNotice) {
        self.notices.push_back(notice);
    }

    /// Take every notice queued since the last drain.
    pub fn drain_notices(&mut self) -> VecDeque<DrawNotice> {
        std::mem::take(&mut self.notices)
    }
}
