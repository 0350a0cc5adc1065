//! Structure model: one bracket, group, or ladder.

use serde::{Deserialize, Serialize};

use super::{
    DrawPosition, FinishingPosition, MatchUp, MatchUpId, ParticipantId, Stage, StructureId,
    StructureType,
};

/// What currently occupies a draw position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant<'a> {
    Participant(&'a str),
    Bye,
    Qualifier,
    Unfilled,
}

/// Binds a draw position to a participant, a bye, or a qualifier placeholder.
///
/// At most one of the three is ever set; the setters clear the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionAssignment {
    pub draw_position: DrawPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) participant_id: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) bye: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) qualifier: bool,
}

impl PositionAssignment {
    pub fn new(draw_position: DrawPosition) -> Self {
        Self {
            draw_position,
            participant_id: None,
            bye: false,
            qualifier: false,
        }
    }

    pub fn occupant(&self) -> Occupant<'_> {
        match (&self.participant_id, self.bye, self.qualifier) {
            (Some(participant_id), _, _) => Occupant::Participant(participant_id),
            (None, true, _) => Occupant::Bye,
            (None, false, true) => Occupant::Qualifier,
            (None, false, false) => Occupant::Unfilled,
        }
    }

    pub fn participant_id(&self) -> Option<&str> {
        self.participant_id.as_deref()
    }

    pub fn is_bye(&self) -> bool {
        self.bye
    }

    pub fn is_qualifier(&self) -> bool {
        self.qualifier
    }

    pub fn is_filled(&self) -> bool {
        self.occupant() != Occupant::Unfilled
    }

    pub(crate) fn set_participant(&mut self, participant_id: ParticipantId) {
        self.participant_id = Some(participant_id);
        self.bye = false;
        self.qualifier = false;
    }

    pub(crate) fn set_bye(&mut self) {
        self.participant_id = None;
        self.bye = true;
        self.qualifier = false;
    }

    pub(crate) fn set_qualifier(&mut self) {
        self.participant_id = None;
        self.bye = false;
        self.qualifier = true;
    }
}

/// Binds a seed number to a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedAssignment {
    pub seed_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<ParticipantId>,
}

impl SeedAssignment {
    /// Numeric ordering key: the display value when it parses as a number
    /// (the first number of a range such as "5-8"), else the seed number.
    pub fn ordering_value(&self) -> u32 {
        self.seed_value
            .as_deref()
            .and_then(|value| value.split(['-', '/']).next())
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(self.seed_number)
    }
}

/// One bracket, group, or ladder within a draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    pub structure_id: StructureId,
    pub structure_name: String,
    pub stage: Stage,
    pub stage_sequence: u32,
    pub structure_type: StructureType,
    pub finishing_position: FinishingPosition,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_ups: Vec<MatchUp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub position_assignments: Vec<PositionAssignment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seed_assignments: Vec<SeedAssignment>,
    /// Sub-structures of a CONTAINER (round robin groups).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub structures: Vec<Structure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifying_round_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_limit: Option<u32>,
}

impl Structure {
    pub fn new(structure_id: StructureId, structure_name: impl Into<String>, stage: Stage) -> Self {
        Self {
            structure_id,
            structure_name: structure_name.into(),
            stage,
            stage_sequence: 1,
            structure_type: StructureType::Item,
            finishing_position: FinishingPosition::RoundOutcome,
            match_ups: Vec::new(),
            position_assignments: Vec::new(),
            seed_assignments: Vec::new(),
            structures: Vec::new(),
            seed_limit: None,
            qualifying_round_number: None,
            round_limit: None,
        }
    }

    pub fn is_container(&self) -> bool {
        self.structure_type == StructureType::Container
    }

    /// Every position assignment, including those held by sub-structures.
    pub fn assignments(&self) -> Vec<&PositionAssignment> {
        if self.is_container() {
            self.structures
                .iter()
                .flat_map(|group| group.position_assignments.iter())
                .collect()
        } else {
            self.position_assignments.iter().collect()
        }
    }

    pub fn position_count(&self) -> usize {
        self.assignments().len()
    }

    /// Sorted list of draw positions.
    pub fn draw_positions(&self) -> Vec<DrawPosition> {
        let mut positions: Vec<DrawPosition> =
            self.assignments().iter().map(|a| a.draw_position).collect();
        positions.sort_unstable();
        positions
    }

    pub fn assignment(&self, draw_position: DrawPosition) -> Option<&PositionAssignment> {
        self.assignments()
            .into_iter()
            .find(|a| a.draw_position == draw_position)
    }

    pub fn assignment_mut(
        &mut self,
        draw_position: DrawPosition,
    ) -> Option<&mut PositionAssignment> {
        if self.is_container() {
            self.structures
                .iter_mut()
                .flat_map(|group| group.position_assignments.iter_mut())
                .find(|a| a.draw_position == draw_position)
        } else {
            self.position_assignments
                .iter_mut()
                .find(|a| a.draw_position == draw_position)
        }
    }

    /// Draw position currently held by the participant, if any.
    pub fn position_of(&self, participant_id: &str) -> Option<DrawPosition> {
        self.assignments()
            .into_iter()
            .find(|a| a.participant_id() == Some(participant_id))
            .map(|a| a.draw_position)
    }

    /// Every match-up, including those held by sub-structures.
    pub fn all_match_ups(&self) -> Vec<&MatchUp> {
        if self.is_container() {
            self.structures
                .iter()
                .flat_map(|group| group.match_ups.iter())
                .collect()
        } else {
            self.match_ups.iter().collect()
        }
    }

    pub fn all_match_ups_mut(&mut self) -> Vec<&mut MatchUp> {
        if self.is_container() {
            self.structures
                .iter_mut()
                .flat_map(|group| group.match_ups.iter_mut())
                .collect()
        } else {
            self.match_ups.iter_mut().collect()
        }
    }

    pub fn match_up(&self, match_up_id: &str) -> Option<&MatchUp> {
        self.all_match_ups()
            .into_iter()
            .find(|m| m.match_up_id == match_up_id)
    }

    pub fn match_up_mut(&mut self, match_up_id: &str) -> Option<&mut MatchUp> {
        self.all_match_ups_mut()
            .into_iter()
            .find(|m| m.match_up_id == match_up_id)
    }

    pub fn match_up_ids(&self) -> Vec<MatchUpId> {
        self.all_match_ups()
            .iter()
            .map(|m| m.match_up_id.clone())
            .collect()
    }

    /// Number of rounds in an ITEM structure.
    pub fn round_count(&self) -> u32 {
        self.match_ups
            .iter()
            .map(|m| m.round_number)
            .max()
            .unwrap_or(0)
    }

    /// Match-ups of a round ordered by round position.
    pub fn round_match_ups(&self, round_number: u32) -> Vec<&MatchUp> {
        let mut match_ups: Vec<&MatchUp> = self
            .match_ups
            .iter()
            .filter(|m| m.round_number == round_number)
            .collect();
        match_ups.sort_by_key(|m| m.round_position);
        match_ups
    }

    pub fn round_match_up_count(&self, round_number: u32) -> u32 {
        self.match_ups
            .iter()
            .filter(|m| m.round_number == round_number)
            .count() as u32
    }

    pub fn is_feed_round(&self, round_number: u32) -> bool {
        self.match_ups
            .iter()
            .any(|m| m.round_number == round_number && m.feed_round)
    }

    /// Index into `match_ups` of the match-up at `round_number`/`round_position`.
    pub fn match_up_index(&self, round_number: u32, round_position: u32) -> Option<usize> {
        self.match_ups
            .iter()
            .position(|m| m.round_number == round_number && m.round_position == round_position)
    }

    /// Index of the latest-round match-up that already references the position.
    pub fn latest_match_up_index(&self, draw_position: DrawPosition) -> Option<usize> {
        self.match_ups
            .iter()
            .enumerate()
            .filter(|(_, m)| m.contains(draw_position))
            .max_by_key(|(_, m)| m.round_number)
            .map(|(index, _)| index)
    }

    /// Round in which the position first appears (1 for base positions, the
    /// feed round for fed positions).
    pub fn initial_round_number(&self, draw_position: DrawPosition) -> Option<u32> {
        self.all_match_ups()
            .into_iter()
            .filter(|m| m.contains(draw_position))
            .map(|m| m.round_number)
            .min()
    }

    /// Sub-structure (group) holding the position; the structure itself for ITEMs.
    pub fn group_of(&self, draw_position: DrawPosition) -> Option<&Structure> {
        if self.is_container() {
            self.structures.iter().find(|group| {
                group
                    .position_assignments
                    .iter()
                    .any(|a| a.draw_position == draw_position)
            })
        } else {
            self.assignment(draw_position).map(|_| self)
        }
    }

    /// True when any position holds a participant, bye, or qualifier.
    pub fn has_assignments(&self) -> bool {
        self.assignments().iter().any(|a| a.is_filled())
    }

    pub fn seed_limit_or_default(&self) -> u32 {
        self.seed_limit
            .unwrap_or_else(|| (self.position_count() as u32 / 2).max(1))
    }

    pub fn seed_of(&self, participant_id: &str) -> Option<&SeedAssignment> {
        self.seed_assignments
            .iter()
            .find(|s| s.participant_id.as_deref() == Some(participant_id))
    }

    /// Worst finishing position reachable in this structure.
    pub fn finishing_range(&self) -> Option<[u32; 2]> {
        let ranges: Vec<[u32; 2]> = self
            .match_ups
            .iter()
            .filter_map(|m| m.finishing_position_range)
            .flat_map(|range| [range.winner, range.loser])
            .collect();
        let low = ranges.iter().map(|r| r[0]).min()?;
        let high = ranges.iter().map(|r| r[1]).max()?;
        Some([low, high])
    }
}
