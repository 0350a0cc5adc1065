//! Structure builders.
//!
//! Each builder produces the match-up topology of one structure from a
//! position count: elimination trees, feed-in ladders, and round robin
//! groups. Builders never touch a document; orchestrators wrap their output
//! into [`Structure`]s and link them.

pub mod feed_in;
pub mod naming;
pub mod round_robin;
pub mod tree;

pub use feed_in::{Ladder, LadderOptions, build_ladder, feed_in_counts};
pub use naming::name_rounds;
pub use round_robin::{build_round_robin, group_count};
pub use tree::{TreeOptions, build_tree, tree_round_count};

use crate::model::{
    DrawPosition, FinishingPosition, FinishingPositionRange, MatchUp, PositionAssignment, Stage,
    Structure, StructureId, StructureType,
};

/// Wrap built match-ups into an ITEM structure with `position_count`
/// unfilled positions.
pub fn item_structure(
    structure_id: StructureId,
    structure_name: impl Into<String>,
    stage: Stage,
    stage_sequence: u32,
    match_ups: Vec<MatchUp>,
    position_count: u32,
) -> Structure {
    let mut structure = Structure::new(structure_id, structure_name, stage);
    structure.stage_sequence = stage_sequence;
    structure.match_ups = match_ups;
    structure.position_assignments = unfilled_positions(1..=position_count);
    structure
}

/// Wrap round robin groups into a CONTAINER structure.
pub fn container_structure(
    structure_id: StructureId,
    structure_name: impl Into<String>,
    stage: Stage,
    stage_sequence: u32,
    groups: Vec<Structure>,
) -> Structure {
    let mut structure = Structure::new(structure_id, structure_name, stage);
    structure.stage_sequence = stage_sequence;
    structure.structure_type = StructureType::Container;
    structure.finishing_position = FinishingPosition::WinRatio;
    structure.structures = groups;
    structure
}

pub(crate) fn unfilled_positions(
    positions: impl IntoIterator<Item = DrawPosition>,
) -> Vec<PositionAssignment> {
    positions.into_iter().map(PositionAssignment::new).collect()
}

/// Write finishing ranges and finishing rounds onto elimination match-ups.
///
/// Participants still alive at round `r` include everyone fed into later
/// rounds, so ranges never overlap between rounds.
pub(crate) fn assign_finishing_ranges(match_ups: &mut [MatchUp], position_count: u32, offset: u32) {
    let round_count = match_ups.iter().map(|m| m.round_number).max().unwrap_or(0);
    let mut alive = position_count;

    for round_number in 1..=round_count {
        let match_up_count = match_ups
            .iter()
            .filter(|m| m.round_number == round_number)
            .count() as u32;
        let range = FinishingPositionRange::for_round(offset, alive, match_up_count);

        for match_up in match_ups.iter_mut().filter(|m| m.round_number == round_number) {
            match_up.finishing_position_range = Some(range);
            match_up.finishing_round = Some(round_count - round_number + 1);
        }
        alive -= match_up_count;
    }
}
