//! Placement of seeds, participants, byes, and qualifier placeholders.
//!
//! - [`seed_blocks`]: which positions each seed may take
//! - [`bye_order`]: which unfilled positions receive byes first
//! - [`propagation`]: settles byes and moves positions across links
//! - [`assignment`]: single manual placements
//! - [`automated`]: fills a whole structure from its entries
//!
//! Positions fed by a link (consolation, play-off, or later main stage
//! positions) never take direct entrants; participants only reach them
//! through result routing or bye propagation.

pub mod assignment;
pub mod automated;
pub mod bye_order;
pub mod propagation;
pub mod seed_blocks;

pub use assignment::{assign_draw_position, assign_qualifier, assign_seed, unplaced_entries};
pub use automated::automated_positioning;
pub use bye_order::{bye_order, group_bye_order};
pub use propagation::assign_bye;
pub use seed_blocks::{SeedBlock, block_for_seed, seed_blocks, virtual_seed_order};

use std::collections::BTreeSet;

use crate::error::{DrawError, DrawResult};
use crate::model::{DrawDefinition, DrawPosition, LinkType, Occupant, Stage, Structure};

/// Sorted round one positions; every position of a container.
pub fn base_positions(structure: &Structure) -> Vec<DrawPosition> {
    if structure.is_container() {
        return structure.draw_positions();
    }
    let mut positions: Vec<DrawPosition> = structure
        .round_match_ups(1)
        .into_iter()
        .flat_map(|m| m.defined_positions())
        .collect();
    positions.sort_unstable();
    positions
}

/// Positions first appearing after round one (ladder feed positions).
pub fn fed_positions(structure: &Structure) -> Vec<DrawPosition> {
    if structure.is_container() {
        return Vec::new();
    }
    structure
        .draw_positions()
        .into_iter()
        .filter(|&dp| structure.initial_round_number(dp).is_some_and(|round| round > 1))
        .collect()
}

/// Positions of a structure filled by links from non-qualifying structures.
pub fn linked_entry_positions(
    draw: &DrawDefinition,
    structure_id: &str,
) -> DrawResult<BTreeSet<DrawPosition>> {
    let structure = draw.structure(structure_id)?;
    let mut positions = BTreeSet::new();

    for link in draw.links_into(structure_id) {
        let source = draw
            .structure(&link.source.structure_id)
            .map_err(|_| DrawError::DanglingLink(link.source.structure_id.clone()))?;
        if source.stage == Stage::Qualifying {
            continue;
        }
        positions.extend(
            structure
                .draw_positions()
                .into_iter()
                .filter(|&dp| structure.initial_round_number(dp) == Some(link.target.round_number)),
        );
    }
    Ok(positions)
}

/// Qualifiers a structure receives from qualifying structures.
pub fn qualifier_count(draw: &DrawDefinition, structure_id: &str) -> DrawResult<u32> {
    let mut count = 0;
    for link in draw.links_into(structure_id) {
        let source = draw
            .structure(&link.source.structure_id)
            .map_err(|_| DrawError::DanglingLink(link.source.structure_id.clone()))?;
        if source.stage != Stage::Qualifying {
            continue;
        }
        count += match link.link_type {
            LinkType::Winner => link
                .source
                .round_number
                .map(|round| source.round_match_up_count(round))
                .unwrap_or(0),
            LinkType::Position => {
                let finishers = link
                    .source
                    .finishing_positions
                    .as_ref()
                    .map_or(0, |positions| positions.len() as u32);
                finishers * source.structures.len().max(1) as u32
            }
            LinkType::Loser => 0,
        };
    }
    Ok(count)
}

/// Position bookkeeping of one structure before automated positioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementCounts {
    pub unfilled: usize,
    pub unplaced_entries: usize,
    /// Qualifiers still expected that have neither a placeholder nor a position
    pub qualifiers: usize,
    pub byes: usize,
}

/// Count what automated positioning has to place.
pub fn placement_counts(draw: &DrawDefinition, structure_id: &str) -> DrawResult<PlacementCounts> {
    let structure = draw.structure(structure_id)?;
    let unfilled = structure
        .assignments()
        .iter()
        .filter(|a| !a.is_filled())
        .count();
    let unplaced = unplaced_entries(draw, structure_id)?.len();

    let settled = structure
        .assignments()
        .iter()
        .filter(|a| match a.occupant() {
            Occupant::Qualifier => true,
            Occupant::Participant(participant_id) => draw
                .entry(participant_id)
                .is_some_and(|e| e.entry_stage == Stage::Qualifying),
            Occupant::Bye | Occupant::Unfilled => false,
        })
        .count();
    let qualifiers = (qualifier_count(draw, structure_id)? as usize).saturating_sub(settled);

    if unplaced + qualifiers > unfilled {
        return Err(DrawError::TooManyEntries {
            entries: unplaced + qualifiers,
            positions: unfilled,
        });
    }
    Ok(PlacementCounts {
        unfilled,
        unplaced_entries: unplaced,
        qualifiers,
        byes: unfilled - unplaced - qualifiers,
    })
}
