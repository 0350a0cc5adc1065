//! Priority order of the positions that receive byes.

use std::collections::BTreeSet;

use super::seed_blocks::virtual_seed_order;
use super::{base_positions, fed_positions};
use crate::model::{DrawPosition, Occupant, Structure};
use crate::policy::SeedBlockShape;

/// Unfilled positions of an elimination structure, best bye first.
///
/// 1. one bye per round one match-up, opposite placed seeds in seed order
/// 2. one bye per remaining match-up, following the virtual seed order
/// 3. fed positions
/// 4. second byes of round one match-ups (double byes)
pub fn bye_order(structure: &Structure, shape: SeedBlockShape) -> Vec<DrawPosition> {
    let first_round = structure.round_match_ups(1);
    let base = base_positions(structure);
    let virtual_order = virtual_seed_order(&base, shape);

    let occupant = |draw_position: DrawPosition| {
        structure
            .assignment(draw_position)
            .map(|a| a.occupant())
            .unwrap_or(Occupant::Unfilled)
    };
    let unfilled = |draw_position: DrawPosition| occupant(draw_position) == Occupant::Unfilled;
    let match_up_of = |draw_position: DrawPosition| {
        first_round.iter().copied().find(|m| m.contains(draw_position))
    };

    let mut order: Vec<DrawPosition> = Vec::new();
    let mut chosen_match_ups: BTreeSet<u32> = first_round
        .iter()
        .filter(|m| m.defined_positions().any(|dp| occupant(dp) == Occupant::Bye))
        .map(|m| m.round_position)
        .collect();

    let mut seeded: Vec<(u32, u32, DrawPosition)> = structure
        .seed_assignments
        .iter()
        .filter_map(|seed| {
            let participant_id = seed.participant_id.as_deref()?;
            let draw_position = structure.position_of(participant_id)?;
            Some((seed.ordering_value(), seed.seed_number, draw_position))
        })
        .collect();
    seeded.sort_unstable();

    // the bye goes opposite the anchor unless only the anchor is open
    let single_bye = |anchor: DrawPosition| -> Option<(u32, DrawPosition)> {
        let match_up = match_up_of(anchor)?;
        let opponent = match_up.opponent_of(anchor).flatten()?;
        let candidate = if unfilled(opponent) {
            opponent
        } else if unfilled(anchor) && !unfilled(opponent) {
            anchor
        } else {
            return None;
        };
        Some((match_up.round_position, candidate))
    };

    let anchors = seeded
        .iter()
        .map(|&(_, _, draw_position)| draw_position)
        .chain(virtual_order.iter().copied());
    for anchor in anchors {
        if let Some((round_position, candidate)) = single_bye(anchor) {
            if chosen_match_ups.insert(round_position) {
                order.push(candidate);
            }
        }
    }

    let mut fed: Vec<DrawPosition> = fed_positions(structure)
        .into_iter()
        .filter(|&dp| unfilled(dp))
        .collect();
    fed.sort_unstable();
    order.extend(fed);

    for anchor in virtual_order.iter().copied() {
        let Some(match_up) = match_up_of(anchor) else {
            continue;
        };
        for draw_position in match_up.defined_positions() {
            if unfilled(draw_position) && !order.contains(&draw_position) {
                order.push(draw_position);
            }
        }
    }

    for draw_position in structure.draw_positions() {
        if unfilled(draw_position) && !order.contains(&draw_position) {
            order.push(draw_position);
        }
    }

    order
}

/// One bye per round robin group: groups holding the best seeds first, the
/// bye on each group's last unfilled position.
pub fn group_bye_order(container: &Structure) -> Vec<DrawPosition> {
    let best_seed = |group: &Structure| {
        container
            .seed_assignments
            .iter()
            .filter(|seed| {
                seed.participant_id
                    .as_deref()
                    .and_then(|participant_id| group.position_of(participant_id))
                    .is_some()
            })
            .map(|seed| seed.seed_number)
            .min()
            .unwrap_or(u32::MAX)
    };

    let mut groups: Vec<(u32, usize, &Structure)> = container
        .structures
        .iter()
        .enumerate()
        .map(|(index, group)| (best_seed(group), index, group))
        .collect();
    groups.sort_by_key(|&(seed, index, _)| (seed, index));

    groups
        .into_iter()
        .filter(|(_, _, group)| !group.position_assignments.iter().any(|a| a.is_bye()))
        .filter_map(|(_, _, group)| {
            group
                .position_assignments
                .iter()
                .filter(|a| !a.is_filled())
                .map(|a| a.draw_position)
                .max()
        })
        .collect()
}
