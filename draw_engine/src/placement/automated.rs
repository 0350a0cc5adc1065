//! Automated positioning: fill every unfilled position of a structure.
//!
//! Placement runs on a working copy of the structure in four passes
//!
//! 1. seeds into their seed blocks (round robin: snaked across groups)
//! 2. byes, following [`bye_order`] or [`group_bye_order`]
//! 3. unseeded entrants
//! 4. qualifier placeholders
//!
//! and the result is written back through propagation, so byes settle and
//! cascade exactly as if they had been placed by hand.

use log::info;
use rand::Rng;
use rand::seq::SliceRandom;

use super::bye_order::{bye_order, group_bye_order};
use super::propagation::{Propagation, Task};
use super::seed_blocks::seed_blocks;
use super::{
    PlacementCounts, base_positions, linked_entry_positions, placement_counts, unplaced_entries,
};
use crate::error::{DrawError, DrawResult};
use crate::model::{DrawDefinition, DrawPosition, ParticipantId, Structure};
use crate::policy::PolicyDefinitions;

#[derive(Debug, Default)]
struct PositioningPlan {
    participants: Vec<(DrawPosition, ParticipantId)>,
    byes: Vec<DrawPosition>,
    qualifiers: Vec<DrawPosition>,
}

impl PositioningPlan {
    fn place(
        &mut self,
        working: &mut Structure,
        draw_position: DrawPosition,
        participant_id: ParticipantId,
    ) {
        if let Some(assignment) = working.assignment_mut(draw_position) {
            assignment.set_participant(participant_id.clone());
        }
        self.participants.push((draw_position, participant_id));
    }
}

fn unfilled(structure: &Structure, draw_position: DrawPosition) -> bool {
    structure
        .assignment(draw_position)
        .is_some_and(|a| !a.is_filled())
}

/// Seeded entrants still to place, by seed number.
fn unplaced_seeds(structure: &Structure, unplaced: &[ParticipantId]) -> Vec<(u32, ParticipantId)> {
    let mut seeds: Vec<(u32, ParticipantId)> = structure
        .seed_assignments
        .iter()
        .filter_map(|seed| {
            let participant_id = seed.participant_id.as_ref()?;
            unplaced
                .contains(participant_id)
                .then(|| (seed.seed_number, participant_id.clone()))
        })
        .collect();
    seeds.sort();
    seeds
}

/// Place every unplaced entry of the structure's stage, plus the byes and
/// qualifier placeholders that complete it.
///
/// Randomness (seed positions within a block, unseeded positions) comes from
/// `rng` when the seeding policy randomizes; otherwise positions are taken
/// in ascending order. Structures fed by links are rejected.
pub fn automated_positioning<R: Rng + ?Sized>(
    draw: &mut DrawDefinition,
    structure_id: &str,
    policy: &PolicyDefinitions,
    rng: &mut R,
) -> DrawResult<()> {
    policy.validate()?;
    if let Some(&draw_position) = linked_entry_positions(draw, structure_id)?.iter().next() {
        return Err(DrawError::LinkedEntryPosition(draw_position));
    }

    let counts = placement_counts(draw, structure_id)?;
    let unplaced = unplaced_entries(draw, structure_id)?;
    let mut working = draw.structure(structure_id)?.clone();

    let plan = if working.is_container() {
        plan_groups(&mut working, &unplaced, counts, policy, rng)
    } else {
        plan_tree(&mut working, &unplaced, counts, policy, rng)
    };

    let mut propagation = Propagation::new(draw);
    {
        let structure = propagation.draw_mut().structure_mut(structure_id)?;
        for (draw_position, participant_id) in &plan.participants {
            if let Some(assignment) = structure.assignment_mut(*draw_position) {
                assignment.set_participant(participant_id.clone());
            }
        }
        for draw_position in &plan.qualifiers {
            if let Some(assignment) = structure.assignment_mut(*draw_position) {
                assignment.set_qualifier();
            }
        }
    }
    for &draw_position in &plan.byes {
        propagation.push(Task::Bye {
            structure_id: structure_id.to_string(),
            draw_position,
            over_qualifier: false,
        });
    }
    for &(draw_position, _) in &plan.participants {
        propagation.push(Task::Settle {
            structure_id: structure_id.to_string(),
            draw_position,
        });
    }
    let modified = propagation.run()?;

    info!(
        "Automated positioning of {structure_id}: {} participants, {} byes, {} qualifiers",
        plan.participants.len(),
        plan.byes.len(),
        plan.qualifiers.len()
    );
    draw.touch();
    draw.notify_modified(modified);
    Ok(())
}

fn plan_tree<R: Rng + ?Sized>(
    working: &mut Structure,
    unplaced: &[ParticipantId],
    counts: PlacementCounts,
    policy: &PolicyDefinitions,
    rng: &mut R,
) -> PositioningPlan {
    let shape = policy.seeding.seed_block_shape;
    let randomize = policy.seeding.randomize_within_blocks;
    let mut plan = PositioningPlan::default();

    let seeds = unplaced_seeds(working, unplaced);
    let seed_count = seeds.last().map_or(0, |(seed_number, _)| *seed_number);
    let blocks = seed_blocks(&base_positions(working), seed_count, shape);
    let mut displaced: Vec<ParticipantId> = Vec::new();

    for block in &blocks {
        let mut open: Vec<DrawPosition> = block
            .positions
            .iter()
            .copied()
            .filter(|&dp| unfilled(working, dp))
            .collect();
        if randomize {
            open.shuffle(rng);
        }
        let mut open = open.into_iter();
        for (_, participant_id) in seeds.iter().filter(|(n, _)| block.contains_seed(*n)) {
            match open.next() {
                Some(draw_position) => plan.place(working, draw_position, participant_id.clone()),
                None => displaced.push(participant_id.clone()),
            }
        }
    }

    plan.byes = bye_order(working, shape)
        .into_iter()
        .take(counts.byes)
        .collect();
    for &draw_position in &plan.byes {
        if let Some(assignment) = working.assignment_mut(draw_position) {
            assignment.set_bye();
        }
    }

    fill_remaining(working, unplaced, &seeds, displaced, &mut plan, randomize, rng);
    plan
}

fn plan_groups<R: Rng + ?Sized>(
    working: &mut Structure,
    unplaced: &[ParticipantId],
    counts: PlacementCounts,
    policy: &PolicyDefinitions,
    rng: &mut R,
) -> PositioningPlan {
    let randomize = policy.seeding.randomize_within_blocks;
    let group_count = working.structures.len();
    let mut plan = PositioningPlan::default();
    let mut displaced: Vec<ParticipantId> = Vec::new();

    let seeds = unplaced_seeds(working, unplaced);
    for (index, (_, participant_id)) in seeds.iter().enumerate() {
        let (pass, offset) = (index / group_count, index % group_count);
        // snake: every other pass runs back through the groups
        let group = if pass % 2 == 0 {
            offset
        } else {
            group_count - 1 - offset
        };
        let open = working.structures[group]
            .position_assignments
            .iter()
            .filter(|a| !a.is_filled())
            .map(|a| a.draw_position)
            .min();
        match open {
            Some(draw_position) => plan.place(working, draw_position, participant_id.clone()),
            None => displaced.push(participant_id.clone()),
        }
    }

    let mut byes: Vec<DrawPosition> = group_bye_order(working)
        .into_iter()
        .take(counts.byes)
        .collect();
    // more byes than groups only happens with hand-placed entrants
    for draw_position in working.draw_positions().into_iter().rev() {
        if byes.len() >= counts.byes {
            break;
        }
        if unfilled(working, draw_position) && !byes.contains(&draw_position) {
            byes.push(draw_position);
        }
    }
    for &draw_position in &byes {
        if let Some(assignment) = working.assignment_mut(draw_position) {
            assignment.set_bye();
        }
    }
    plan.byes = byes;

    fill_remaining(working, unplaced, &seeds, displaced, &mut plan, randomize, rng);
    plan
}

/// Unseeded entrants (and seeds whose block was full) first, then qualifier
/// placeholders, into whatever is still unfilled.
fn fill_remaining<R: Rng + ?Sized>(
    working: &mut Structure,
    unplaced: &[ParticipantId],
    seeds: &[(u32, ParticipantId)],
    displaced: Vec<ParticipantId>,
    plan: &mut PositioningPlan,
    randomize: bool,
    rng: &mut R,
) {
    let mut open: Vec<DrawPosition> = working
        .draw_positions()
        .into_iter()
        .filter(|&dp| unfilled(working, dp))
        .collect();
    if randomize {
        open.shuffle(rng);
    }
    let mut open = open.into_iter();

    let unseeded = unplaced
        .iter()
        .filter(|participant_id| !seeds.iter().any(|(_, seeded)| seeded == *participant_id))
        .cloned();
    for participant_id in displaced.into_iter().chain(unseeded) {
        if let Some(draw_position) = open.next() {
            plan.place(working, draw_position, participant_id);
        }
    }
    for draw_position in open {
        if let Some(assignment) = working.assignment_mut(draw_position) {
            assignment.set_qualifier();
        }
        plan.qualifiers.push(draw_position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DrawType, MatchUpStatus, Stage};
    use crate::placement::assign_seed;
    use crate::placement::tests::{add_entries, draw_of, structure_ids, with_qualifying};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ordered() -> PolicyDefinitions {
        let mut policy = PolicyDefinitions::default();
        policy.seeding.randomize_within_blocks = false;
        policy
    }

    fn occupants(draw: &DrawDefinition, structure_id: &str) -> Vec<String> {
        draw.structure(structure_id)
            .unwrap()
            .draw_positions()
            .into_iter()
            .map(|dp| {
                let assignment = draw.structure(structure_id).unwrap().assignment(dp).unwrap();
                match assignment.participant_id() {
                    Some(participant_id) => participant_id.to_string(),
                    None if assignment.is_bye() => "BYE".to_string(),
                    None if assignment.is_qualifier() => "Q".to_string(),
                    None => "-".to_string(),
                }
            })
            .collect()
    }

    #[test]
    fn test_three_entrants_in_four() {
        let mut draw = draw_of(DrawType::SingleElimination, 4);
        add_entries(&mut draw, 3, Stage::Main);
        let main = structure_ids(&draw)[0].clone();

        automated_positioning(&mut draw, &main, &ordered(), &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(occupants(&draw, &main), vec!["p1", "BYE", "p2", "p3"]);
        let structure = draw.structure(&main).unwrap();
        assert_eq!(structure.round_match_ups(1)[0].match_up_status, MatchUpStatus::Bye);
        assert_eq!(structure.round_match_ups(2)[0].draw_positions, [Some(1), None]);
    }

    #[test]
    fn test_seeds_land_in_blocks() {
        let mut draw = draw_of(DrawType::SingleElimination, 16);
        add_entries(&mut draw, 16, Stage::Main);
        let main = structure_ids(&draw)[0].clone();
        let policy = PolicyDefinitions::default();
        for seed in 1..=4 {
            assign_seed(&mut draw, &main, seed, &format!("p{seed}"), None, &policy).unwrap();
        }

        automated_positioning(&mut draw, &main, &policy, &mut StdRng::seed_from_u64(42)).unwrap();

        let structure = draw.structure(&main).unwrap();
        assert_eq!(structure.position_of("p1"), Some(1));
        assert_eq!(structure.position_of("p2"), Some(16));
        for seed in ["p3", "p4"] {
            assert!(matches!(structure.position_of(seed), Some(5) | Some(12)));
        }
        assert!(structure.assignments().iter().all(|a| a.participant_id().is_some()));
    }

    #[test]
    fn test_positioning_is_reproducible() {
        let place = |seed: u64| {
            let mut draw = draw_of(DrawType::SingleElimination, 32);
            add_entries(&mut draw, 27, Stage::Main);
            let main = structure_ids(&draw)[0].clone();
            automated_positioning(
                &mut draw,
                &main,
                &PolicyDefinitions::default(),
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap();
            occupants(&draw, &main)
        };
        assert_eq!(place(9), place(9));
    }

    #[test]
    fn test_byes_face_top_seeds() {
        let mut draw = draw_of(DrawType::SingleElimination, 8);
        add_entries(&mut draw, 6, Stage::Main);
        let main = structure_ids(&draw)[0].clone();
        let policy = ordered();
        assign_seed(&mut draw, &main, 1, "p5", None, &policy).unwrap();
        assign_seed(&mut draw, &main, 2, "p6", None, &policy).unwrap();

        automated_positioning(&mut draw, &main, &policy, &mut StdRng::seed_from_u64(1)).unwrap();

        let structure = draw.structure(&main).unwrap();
        assert_eq!(structure.position_of("p5"), Some(1));
        assert_eq!(structure.position_of("p6"), Some(8));
        assert!(structure.assignment(2).unwrap().is_bye());
        assert!(structure.assignment(7).unwrap().is_bye());
        assert_eq!(structure.round_match_ups(2)[0].draw_positions[0], Some(1));
        assert_eq!(structure.round_match_ups(2)[1].draw_positions[1], Some(8));
    }

    #[test]
    fn test_qualifier_placeholders_complete_the_draw() {
        let mut draw = with_qualifying(16, 16, 4);
        add_entries(&mut draw, 9, Stage::Main);
        let main = structure_ids(&draw)[0].clone();

        automated_positioning(&mut draw, &main, &ordered(), &mut StdRng::seed_from_u64(1)).unwrap();

        let structure = draw.structure(&main).unwrap();
        let count = |f: fn(&crate::model::PositionAssignment) -> bool| {
            structure.assignments().into_iter().filter(|a| f(a)).count()
        };
        assert_eq!(count(|a| a.is_bye()), 3);
        assert_eq!(count(|a| a.is_qualifier()), 4);
        assert_eq!(count(|a| a.participant_id().is_some()), 9);
    }

    #[test]
    fn test_round_robin_seeds_snake() {
        let mut draw = draw_of(DrawType::RoundRobin, 7);
        add_entries(&mut draw, 7, Stage::Main);
        let container = structure_ids(&draw)[0].clone();
        let policy = ordered();
        for seed in 1..=4 {
            assign_seed(&mut draw, &container, seed, &format!("p{seed}"), None, &policy).unwrap();
        }

        let mut rng = StdRng::seed_from_u64(1);
        automated_positioning(&mut draw, &container, &policy, &mut rng).unwrap();

        let structure = draw.structure(&container).unwrap();
        let group_of = |participant: &str| {
            let draw_position = structure.position_of(participant).unwrap();
            structure
                .structures
                .iter()
                .position(|g| g.assignment(draw_position).is_some())
                .unwrap()
        };
        assert_eq!(["p1", "p2", "p3", "p4"].map(group_of), [0, 1, 1, 0]);

        // the single bye goes to the group holding seed 1
        let byes: Vec<DrawPosition> = structure
            .assignments()
            .iter()
            .filter(|a| a.is_bye())
            .map(|a| a.draw_position)
            .collect();
        assert_eq!(byes, vec![4]);
        let bye_match_ups = structure
            .all_match_ups()
            .into_iter()
            .filter(|m| m.match_up_status == MatchUpStatus::Bye)
            .count();
        assert_eq!(bye_match_ups, 3);
    }

    #[test]
    fn test_linked_structure_rejected() {
        let mut draw = draw_of(DrawType::DoubleElimination, 8);
        add_entries(&mut draw, 8, Stage::Main);
        let backdraw = structure_ids(&draw)[1].clone();

        let err = automated_positioning(
            &mut draw,
            &backdraw,
            &PolicyDefinitions::default(),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap_err();
        assert!(matches!(err, DrawError::LinkedEntryPosition(_)));
    }

    #[test]
    fn test_too_many_entries() {
        let mut draw = draw_of(DrawType::SingleElimination, 4);
        add_entries(&mut draw, 5, Stage::Main);
        let main = structure_ids(&draw)[0].clone();

        let err = automated_positioning(
            &mut draw,
            &main,
            &PolicyDefinitions::default(),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap_err();
        assert_eq!(
            err,
            DrawError::TooManyEntries {
                entries: 5,
                positions: 4
            }
        );
        assert!(!draw.structure(&main).unwrap().has_assignments());
    }
}
