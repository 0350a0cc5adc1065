//! Manual placement of seeds, participants, and qualifier placeholders.

use log::info;

use super::propagation::{Propagation, Task};
use super::seed_blocks::{block_for_seed, seed_blocks};
use super::{base_positions, linked_entry_positions};
use crate::error::{DrawError, DrawResult};
use crate::model::{
    DrawDefinition, DrawPosition, Occupant, ParticipantId, SeedAssignment, Structure,
};
use crate::policy::{PolicyDefinitions, SeedBlockShape};

/// Placeable entries of the structure's stage that hold no position yet, in
/// entry order.
pub fn unplaced_entries(
    draw: &DrawDefinition,
    structure_id: &str,
) -> DrawResult<Vec<ParticipantId>> {
    let structure = draw.structure(structure_id)?;
    let mut entries: Vec<_> = draw
        .placeable_entries(structure.stage)
        .into_iter()
        .filter(|e| structure.position_of(&e.participant_id).is_none())
        .collect();
    entries.sort_by_key(|e| e.entry_position.unwrap_or(u32::MAX));
    Ok(entries.into_iter().map(|e| e.participant_id.clone()).collect())
}

/// Bind `seed_number` to a participant of the structure's stage.
///
/// A seed number already held by someone else, or another seed held by the
/// participant, is replaced.
pub fn assign_seed(
    draw: &mut DrawDefinition,
    structure_id: &str,
    seed_number: u32,
    participant_id: &str,
    seed_value: Option<String>,
    policy: &PolicyDefinitions,
) -> DrawResult<()> {
    let structure = draw.structure(structure_id)?;
    let seed_limit = policy
        .seeding
        .seed_limit
        .or(structure.seed_limit)
        .unwrap_or_else(|| structure.seed_limit_or_default());
    if seed_number == 0 || seed_number > seed_limit {
        return Err(DrawError::SeedLimitExceeded {
            seed_number,
            seed_limit,
        });
    }
    if !draw.has_placeable_entry(participant_id, structure.stage) {
        return Err(DrawError::MissingEntry {
            participant_id: participant_id.to_string(),
            stage: structure.stage,
        });
    }
    if let Some(draw_position) = structure.position_of(participant_id) {
        check_seed_position(
            structure,
            seed_number,
            draw_position,
            policy.seeding.seed_block_shape,
        )?;
    }

    let structure = draw.structure_mut(structure_id)?;
    structure.seed_assignments.retain(|seed| {
        seed.seed_number != seed_number && seed.participant_id.as_deref() != Some(participant_id)
    });
    structure.seed_assignments.push(SeedAssignment {
        seed_number,
        seed_value,
        participant_id: Some(participant_id.to_string()),
    });
    structure.seed_assignments.sort_by_key(|seed| seed.seed_number);

    info!("Seed {seed_number} of {structure_id} assigned to {participant_id}");
    draw.touch();
    Ok(())
}

/// Seeded participants of an elimination structure must sit inside their
/// seed block; groups take seeds anywhere.
pub(crate) fn check_seed_position(
    structure: &Structure,
    seed_number: u32,
    draw_position: DrawPosition,
    shape: SeedBlockShape,
) -> DrawResult<()> {
    if structure.is_container() {
        return Ok(());
    }
    let blocks = seed_blocks(&base_positions(structure), seed_number, shape);
    let allowed = block_for_seed(&blocks, seed_number)
        .is_some_and(|block| block.positions.contains(&draw_position));
    if allowed {
        Ok(())
    } else {
        Err(DrawError::InvalidSeedPosition {
            seed_number,
            draw_position,
        })
    }
}

/// Checks shared by every direct placement: the position exists and is not
/// fed by a link.
fn check_direct_position(
    draw: &DrawDefinition,
    structure_id: &str,
    draw_position: DrawPosition,
) -> DrawResult<()> {
    let structure = draw.structure(structure_id)?;
    if structure.assignment(draw_position).is_none() {
        return Err(DrawError::DrawPositionNotFound {
            structure_id: structure_id.to_string(),
            draw_position,
        });
    }
    if linked_entry_positions(draw, structure_id)?.contains(&draw_position) {
        return Err(DrawError::LinkedEntryPosition(draw_position));
    }
    Ok(())
}

/// Place a participant at an unfilled position.
///
/// Placing a participant where they already are is a no-op. Placement opposite
/// a bye advances the participant at once.
pub fn assign_draw_position(
    draw: &mut DrawDefinition,
    structure_id: &str,
    draw_position: DrawPosition,
    participant_id: &str,
    policy: &PolicyDefinitions,
) -> DrawResult<()> {
    check_direct_position(draw, structure_id, draw_position)?;
    let structure = draw.structure(structure_id)?;
    if !draw.has_placeable_entry(participant_id, structure.stage) {
        return Err(DrawError::MissingEntry {
            participant_id: participant_id.to_string(),
            stage: structure.stage,
        });
    }
    if let Some(placed) = structure.position_of(participant_id) {
        if placed == draw_position {
            return Ok(());
        }
        return Err(DrawError::ParticipantAlreadyPlaced {
            participant_id: participant_id.to_string(),
            draw_position: placed,
        });
    }
    match structure.assignment(draw_position).map(|a| a.occupant()) {
        Some(Occupant::Participant(existing)) => {
            return Err(DrawError::PositionOccupied {
                draw_position,
                participant_id: existing.to_string(),
            });
        }
        Some(Occupant::Bye) | Some(Occupant::Qualifier) => {
            return Err(DrawError::PositionUnavailable(draw_position));
        }
        Some(Occupant::Unfilled) | None => {}
    }
    if let Some(seed) = structure.seed_of(participant_id) {
        check_seed_position(
            structure,
            seed.seed_number,
            draw_position,
            policy.seeding.seed_block_shape,
        )?;
    }

    let mut propagation = Propagation::new(draw);
    if let Some(assignment) = propagation
        .draw_mut()
        .structure_mut(structure_id)?
        .assignment_mut(draw_position)
    {
        assignment.set_participant(participant_id.to_string());
    }
    propagation.push(Task::Settle {
        structure_id: structure_id.to_string(),
        draw_position,
    });
    let modified = propagation.run()?;

    info!("{participant_id} placed at position {draw_position} of {structure_id}");
    draw.touch();
    draw.notify_modified(modified);
    Ok(())
}

/// Reserve a position for a participant arriving from a qualifying stage.
pub fn assign_qualifier(
    draw: &mut DrawDefinition,
    structure_id: &str,
    draw_position: DrawPosition,
) -> DrawResult<()> {
    check_direct_position(draw, structure_id, draw_position)?;
    let structure = draw.structure(structure_id)?;
    match structure.assignment(draw_position).map(|a| a.occupant()) {
        Some(Occupant::Qualifier) => return Ok(()),
        Some(Occupant::Participant(existing)) => {
            return Err(DrawError::PositionOccupied {
                draw_position,
                participant_id: existing.to_string(),
            });
        }
        Some(Occupant::Bye) => return Err(DrawError::PositionUnavailable(draw_position)),
        Some(Occupant::Unfilled) | None => {}
    }

    let mut propagation = Propagation::new(draw);
    if let Some(assignment) = propagation
        .draw_mut()
        .structure_mut(structure_id)?
        .assignment_mut(draw_position)
    {
        assignment.set_qualifier();
    }
    propagation.push(Task::Settle {
        structure_id: structure_id.to_string(),
        draw_position,
    });
    let modified = propagation.run()?;

    info!("Qualifier placeholder at position {draw_position} of {structure_id}");
    draw.touch();
    draw.notify_modified(modified);
    Ok(())
}
