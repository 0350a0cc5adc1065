//! Structural checks over a whole draw document.
//!
//! Generation runs [`check_links`] before handing a document out; the other
//! checks are available to hosts that load documents from storage.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::error::{DrawError, DrawResult};
use crate::model::{DrawDefinition, DrawPosition, LinkType, Stage, Structure, StructureId};

/// Run every check: links, position coverage, occupants, finishing positions.
pub fn validate_draw(draw: &DrawDefinition) -> DrawResult<()> {
    check_links(draw)?;
    for structure in &draw.structures {
        check_position_coverage(structure)?;
    }
    check_occupants(draw)?;
    check_finishing_partition(draw)?;
    debug!("Draw {} passed validation", draw.draw_id);
    Ok(())
}

/// Every link references existing structures and rounds, and the link graph
/// has no cycle.
pub fn check_links(draw: &DrawDefinition) -> DrawResult<()> {
    for link in &draw.links {
        let source = draw
            .structure(&link.source.structure_id)
            .map_err(|_| DrawError::DanglingLink(link.source.structure_id.clone()))?;
        let target = draw
            .structure(&link.target.structure_id)
            .map_err(|_| DrawError::DanglingLink(link.target.structure_id.clone()))?;

        match (link.link_type, link.source.round_number, &link.source.finishing_positions) {
            (LinkType::Position, _, Some(positions)) if !positions.is_empty() => {}
            (LinkType::Position, _, _) => {
                return Err(DrawError::InvalidFinishingPositions {
                    positions: Vec::new(),
                    reason: format!(
                        "position link from {} lists no finishers",
                        source.structure_id
                    ),
                });
            }
            (_, Some(round_number), _) if source.round_match_up_count(round_number) > 0 => {}
            (_, round_number, _) => {
                return Err(DrawError::RoundNotFound {
                    structure_id: source.structure_id.clone(),
                    round_number: round_number.unwrap_or(0),
                });
            }
        }
        if !target.is_container() && target.round_match_up_count(link.target.round_number) == 0 {
            return Err(DrawError::RoundNotFound {
                structure_id: target.structure_id.clone(),
                round_number: link.target.round_number,
            });
        }
    }
    check_acyclic(draw)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Open,
    Done,
}

fn check_acyclic(draw: &DrawDefinition) -> DrawResult<()> {
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for link in &draw.links {
        edges
            .entry(link.source.structure_id.as_str())
            .or_default()
            .push(link.target.structure_id.as_str());
    }

    let mut visits: HashMap<&str, Visit> = HashMap::new();
    for structure in &draw.structures {
        let root = structure.structure_id.as_str();
        if visits.contains_key(root) {
            continue;
        }
        // iterative depth-first walk; an edge into an open node closes a cycle
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        visits.insert(root, Visit::Open);
        while let Some((node, next)) = stack.pop() {
            let targets = edges.get(node).map(Vec::as_slice).unwrap_or_default();
            let Some(&target) = targets.get(next) else {
                visits.insert(node, Visit::Done);
                continue;
            };
            stack.push((node, next + 1));
            match visits.get(target) {
                Some(Visit::Open) => return Err(DrawError::CyclicLinks(target.to_string())),
                Some(Visit::Done) => {}
                None => {
                    visits.insert(target, Visit::Open);
                    stack.push((target, 0));
                }
            }
        }
    }
    Ok(())
}

/// Positions are `1..=N` exactly once, and match-ups only reference existing
/// positions. In an elimination structure every position enters in round one
/// or in a feed round.
pub fn check_position_coverage(structure: &Structure) -> DrawResult<()> {
    let positions = structure.draw_positions();
    let expected: Vec<DrawPosition> = (1..=positions.len() as DrawPosition).collect();
    if positions != expected {
        return Err(DrawError::CorruptDocument(format!(
            "{} positions are not 1..{}",
            structure.structure_id,
            positions.len()
        )));
    }

    let referenced: BTreeSet<DrawPosition> = structure
        .all_match_ups()
        .into_iter()
        .flat_map(|m| m.defined_positions())
        .collect();
    if let Some(unknown) = referenced.iter().find(|dp| positions.binary_search(dp).is_err()) {
        return Err(DrawError::DrawPositionNotFound {
            structure_id: structure.structure_id.clone(),
            draw_position: *unknown,
        });
    }

    if structure.is_container() {
        for group in &structure.structures {
            let own: BTreeSet<DrawPosition> =
                group.position_assignments.iter().map(|a| a.draw_position).collect();
            if let Some(stray) = group
                .match_ups
                .iter()
                .flat_map(|m| m.defined_positions())
                .find(|dp| !own.contains(dp))
            {
                return Err(DrawError::CorruptDocument(format!(
                    "{} plays position {stray} of another group",
                    group.structure_name
                )));
            }
        }
        return Ok(());
    }

    for &draw_position in &positions {
        match structure.initial_round_number(draw_position) {
            Some(1) => {}
            Some(round) if structure.is_feed_round(round) => {}
            Some(round) => {
                return Err(DrawError::CorruptDocument(format!(
                    "position {draw_position} of {} first appears in round {round}",
                    structure.structure_id
                )));
            }
            None => {
                return Err(DrawError::CorruptDocument(format!(
                    "position {draw_position} of {} is in no match-up",
                    structure.structure_id
                )));
            }
        }
    }
    Ok(())
}

/// Every placed participant has an entry and appears once per structure.
pub fn check_occupants(draw: &DrawDefinition) -> DrawResult<()> {
    for structure in &draw.structures {
        let mut seen: HashMap<&str, DrawPosition> = HashMap::new();
        for assignment in structure.assignments() {
            let Some(participant_id) = assignment.participant_id() else {
                continue;
            };
            if draw.entry(participant_id).is_none() {
                return Err(DrawError::MissingEntry {
                    participant_id: participant_id.to_string(),
                    stage: structure.stage,
                });
            }
            if let Some(first) = seen.insert(participant_id, assignment.draw_position) {
                return Err(DrawError::ParticipantAlreadyPlaced {
                    participant_id: participant_id.to_string(),
                    draw_position: first,
                });
            }
        }
    }
    Ok(())
}

/// Finishing ranges no linked structure refines, per structure.
///
/// A round's loser range is terminal unless an unconditional LOSER link
/// leaves the round; the final winner range is terminal unless a WINNER
/// link leaves the last round. Qualifying structures and containers have no
/// terminal ranges.
pub fn terminal_ranges(draw: &DrawDefinition) -> DrawResult<Vec<(StructureId, [u32; 2])>> {
    let mut ranges = Vec::new();
    for structure in &draw.structures {
        if structure.is_container() || structure.stage == Stage::Qualifying {
            continue;
        }
        let last_round = structure.round_count();
        for round_number in 1..=last_round {
            let range = structure
                .round_match_ups(round_number)
                .first()
                .and_then(|m| m.finishing_position_range)
                .ok_or_else(|| {
                    DrawError::CorruptDocument(format!(
                        "round {round_number} of {} has no finishing range",
                        structure.structure_id
                    ))
                })?;

            let loser_linked = draw
                .links_from_round(&structure.structure_id, round_number)
                .any(|l| l.link_type == LinkType::Loser && !l.is_conditional());
            if !loser_linked {
                ranges.push((structure.structure_id.clone(), range.loser));
            }
            if round_number == last_round
                && draw.winner_link(&structure.structure_id, round_number).is_none()
            {
                ranges.push((structure.structure_id.clone(), range.winner));
            }
        }
    }
    Ok(ranges)
}

/// Terminal ranges never overlap; when the main structure is an elimination
/// structure they cover `1..=N` of its positions without gaps.
pub fn check_finishing_partition(draw: &DrawDefinition) -> DrawResult<()> {
    let ranges = terminal_ranges(draw)?;
    let mut covered: BTreeSet<u32> = BTreeSet::new();
    for (structure_id, [first, last]) in &ranges {
        for position in *first..=*last {
            if !covered.insert(position) {
                return Err(DrawError::OverlappingFinishingPositions(format!(
                    "position {position} finishes again in {structure_id}"
                )));
            }
        }
    }

    let Some(main) = draw.main_structure() else {
        return Ok(());
    };
    if main.is_container() {
        return Ok(());
    }
    let draw_size = main.position_count() as u32;
    let missing: Vec<u32> = (1..=draw_size).filter(|p| !covered.contains(p)).collect();
    if !missing.is_empty() {
        return Err(DrawError::InvalidFinishingPositions {
            positions: missing,
            reason: format!("not covered by any structure of a {draw_size} draw"),
        });
    }
    if let Some(beyond) = covered.iter().find(|&&p| p > draw_size) {
        return Err(DrawError::InvalidFinishingPositions {
            positions: vec![*beyond],
            reason: format!("beyond a {draw_size} draw"),
        });
    }
    Ok(())
}
