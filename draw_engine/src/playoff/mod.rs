//! Playoff structures fed from a source structure.
//!
//! Three shapes share this module:
//!
//! - recursive playoffs (COMPASS, OLYMPIC, PLAY_OFF), where every round's
//!   losers spawn a child structure that spawns its own children
//! - round robin playoffs, where group finishers in a set of positions are
//!   sent into a new elimination structure over a POSITION link
//! - elimination playoffs, where the losers of a named round feed a new
//!   structure over a LOSER link
//!
//! ## Example
//!
//! ```
//! use draw_engine::draws::{GenerationContext, StructurePlan};
//! use draw_engine::model::Stage;
//! use draw_engine::playoff::{PlayoffNaming, recursive_playoffs};
//! use draw_engine::policy::PolicyDefinitions;
//!
//! let mut ctx = GenerationContext::new(PolicyDefinitions::default(), Vec::new());
//! let plan = StructurePlan::new(32, Stage::Main);
//! let compass = recursive_playoffs(&mut ctx, &plan, PlayoffNaming::Compass).unwrap();
//! let names: Vec<&str> = compass.structures.iter().map(|s| s.structure_name.as_str()).collect();
//! assert_eq!(names[..4], ["East", "West", "North", "Northeast"]);
//! ```

use log::debug;
use serde_json::json;
use std::collections::{BTreeSet, VecDeque};

use crate::constants::{MAIN, PLAY_OFF};
use crate::draws::{
    DrawGenerator, GeneratedDraw, GenerationContext, Orchestrator, PlayoffGroup, PlayoffSource,
    StructurePlan,
};
use crate::error::{DrawError, DrawResult};
use crate::links::{loser_link, position_link};
use crate::model::extensions::PLAYOFF_PATH;
use crate::model::{DrawLink, DrawType, FeedProfile, LinkType, Stage, Structure};

/// Naming scheme of recursive playoff structures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayoffNaming {
    Compass,
    Olympic,
    /// Every path is generated; children are named by the places they decide
    PlayOff,
}

impl PlayoffNaming {
    /// Name of the structure reached by `path` (the source round numbers
    /// taken from the root), deciding places `range`.
    ///
    /// `None` means the path is not part of the draw.
    pub fn name(self, path: &[u32], range: [u32; 2]) -> Option<String> {
        let name = match self {
            PlayoffNaming::Compass => match path {
                [] => "East",
                [1] => "West",
                [2] => "North",
                [3] => "Northeast",
                [1, 1] => "South",
                [1, 2] => "Southwest",
                [2, 1] => "Northwest",
                [1, 1, 1] => "Southeast",
                _ => return None,
            },
            PlayoffNaming::Olympic => match path {
                [] => "East",
                [1] => "West",
                [2] => "North",
                [1, 1] => "South",
                _ => return None,
            },
            PlayoffNaming::PlayOff => {
                return Some(if path.is_empty() {
                    MAIN.to_string()
                } else {
                    play_off_name(range[0], range[1])
                });
            }
        };
        Some(name.to_string())
    }
}

pub(crate) fn play_off_name(first: u32, last: u32) -> String {
    format!("{PLAY_OFF} {first}-{last}")
}

/// Build a root tree and every named child structure below it.
pub fn recursive_playoffs(
    ctx: &mut GenerationContext,
    plan: &StructurePlan,
    naming: PlayoffNaming,
) -> DrawResult<GeneratedDraw> {
    let offset = plan.finishing_position_offset;
    let root_range = [offset + 1, offset + plan.draw_size];
    let root_name = match &plan.structure_name {
        Some(name) => name.clone(),
        None => naming
            .name(&[], root_range)
            .unwrap_or_else(|| MAIN.to_string()),
    };

    let root = ctx.tree_structure(root_name, plan.stage, plan.draw_size, offset)?;
    let mut generated = GeneratedDraw::default();
    let mut pending = VecDeque::from([(root, Vec::<u32>::new(), plan.draw_size, offset)]);

    while let Some((parent, path, size, parent_offset)) = pending.pop_front() {
        let mut round_number = 1;
        while size >> round_number >= 2 {
            let losers = size >> round_number;
            let child_offset = parent_offset + losers;
            let mut child_path = path.clone();
            child_path.push(round_number);
            round_number += 1;

            let Some(name) = naming.name(&child_path, [child_offset + 1, child_offset + losers])
            else {
                continue;
            };
            debug!("Playoff {name} for path {child_path:?}");

            let child = ctx.tree_structure(name, Stage::PlayOff, losers, child_offset)?;
            generated.links.push(loser_link(
                &parent.structure_id,
                round_number - 1,
                &child.structure_id,
                1,
                FeedProfile::TopDown,
            ));
            generated
                .extensions
                .set(child.structure_id.clone(), PLAYOFF_PATH, json!(child_path));
            pending.push_back((child, child_path, losers, child_offset));
        }
        generated.structures.push(parent);
    }

    Ok(generated)
}

/// Build one playoff structure per group of round robin finishing positions.
///
/// `source` is the round robin CONTAINER; every group sends the finishers
/// in the listed positions.
pub fn round_robin_playoffs(
    ctx: &mut GenerationContext,
    source: &Structure,
    groups: &[PlayoffGroup],
) -> DrawResult<GeneratedDraw> {
    if !source.is_container() {
        return Err(DrawError::InvalidFinishingPositions {
            positions: Vec::new(),
            reason: format!("{} is not a round robin", source.structure_id),
        });
    }

    let group_count = source.structures.len() as u32;
    let group_positions = source
        .structures
        .iter()
        .map(|group| group.position_count() as u32)
        .max()
        .unwrap_or(0);

    let mut claimed = BTreeSet::new();
    let mut generated = GeneratedDraw::default();

    for group in groups {
        let positions = match &group.source {
            PlayoffSource::FinishingPositions(positions) => positions,
            PlayoffSource::Round(round_number) => {
                return Err(DrawError::InvalidFinishingPositions {
                    positions: vec![*round_number],
                    reason: "round robin playoffs are fed by finishing positions".to_string(),
                });
            }
        };
        check_finishing_positions(positions, group_positions, &mut claimed)?;
        check_playoff_type(group.draw_type)?;

        let participants = positions.len() as u32 * group_count;
        if participants < 2 {
            return Err(DrawError::InvalidFinishingPositions {
                positions: positions.clone(),
                reason: "a playoff needs at least two participants".to_string(),
            });
        }

        let offset = (positions[0] - 1) * group_count;
        let name = group
            .structure_name
            .clone()
            .unwrap_or_else(|| play_off_name(offset + 1, offset + participants));
        let plan = StructurePlan::new(participants.next_power_of_two(), Stage::PlayOff)
            .with_offset(offset)
            .with_name(Some(name));

        let playoff = generate_playoff(ctx, group, &plan)?;
        let Some(target_id) = playoff.main_structure_id().cloned() else {
            continue;
        };
        generated.links.push(position_link(
            &source.structure_id,
            positions.clone(),
            &target_id,
            ctx.policy.feed.playoff_profile,
        ));
        generated.absorb(playoff);
    }

    Ok(generated)
}

/// Build one playoff structure per named round of an elimination source.
///
/// `existing_links` are the links already in the document; a round whose
/// losers already leave over an unconditional LOSER link cannot feed a
/// second structure.
pub fn elimination_playoffs(
    ctx: &mut GenerationContext,
    source: &Structure,
    existing_links: &[DrawLink],
    groups: &[PlayoffGroup],
) -> DrawResult<GeneratedDraw> {
    let mut generated = GeneratedDraw::default();

    for group in groups {
        let round_number = match &group.source {
            PlayoffSource::Round(round_number) => *round_number,
            PlayoffSource::FinishingPositions(positions) => {
                return Err(DrawError::InvalidFinishingPositions {
                    positions: positions.clone(),
                    reason: "elimination playoffs are fed by round losers".to_string(),
                });
            }
        };
        check_playoff_type(group.draw_type)?;

        let losers = source.round_match_up_count(round_number);
        if losers == 0 {
            return Err(DrawError::RoundNotFound {
                structure_id: source.structure_id.clone(),
                round_number,
            });
        }
        if losers < 2 || !losers.is_power_of_two() {
            return Err(DrawError::InvalidFinishingPositions {
                positions: vec![round_number],
                reason: format!("{losers} round {round_number} losers cannot fill a playoff tree"),
            });
        }

        let already_linked = existing_links
            .iter()
            .chain(generated.links.iter())
            .any(|link| {
                link.link_type == LinkType::Loser
                    && !link.is_conditional()
                    && link.leaves_round(&source.structure_id, round_number)
            });
        if already_linked {
            return Err(DrawError::OverlappingFinishingPositions(format!(
                "round {round_number} losers of {} already feed a structure",
                source.structure_id
            )));
        }

        let offset = source
            .round_match_ups(round_number)
            .first()
            .and_then(|m| m.finishing_position_range)
            .map(|range| range.loser[0] - 1)
            .ok_or_else(|| {
                DrawError::CorruptDocument(format!(
                    "round {round_number} of {} has no finishing range",
                    source.structure_id
                ))
            })?;
        let name = group
            .structure_name
            .clone()
            .unwrap_or_else(|| play_off_name(offset + 1, offset + losers));
        let plan = StructurePlan::new(losers, Stage::PlayOff)
            .with_offset(offset)
            .with_name(Some(name));

        let playoff = generate_playoff(ctx, group, &plan)?;
        let Some(target_id) = playoff.main_structure_id().cloned() else {
            continue;
        };
        generated.links.push(loser_link(
            &source.structure_id,
            round_number,
            &target_id,
            1,
            ctx.policy.feed.playoff_profile,
        ));
        generated.absorb(playoff);
    }

    Ok(generated)
}

fn generate_playoff(
    ctx: &mut GenerationContext,
    group: &PlayoffGroup,
    plan: &StructurePlan,
) -> DrawResult<GeneratedDraw> {
    let mut playoff = Orchestrator::from(group.draw_type).generate(ctx, plan)?;
    let main = playoff.structures.first_mut();
    if let (Some(stage_sequence), Some(main)) = (group.stage_sequence, main) {
        main.stage_sequence = stage_sequence;
        ctx.claim_sequence(Stage::PlayOff, stage_sequence);
    }
    Ok(playoff)
}

fn check_playoff_type(draw_type: DrawType) -> DrawResult<()> {
    if matches!(draw_type, DrawType::RoundRobin | DrawType::RoundRobinWithPlayoff) {
        return Err(DrawError::UnsupportedDrawType {
            draw_type,
            reason: "playoff structures are elimination draws".to_string(),
        });
    }
    Ok(())
}

/// Positions must be non-empty, sequential, within the group size, and
/// not claimed by an earlier playoff group.
fn check_finishing_positions(
    positions: &[u32],
    group_positions: u32,
    claimed: &mut BTreeSet<u32>,
) -> DrawResult<()> {
    let invalid = |reason: &str| DrawError::InvalidFinishingPositions {
        positions: positions.to_vec(),
        reason: reason.to_string(),
    };

    let Some(&first) = positions.first() else {
        return Err(invalid("no finishing positions"));
    };
    if positions.windows(2).any(|pair| pair[1] != pair[0] + 1) {
        return Err(invalid("finishing positions must be sequential"));
    }
    if first == 0 || positions.iter().any(|&p| p > group_positions) {
        return Err(invalid("finishing positions outside the group size"));
    }
    if let Some(overlap) = positions.iter().find(|p| claimed.contains(*p)) {
        return Err(DrawError::OverlappingFinishingPositions(format!(
            "finishing position {overlap} feeds more than one playoff"
        )));
    }
    claimed.extend(positions.iter().copied());
    Ok(())
}
