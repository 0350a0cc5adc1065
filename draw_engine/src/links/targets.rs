//! Link target resolution and the per-structure reverse index.
//!
//! For a source match-up at round position `i` of `m_s` match-ups and a
//! target round of `m_t` match-ups:
//!
//! - TOP_DOWN keeps `i`, BOTTOM_UP mirrors it to `m_s + 1 - i`
//! - a feed round (`m_s == m_t`) receives the participant on the fed position
//! - a pairing round (`m_s == 2 * m_t`) uses match-up `ceil(i / 2)`, side one
//!   for odd `i` and side two for even `i`
//! - LOSS_POSITION reuses the slot the round one loser link maps the
//!   participant's first match-up to

use std::collections::HashMap;

use crate::error::{DrawError, DrawResult};
use crate::model::{
    DrawDefinition, DrawLink, DrawPosition, FeedProfile, LinkType, MatchUpId, Structure,
    StructureId,
};

/// Where a participant crossing a link lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSlot {
    pub structure_id: StructureId,
    pub match_up_id: MatchUpId,
    pub round_number: u32,
    pub round_position: u32,
    /// 0 for side one, 1 for side two
    pub side: usize,
    /// Position already bound to the slot, if the round defines one
    pub draw_position: Option<DrawPosition>,
}

/// In-structure successor slot of a match-up as `(match-up index, side)`.
pub fn next_slot(
    structure: &Structure,
    round_number: u32,
    round_position: u32,
) -> Option<(usize, usize)> {
    let current = structure.round_match_up_count(round_number);
    let next = structure.round_match_up_count(round_number + 1);
    if next == 0 {
        return None;
    }

    if structure.is_feed_round(round_number + 1) && next == current {
        let index = structure.match_up_index(round_number + 1, round_position)?;
        Some((index, 1))
    } else if current == next * 2 {
        let index = structure.match_up_index(round_number + 1, round_position.div_ceil(2))?;
        Some((index, pairing_side(round_position)))
    } else {
        None
    }
}

fn pairing_side(round_position: u32) -> usize {
    if round_position % 2 == 1 { 0 } else { 1 }
}

/// Resolve the slot a participant leaving `source_round_position` lands in.
///
/// `losing_position` is the participant's draw position in the source
/// structure; it is only needed for LOSS_POSITION links. RANDOM and DRAW
/// links have no fixed slot and cannot be resolved here.
pub fn resolve_target(
    draw: &DrawDefinition,
    link: &DrawLink,
    source_round_position: u32,
    losing_position: Option<DrawPosition>,
) -> DrawResult<TargetSlot> {
    let source = draw.structure(&link.source.structure_id)?;
    let target = draw
        .structure(&link.target.structure_id)
        .map_err(|_| DrawError::DanglingLink(link.target.structure_id.clone()))?;
    let source_round = link.source.round_number.ok_or_else(|| {
        DrawError::UnresolvableLinkTarget(format!(
            "{:?} link from {} has no source round",
            link.link_type, link.source.structure_id
        ))
    })?;

    match link.target.feed_profile {
        FeedProfile::TopDown | FeedProfile::BottomUp => resolve_ordered(
            source,
            target,
            source_round,
            source_round_position,
            link.target.round_number,
            link.target.feed_profile,
        ),
        FeedProfile::LossPosition => {
            let draw_position = losing_position.ok_or_else(|| {
                DrawError::UnresolvableLinkTarget(
                    "loss position link needs the losing draw position".to_string(),
                )
            })?;
            let first_round = source.initial_round_number(draw_position).ok_or_else(|| {
                DrawError::DrawPositionNotFound {
                    structure_id: source.structure_id.clone(),
                    draw_position,
                }
            })?;
            let first_match_up = source
                .round_match_ups(first_round)
                .into_iter()
                .find(|m| m.contains(draw_position))
                .ok_or_else(|| DrawError::MatchUpNotFound(format!(
                    "round {first_round} match-up for position {draw_position}"
                )))?;
            let first_link = draw
                .loser_link(&source.structure_id, first_round)
                .filter(|l| l.target.structure_id == target.structure_id)
                .ok_or_else(|| {
                    DrawError::UnresolvableLinkTarget(format!(
                        "no round {first_round} loser link from {} into {}",
                        source.structure_id, target.structure_id
                    ))
                })?;

            resolve_ordered(
                source,
                target,
                first_round,
                first_match_up.round_position,
                first_link.target.round_number,
                first_link.target.feed_profile,
            )
        }
        FeedProfile::Random | FeedProfile::Draw => Err(DrawError::UnresolvableLinkTarget(format!(
            "{:?} links are placed by draw",
            link.target.feed_profile
        ))),
    }
}

fn resolve_ordered(
    source: &Structure,
    target: &Structure,
    source_round: u32,
    source_round_position: u32,
    target_round: u32,
    profile: FeedProfile,
) -> DrawResult<TargetSlot> {
    let source_count = source.round_match_up_count(source_round);
    let target_count = target.round_match_up_count(target_round);
    if source_count == 0 {
        return Err(DrawError::RoundNotFound {
            structure_id: source.structure_id.clone(),
            round_number: source_round,
        });
    }
    if target_count == 0 {
        return Err(DrawError::RoundNotFound {
            structure_id: target.structure_id.clone(),
            round_number: target_round,
        });
    }

    let ordered = match profile {
        FeedProfile::BottomUp => source_count + 1 - source_round_position,
        _ => source_round_position,
    };

    let same_width = source_count == target_count;
    let (round_position, side) = if target.is_feed_round(target_round) && same_width {
        (ordered, 0)
    } else if source_count == target_count * 2 {
        (ordered.div_ceil(2), pairing_side(ordered))
    } else if source_count == target_count {
        // a plain round of equal width: BOTTOM_UP fills the second side
        (ordered, usize::from(profile == FeedProfile::BottomUp))
    } else {
        return Err(DrawError::UnresolvableLinkTarget(format!(
            "{source_count} match-ups in {} round {source_round} cannot feed \
             {target_count} in {} round {target_round}",
            source.structure_id, target.structure_id
        )));
    };

    let index = target
        .match_up_index(target_round, round_position)
        .ok_or_else(|| DrawError::RoundNotFound {
            structure_id: target.structure_id.clone(),
            round_number: target_round,
        })?;
    let match_up = &target.match_ups[index];

    Ok(TargetSlot {
        structure_id: target.structure_id.clone(),
        match_up_id: match_up.match_up_id.clone(),
        round_number: target_round,
        round_position,
        side,
        draw_position: match_up.draw_positions[side],
    })
}

/// Successors of one elimination match-up
#[derive(Debug, Clone, PartialEq)]
pub struct MatchUpTargets {
    /// Next match-up in the same structure as `(index, side)`
    pub winner_slot: Option<(usize, usize)>,
    /// WINNER link leaving the round, when the round is the last one
    pub winner_link: Option<DrawLink>,
    /// LOSER links leaving the round, conditional ones included
    pub loser_links: Vec<DrawLink>,
}

/// Reverse index of an elimination structure keyed by match-up id.
pub type PositionTargets = HashMap<MatchUpId, MatchUpTargets>;

pub fn position_targets(draw: &DrawDefinition, structure_id: &str) -> DrawResult<PositionTargets> {
    let structure = draw.structure(structure_id)?;
    if structure.is_container() {
        return Ok(PositionTargets::new());
    }

    let targets = structure
        .match_ups
        .iter()
        .map(|match_up| {
            let round_links: Vec<&DrawLink> = draw
                .links_from_round(structure_id, match_up.round_number)
                .collect();
            let targets = MatchUpTargets {
                winner_slot: next_slot(structure, match_up.round_number, match_up.round_position),
                winner_link: round_links
                    .iter()
                    .find(|l| l.link_type == LinkType::Winner)
                    .map(|l| (*l).clone()),
                loser_links: round_links
                    .into_iter()
                    .filter(|l| l.link_type == LinkType::Loser)
                    .cloned()
                    .collect(),
            };
            (match_up.match_up_id.clone(), targets)
        })
        .collect();

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{LadderOptions, TreeOptions, build_ladder, build_tree, item_structure};
    use crate::ids::IdSource;
    use crate::links::{ladder_feed_links, loser_link};
    use crate::model::{DrawType, Stage};

    fn tree(ids: &mut IdSource, id: &str, size: u32, stage: Stage) -> Structure {
        let match_ups = build_tree(ids, &TreeOptions::new(size)).unwrap();
        item_structure(id.to_string(), id, stage, 1, match_ups, size)
    }

    fn consolation_draw() -> DrawDefinition {
        let mut ids = IdSource::sequential("m");
        let mut draw = DrawDefinition::new("d", DrawType::FeedInChampionship);
        draw.structures.push(tree(&mut ids, "main", 8, Stage::Main));

        let ladder = build_ladder(&mut ids, &LadderOptions::new(4, vec![2])).unwrap();
        draw.structures.push(item_structure(
            "cons".to_string(),
            "cons",
            Stage::Consolation,
            1,
            ladder.match_ups,
            ladder.position_count,
        ));
        let feed_rounds = &ladder.feed_rounds;
        draw.links =
            ladder_feed_links("main", &[1, 2], "cons", feed_rounds, FeedProfile::TopDown).unwrap();
        draw
    }

    #[test]
    fn test_next_slot_pairs_and_feeds() {
        let draw = consolation_draw();
        let main = draw.structure("main").unwrap();
        let (index, side) = next_slot(main, 1, 3).unwrap();
        assert_eq!(main.match_ups[index].round_number, 2);
        assert_eq!(main.match_ups[index].round_position, 2);
        assert_eq!(side, 0);
        assert_eq!(next_slot(main, 3, 1), None);

        let cons = draw.structure("cons").unwrap();
        let (index, side) = next_slot(cons, 1, 2).unwrap();
        assert!(cons.match_ups[index].feed_round);
        assert_eq!(cons.match_ups[index].round_position, 2);
        assert_eq!(side, 1);
    }

    #[test]
    fn test_pairing_target_parity() {
        let draw = consolation_draw();
        let base_link = draw.links[0].clone();

        // cons base positions are 3..=6; main R1 match-up 2 maps to side two of cons match-up 1
        let slot = resolve_target(&draw, &base_link, 2, None).unwrap();
        assert_eq!((slot.round_position, slot.side), (1, 1));
        assert_eq!(slot.draw_position, Some(4));

        let slot = resolve_target(&draw, &base_link, 3, None).unwrap();
        assert_eq!((slot.round_position, slot.side), (2, 0));
        assert_eq!(slot.draw_position, Some(5));
    }

    #[test]
    fn test_bottom_up_feed_target_mirrors() {
        let draw = consolation_draw();
        let feed_link = draw.links[1].clone();
        assert_eq!(feed_link.target.feed_profile, FeedProfile::BottomUp);

        // main R2 match-up 1 lands on the fed position of cons R2 match-up 2
        let slot = resolve_target(&draw, &feed_link, 1, None).unwrap();
        assert_eq!(slot.round_number, 2);
        assert_eq!(slot.round_position, 2);
        assert_eq!(slot.draw_position, Some(2));
    }

    #[test]
    fn test_loss_position_reuses_first_round_slot() {
        let mut ids = IdSource::sequential("m");
        let mut draw = DrawDefinition::new("d", DrawType::FirstMatchLoserConsolation);
        draw.structures.push(tree(&mut ids, "main", 8, Stage::Main));
        draw.structures.push(tree(&mut ids, "cons", 4, Stage::Consolation));
        draw.links.push(loser_link("main", 1, "cons", 1, FeedProfile::TopDown));
        draw.links.push(crate::links::first_match_loser_link(
            "main",
            2,
            "cons",
            FeedProfile::LossPosition,
        ));

        // position 6 played its first match-up in main R1 match-up 3
        let slot = resolve_target(&draw, &draw.links[1], 2, Some(6)).unwrap();
        assert_eq!(slot.draw_position, Some(3));

        let err = resolve_target(&draw, &draw.links[1], 2, None).unwrap_err();
        assert!(matches!(err, DrawError::UnresolvableLinkTarget(_)));
    }

    #[test]
    fn test_position_targets_index() {
        let draw = consolation_draw();
        let targets = position_targets(&draw, "main").unwrap();
        let main = draw.structure("main").unwrap();

        let first = &targets[&main.round_match_ups(1)[0].match_up_id];
        assert_eq!(first.loser_links.len(), 1);
        assert!(first.winner_slot.is_some());

        let final_match = &targets[&main.round_match_ups(3)[0].match_up_id];
        assert!(final_match.winner_slot.is_none());
        assert!(final_match.loser_links.is_empty());
    }
}
