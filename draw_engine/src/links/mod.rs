//! Link builder.
//!
//! Links are the only edges between structures. Orchestrators create them
//! with the constructors below; placement and routing resolve them into
//! concrete target slots through [`targets`].

pub mod targets;

pub use targets::{
    MatchUpTargets, PositionTargets, TargetSlot, next_slot, position_targets, resolve_target,
};

use crate::error::{DrawError, DrawResult};
use crate::model::{DrawLink, FeedProfile, LinkCondition, LinkSource, LinkTarget, LinkType};

fn round_link(
    link_type: LinkType,
    source_structure_id: &str,
    source_round: u32,
    target_structure_id: &str,
    target_round: u32,
    feed_profile: FeedProfile,
) -> DrawLink {
    DrawLink {
        link_type,
        source: LinkSource {
            structure_id: source_structure_id.to_string(),
            round_number: Some(source_round),
            finishing_positions: None,
        },
        target: LinkTarget {
            structure_id: target_structure_id.to_string(),
            round_number: target_round,
            feed_profile,
        },
        link_condition: None,
    }
}

/// Losers of `source_round` enter `target_round` of the target structure.
pub fn loser_link(
    source_structure_id: &str,
    source_round: u32,
    target_structure_id: &str,
    target_round: u32,
    feed_profile: FeedProfile,
) -> DrawLink {
    round_link(
        LinkType::Loser,
        source_structure_id,
        source_round,
        target_structure_id,
        target_round,
        feed_profile,
    )
}

/// Winners of `source_round` enter `target_round` of the target structure.
pub fn winner_link(
    source_structure_id: &str,
    source_round: u32,
    target_structure_id: &str,
    target_round: u32,
    feed_profile: FeedProfile,
) -> DrawLink {
    round_link(
        LinkType::Winner,
        source_structure_id,
        source_round,
        target_structure_id,
        target_round,
        feed_profile,
    )
}

/// Losers of `source_round` who lose their first played match.
pub fn first_match_loser_link(
    source_structure_id: &str,
    source_round: u32,
    target_structure_id: &str,
    feed_profile: FeedProfile,
) -> DrawLink {
    let mut link = loser_link(
        source_structure_id,
        source_round,
        target_structure_id,
        1,
        feed_profile,
    );
    link.link_condition = Some(LinkCondition::FirstMatchup);
    link
}

/// Finishers of a round robin in `finishing_positions` enter round one of
/// the target structure.
pub fn position_link(
    source_structure_id: &str,
    finishing_positions: Vec<u32>,
    target_structure_id: &str,
    feed_profile: FeedProfile,
) -> DrawLink {
    DrawLink {
        link_type: LinkType::Position,
        source: LinkSource {
            structure_id: source_structure_id.to_string(),
            round_number: None,
            finishing_positions: Some(finishing_positions),
        },
        target: LinkTarget {
            structure_id: target_structure_id.to_string(),
            round_number: 1,
            feed_profile,
        },
        link_condition: None,
    }
}

/// LOSER links feeding a ladder.
///
/// `source_rounds[0]` fills the ladder's base round; each later source round
/// fills the matching feed round. Profiles alternate starting from
/// `first_profile` so losers are mirrored into the opposite half.
pub fn ladder_feed_links(
    source_structure_id: &str,
    source_rounds: &[u32],
    ladder_structure_id: &str,
    ladder_feed_rounds: &[u32],
    first_profile: FeedProfile,
) -> DrawResult<Vec<DrawLink>> {
    if source_rounds.len() != ladder_feed_rounds.len() + 1 {
        return Err(DrawError::UnresolvableLinkTarget(format!(
            "{} source rounds cannot feed a ladder with {} feed rounds",
            source_rounds.len(),
            ladder_feed_rounds.len()
        )));
    }

    let target_rounds = std::iter::once(1).chain(ladder_feed_rounds.iter().copied());
    let mut profile = first_profile;
    let links = source_rounds
        .iter()
        .zip(target_rounds)
        .map(|(&source_round, target_round)| {
            let link = loser_link(
                source_structure_id,
                source_round,
                ladder_structure_id,
                target_round,
                profile,
            );
            profile = profile.alternate();
            link
        })
        .collect();

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_feed_links_alternate_profiles() {
        let links = ladder_feed_links("main", &[1, 2, 3], "cons", &[2, 4], FeedProfile::TopDown)
            .unwrap();

        let shape: Vec<_> = links
            .iter()
            .map(|l| {
                (
                    l.source.round_number,
                    l.target.round_number,
                    l.target.feed_profile,
                )
            })
            .collect();
        assert_eq!(
            shape,
            vec![
                (Some(1), 1, FeedProfile::TopDown),
                (Some(2), 2, FeedProfile::BottomUp),
                (Some(3), 4, FeedProfile::TopDown),
            ]
        );
        assert!(links.iter().all(|l| l.link_type == LinkType::Loser));
    }

    #[test]
    fn test_ladder_feed_links_count_mismatch() {
        let err = ladder_feed_links("main", &[1], "cons", &[2], FeedProfile::TopDown).unwrap_err();
        assert!(matches!(err, DrawError::UnresolvableLinkTarget(_)));
    }

    #[test]
    fn test_first_match_link_is_conditional() {
        let link = first_match_loser_link("main", 2, "cons", FeedProfile::LossPosition);
        assert!(link.is_conditional());
        assert_eq!(link.target.round_number, 1);
        assert!(link.leaves_round("main", 2));
    }
}
