//! Double elimination.
//!
//! Main tree, a backdraw ladder fed by the losers of every main round, and a
//! two-position decider fed by both bracket winners.

use log::debug;

use super::{DrawGenerator, GeneratedDraw, GenerationContext, StructurePlan};
use crate::builder::LadderOptions;
use crate::builder::tree::{check_tree_size, tree_round_count};
use crate::constants::{BACKDRAW, DECIDER, DECIDER_DRAW_SIZE, MAIN, MIN_CONSOLATION_DRAW_SIZE};
use crate::error::{DrawError, DrawResult};
use crate::links::{ladder_feed_links, winner_link};
use crate::model::{FeedProfile, Stage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleElimination;

impl DrawGenerator for DoubleElimination {
    fn generate(
        &self,
        ctx: &mut GenerationContext,
        plan: &StructurePlan,
    ) -> DrawResult<GeneratedDraw> {
        let draw_size = plan.draw_size;
        check_tree_size(draw_size)?;
        if draw_size < MIN_CONSOLATION_DRAW_SIZE {
            return Err(DrawError::InvalidDrawSize {
                draw_size,
                reason: format!(
                    "double elimination needs at least {MIN_CONSOLATION_DRAW_SIZE} positions"
                ),
            });
        }

        let offset = plan.finishing_position_offset;
        let round_count = tree_round_count(draw_size);
        let main = ctx.tree_structure(plan.name_or(MAIN), plan.stage, draw_size, offset)?;

        // backdraw: first round losers form the base, every later round feeds
        let fed_counts: Vec<u32> = (2..=round_count).map(|round| draw_size >> round).collect();
        let options = LadderOptions::new(draw_size / 2, fed_counts).with_offset(offset + 1);
        let (backdraw, feed_rounds) = ctx.ladder_structure(BACKDRAW, Stage::Consolation, &options)?;

        let decider = ctx.tree_structure(DECIDER, Stage::PlayOff, DECIDER_DRAW_SIZE, offset)?;

        let main_rounds: Vec<u32> = (1..=round_count).collect();
        let mut links = ladder_feed_links(
            &main.structure_id,
            &main_rounds,
            &backdraw.structure_id,
            &feed_rounds,
            ctx.policy.feed.first_round_profile,
        )?;
        links.push(winner_link(
            &main.structure_id,
            round_count,
            &decider.structure_id,
            1,
            FeedProfile::TopDown,
        ));
        links.push(winner_link(
            &backdraw.structure_id,
            backdraw.round_count(),
            &decider.structure_id,
            1,
            FeedProfile::BottomUp,
        ));

        debug!(
            "Double elimination of {draw_size}: backdraw of {} positions in {} rounds",
            backdraw.position_count(),
            backdraw.round_count()
        );

        Ok(GeneratedDraw {
            structures: vec![main, backdraw, decider],
            links,
            ..GeneratedDraw::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkType;
    use crate::policy::PolicyDefinitions;

    fn generate(draw_size: u32) -> DrawResult<GeneratedDraw> {
        let mut ctx = GenerationContext::new(PolicyDefinitions::default(), Vec::new());
        DoubleElimination.generate(&mut ctx, &StructurePlan::new(draw_size, Stage::Main))
    }

    #[test]
    fn test_double_elimination_composition() {
        let generated = generate(8).unwrap();
        let [main, backdraw, decider] = &generated.structures[..] else {
            panic!("expected three structures");
        };

        assert_eq!(main.position_count(), 8);
        assert_eq!(backdraw.position_count(), 7);
        assert_eq!(backdraw.stage, Stage::Consolation);
        assert_eq!(decider.position_count(), 2);

        let into_decider: Vec<_> = generated
            .links
            .iter()
            .filter(|l| l.target.structure_id == decider.structure_id)
            .collect();
        assert_eq!(into_decider.len(), 2);
        assert!(into_decider.iter().all(|l| l.link_type == LinkType::Winner));

        let loser_links = generated
            .links
            .iter()
            .filter(|l| l.link_type == LinkType::Loser)
            .count();
        assert_eq!(loser_links, 3);
    }

    #[test]
    fn test_double_elimination_rejects_two() {
        assert!(matches!(
            generate(2),
            Err(DrawError::InvalidDrawSize { draw_size: 2, .. })
        ));
    }
}
