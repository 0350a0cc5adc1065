//! Feed-in championship and its variants.
//!
//! All variants share one shape: a main tree whose first `F` rounds feed a
//! consolation ladder. They differ only in `F`.

use super::{DrawGenerator, GeneratedDraw, GenerationContext, StructurePlan};
use crate::builder::LadderOptions;
use crate::builder::tree::{check_tree_size, tree_round_count};
use crate::constants::{CONSOLATION, MAIN, MIN_CONSOLATION_DRAW_SIZE};
use crate::error::{DrawError, DrawResult};
use crate::links::ladder_feed_links;
use crate::model::{DrawType, Stage};

/// How many main rounds feed the consolation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedRounds {
    /// Every round but the final
    Championship,
    ToSemifinal,
    ToQuarterfinal,
    ToRoundOf16,
    /// First two rounds only
    Modified,
}

impl From<DrawType> for FeedRounds {
    fn from(draw_type: DrawType) -> Self {
        match draw_type {
            DrawType::FeedInChampionshipToSf => FeedRounds::ToSemifinal,
            DrawType::FeedInChampionshipToQf => FeedRounds::ToQuarterfinal,
            DrawType::FeedInChampionshipToR16 => FeedRounds::ToRoundOf16,
            DrawType::ModifiedFeedInChampionship => FeedRounds::Modified,
            _ => FeedRounds::Championship,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedInChampionship {
    pub feed_rounds: FeedRounds,
    pub feeds_from_final: bool,
}

impl FeedInChampionship {
    pub fn new(feed_rounds: FeedRounds) -> Self {
        Self {
            feed_rounds,
            feeds_from_final: false,
        }
    }

    pub fn feeds_from_final(mut self, feeds_from_final: bool) -> Self {
        self.feeds_from_final = feeds_from_final;
        self
    }

    /// Main rounds feeding the consolation in a tree of `round_count` rounds.
    pub fn fed_round_count(&self, round_count: u32) -> u32 {
        let wanted = match self.feed_rounds {
            FeedRounds::Championship if self.feeds_from_final => round_count,
            FeedRounds::Championship | FeedRounds::ToSemifinal => round_count.saturating_sub(1),
            FeedRounds::ToQuarterfinal => round_count.saturating_sub(2),
            FeedRounds::ToRoundOf16 => round_count.saturating_sub(3),
            FeedRounds::Modified => 2,
        };
        let ceiling = if self.feeds_from_final {
            round_count
        } else {
            round_count.saturating_sub(1)
        };
        wanted.min(ceiling).max(1)
    }
}

impl DrawGenerator for FeedInChampionship {
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
                    "a consolation needs a main draw of at least {MIN_CONSOLATION_DRAW_SIZE}"
                ),
            });
        }

        let offset = plan.finishing_position_offset;
        let fed_rounds = self.fed_round_count(tree_round_count(draw_size));
        let main = ctx.tree_structure(plan.name_or(MAIN), plan.stage, draw_size, offset)?;

        let fed_counts: Vec<u32> = (2..=fed_rounds).map(|round| draw_size >> round).collect();
        let options = LadderOptions::new(draw_size / 2, fed_counts)
            .with_offset(offset + (draw_size >> fed_rounds));
        let (consolation, feed_rounds) =
            ctx.ladder_structure(CONSOLATION, Stage::Consolation, &options)?;

        let main_rounds: Vec<u32> = (1..=fed_rounds).collect();
        let links = ladder_feed_links(
            &main.structure_id,
            &main_rounds,
            &consolation.structure_id,
            &feed_rounds,
            ctx.policy.feed.first_round_profile,
        )?;

        Ok(GeneratedDraw {
            structures: vec![main, consolation],
            links,
            ..GeneratedDraw::default()
        })
    }
}
