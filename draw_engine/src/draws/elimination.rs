//! Single structure elimination draws.

use log::debug;

use super::{DrawGenerator, GeneratedDraw, GenerationContext, StructurePlan};
use crate::builder::{LadderOptions, feed_in_counts};
use crate::constants::MAIN;
use crate::error::DrawResult;

/// SINGLE_ELIMINATION: one tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingleElimination;

impl DrawGenerator for SingleElimination {
    fn generate(
        &self,
        ctx: &mut GenerationContext,
        plan: &StructurePlan,
    ) -> DrawResult<GeneratedDraw> {
        let main = ctx.tree_structure(
            plan.name_or(MAIN),
            plan.stage,
            plan.draw_size,
            plan.finishing_position_offset,
        )?;
        Ok(GeneratedDraw::single(main))
    }
}

/// FEED_IN: one ladder sized exactly to the draw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedIn;

impl DrawGenerator for FeedIn {
    fn generate(
        &self,
        ctx: &mut GenerationContext,
        plan: &StructurePlan,
    ) -> DrawResult<GeneratedDraw> {
        let (base_size, fed_counts) = feed_in_counts(plan.draw_size)?;
        debug!(
            "Feed-in draw of {}: base {base_size}, fed {fed_counts:?}",
            plan.draw_size
        );

        let options =
            LadderOptions::new(base_size, fed_counts).with_offset(plan.finishing_position_offset);
        let (main, _) = ctx.ladder_structure(plan.name_or(MAIN), plan.stage, &options)?;
        Ok(GeneratedDraw::single(main))
    }
}
