//! COMPASS, OLYMPIC and PLAY_OFF draws.

use super::{DrawGenerator, GeneratedDraw, GenerationContext, StructurePlan};
use crate::error::DrawResult;
use crate::playoff::{PlayoffNaming, recursive_playoffs};

/// Every round's losers spawn a child structure, recursively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursivePlayoff {
    pub naming: PlayoffNaming,
}

impl DrawGenerator for RecursivePlayoff {
    fn generate(
        &self,
        ctx: &mut GenerationContext,
        plan: &StructurePlan,
    ) -> DrawResult<GeneratedDraw> {
        recursive_playoffs(ctx, plan, self.naming)
    }
}
