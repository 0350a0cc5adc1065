//! Round robin, optionally followed by playoffs.

use log::debug;

use super::{DrawGenerator, GeneratedDraw, GenerationContext, PlayoffGroup, StructurePlan};
use crate::builder::{build_round_robin, container_structure};
use crate::constants::{DEFAULT_GROUP_SIZE, MAIN};
use crate::error::DrawResult;
use crate::playoff::round_robin_playoffs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRobin {
    pub group_size: u32,
    /// Non-empty for ROUND_ROBIN_WITH_PLAYOFF
    pub playoff_groups: Vec<PlayoffGroup>,
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
            playoff_groups: Vec::new(),
        }
    }
}

impl DrawGenerator for RoundRobin {
    fn generate(
        &self,
        ctx: &mut GenerationContext,
        plan: &StructurePlan,
    ) -> DrawResult<GeneratedDraw> {
        let structure_id = ctx.ids.next_id();
        let groups = build_round_robin(&mut ctx.ids, plan.draw_size, self.group_size, plan.stage)?;
        debug!(
            "Round robin of {} in {} groups of {}",
            plan.draw_size,
            groups.len(),
            self.group_size
        );

        let stage_sequence = ctx.next_sequence(plan.stage);
        let container = container_structure(
            structure_id,
            plan.name_or(MAIN),
            plan.stage,
            stage_sequence,
            groups,
        );

        let playoffs = if self.playoff_groups.is_empty() {
            GeneratedDraw::default()
        } else {
            round_robin_playoffs(ctx, &container, &self.playoff_groups)?
        };

        let mut generated = GeneratedDraw::single(container);
        generated.absorb(playoffs);
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinkType, Stage, StructureType};
    use crate::policy::PolicyDefinitions;

    fn ctx() -> GenerationContext {
        GenerationContext::new(PolicyDefinitions::default(), Vec::new())
    }

    #[test]
    fn test_round_robin_container() {
        let generated = RoundRobin::default()
            .generate(&mut ctx(), &StructurePlan::new(10, Stage::Main))
            .unwrap();
        let container = &generated.structures[0];
        assert_eq!(container.structure_type, StructureType::Container);
        assert_eq!(container.structures.len(), 3);
        assert_eq!(container.position_count(), 12);
        assert_eq!(container.all_match_ups().len(), 18);
        assert!(generated.links.is_empty());
    }

    #[test]
    fn test_round_robin_with_playoffs() {
        let orchestrator = RoundRobin {
            group_size: 4,
            playoff_groups: vec![
                PlayoffGroup::finishing_positions(vec![1]),
                PlayoffGroup::finishing_positions(vec![2]),
            ],
        };
        let generated = orchestrator
            .generate(&mut ctx(), &StructurePlan::new(16, Stage::Main))
            .unwrap();

        assert_eq!(generated.structures.len(), 3);
        assert!(generated.links.iter().all(|l| l.link_type == LinkType::Position));

        let second = &generated.structures[2];
        assert_eq!(second.stage, Stage::PlayOff);
        assert_eq!(second.stage_sequence, 2);
        assert_eq!(second.finishing_range(), Some([5, 8]));
    }

    #[test]
    fn test_invalid_grouping_is_rejected() {
        let orchestrator = RoundRobin {
            group_size: 4,
            playoff_groups: Vec::new(),
        };
        assert!(
            orchestrator
                .generate(&mut ctx(), &StructurePlan::new(5, Stage::Main))
                .is_err()
        );
    }
}
