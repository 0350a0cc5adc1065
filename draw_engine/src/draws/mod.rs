//! Draw-type orchestrators.
//!
//! Every draw type maps onto one orchestrator through the closed
//! [`Orchestrator`] enum. Orchestrators compose structure builders and link
//! builders into a [`GeneratedDraw`]; they hold no state between calls and
//! abort on the first error without returning partial structures.
//!
//! ## Example
//!
//! ```
//! use draw_engine::draws::{DrawGenerator, GenerationContext, Orchestrator, StructurePlan};
//! use draw_engine::model::{DrawType, Stage};
//! use draw_engine::policy::PolicyDefinitions;
//!
//! let mut ctx = GenerationContext::new(PolicyDefinitions::default(), Vec::new());
//! let orchestrator = Orchestrator::from(DrawType::DoubleElimination);
//! let generated = orchestrator
//!     .generate(&mut ctx, &StructurePlan::new(8, Stage::Main))
//!     .unwrap();
//! assert_eq!(generated.structures.len(), 3);
//! ```

pub mod compass;
pub mod consolation;
pub mod double_elimination;
pub mod elimination;
pub mod feed_in_championship;
pub mod params;
pub mod qualifying;
pub mod round_robin;

pub use compass::RecursivePlayoff;
pub use consolation::{CurtisConsolation, FirstMatchLoserConsolation, FirstRoundLoserConsolation};
pub use double_elimination::DoubleElimination;
pub use elimination::{FeedIn, SingleElimination};
pub use feed_in_championship::{FeedInChampionship, FeedRounds};
pub use params::{DrawParams, PlayoffGroup, PlayoffSource, QualifyingProfile};
pub use round_robin::RoundRobin;

use enum_dispatch::enum_dispatch;
use std::collections::BTreeMap;

use crate::builder::{Ladder, LadderOptions, TreeOptions, build_ladder, build_tree, item_structure};
use crate::error::DrawResult;
use crate::ids::IdSource;
use crate::model::{DrawLink, DrawType, ExtensionTable, Stage, Structure, StructureId};
use crate::playoff::PlayoffNaming;
use crate::policy::PolicyDefinitions;

/// Shared state of one generation call
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub policy: PolicyDefinitions,
    pub ids: IdSource,
    sequences: BTreeMap<Stage, u32>,
}

impl GenerationContext {
    pub fn new(policy: PolicyDefinitions, supplied_ids: Vec<String>) -> Self {
        Self {
            policy,
            ids: IdSource::with_supplied(supplied_ids),
            sequences: BTreeMap::new(),
        }
    }

    /// Continue stage sequences after the structures already in a document.
    pub fn after_existing(mut self, structures: &[Structure]) -> Self {
        for structure in structures {
            let sequence = self.sequences.entry(structure.stage).or_default();
            *sequence = (*sequence).max(structure.stage_sequence);
        }
        self
    }

    /// Next free stage sequence for `stage`.
    pub fn next_sequence(&mut self, stage: Stage) -> u32 {
        let sequence = self.sequences.entry(stage).or_default();
        *sequence += 1;
        *sequence
    }

    /// Reserve an explicit stage sequence.
    pub fn claim_sequence(&mut self, stage: Stage, stage_sequence: u32) {
        let sequence = self.sequences.entry(stage).or_default();
        *sequence = (*sequence).max(stage_sequence);
    }

    pub(crate) fn tree_structure(
        &mut self,
        name: impl Into<String>,
        stage: Stage,
        draw_size: u32,
        offset: u32,
    ) -> DrawResult<Structure> {
        let structure_id = self.ids.next_id();
        let options = TreeOptions::new(draw_size).with_offset(offset);
        let match_ups = build_tree(&mut self.ids, &options)?;
        let stage_sequence = self.next_sequence(stage);
        Ok(item_structure(
            structure_id,
            name,
            stage,
            stage_sequence,
            match_ups,
            draw_size,
        ))
    }

    /// Build a ladder structure; also returns the ladder's feed rounds.
    pub(crate) fn ladder_structure(
        &mut self,
        name: impl Into<String>,
        stage: Stage,
        options: &LadderOptions,
    ) -> DrawResult<(Structure, Vec<u32>)> {
        let structure_id = self.ids.next_id();
        let Ladder {
            match_ups,
            position_count,
            feed_rounds,
        } = build_ladder(&mut self.ids, options)?;
        let stage_sequence = self.next_sequence(stage);
        let structure = item_structure(
            structure_id,
            name,
            stage,
            stage_sequence,
            match_ups,
            position_count,
        );
        Ok((structure, feed_rounds))
    }
}

/// Size, stage, and naming of the main structure an orchestrator builds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructurePlan {
    pub draw_size: u32,
    pub stage: Stage,
    pub finishing_position_offset: u32,
    pub structure_name: Option<String>,
}

impl StructurePlan {
    pub fn new(draw_size: u32, stage: Stage) -> Self {
        Self {
            draw_size,
            stage,
            finishing_position_offset: 0,
            structure_name: None,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.finishing_position_offset = offset;
        self
    }

    pub fn with_name(mut self, structure_name: Option<String>) -> Self {
        self.structure_name = structure_name;
        self
    }

    pub(crate) fn name_or(&self, default: &str) -> String {
        self.structure_name
            .clone()
            .unwrap_or_else(|| default.to_string())
    }
}

/// Output of an orchestrator; the first structure is the main one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedDraw {
    pub structures: Vec<Structure>,
    pub links: Vec<DrawLink>,
    pub extensions: ExtensionTable,
}

impl GeneratedDraw {
    pub fn single(structure: Structure) -> Self {
        Self {
            structures: vec![structure],
            ..Self::default()
        }
    }

    pub fn main_structure_id(&self) -> Option<&StructureId> {
        self.structures.first().map(|s| &s.structure_id)
    }

    /// Append another generated draw (its structures follow ours).
    pub fn absorb(&mut self, other: GeneratedDraw) {
        self.structures.extend(other.structures);
        self.links.extend(other.links);
        self.extensions.merge(other.extensions);
    }
}

/// Contract every orchestrator satisfies
#[enum_dispatch]
pub trait DrawGenerator {
    fn generate(
        &self,
        ctx: &mut GenerationContext,
        plan: &StructurePlan,
    ) -> DrawResult<GeneratedDraw>;
}

/// Registry mapping each draw type onto its orchestrator
#[enum_dispatch(DrawGenerator)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Orchestrator {
    SingleElimination(SingleElimination),
    FeedIn(FeedIn),
    DoubleElimination(DoubleElimination),
    FeedInChampionship(FeedInChampionship),
    FirstRoundLoserConsolation(FirstRoundLoserConsolation),
    FirstMatchLoserConsolation(FirstMatchLoserConsolation),
    CurtisConsolation(CurtisConsolation),
    RoundRobin(RoundRobin),
    RecursivePlayoff(RecursivePlayoff),
}

impl Orchestrator {
    /// Orchestrator configured from generation parameters.
    pub fn from_params(params: &DrawParams) -> Self {
        match params.draw_type {
            DrawType::FeedInChampionship
            | DrawType::FeedInChampionshipToSf
            | DrawType::FeedInChampionshipToQf
            | DrawType::FeedInChampionshipToR16
            | DrawType::ModifiedFeedInChampionship => Orchestrator::FeedInChampionship(
                FeedInChampionship::new(FeedRounds::from(params.draw_type))
                    .feeds_from_final(params.feeds_from_final),
            ),
            DrawType::RoundRobin | DrawType::RoundRobinWithPlayoff => {
                Orchestrator::RoundRobin(RoundRobin {
                    group_size: params.group_size_or_default(),
                    playoff_groups: params.effective_playoff_groups(),
                })
            }
            other => Orchestrator::from(other),
        }
    }
}

impl From<DrawType> for Orchestrator {
    fn from(draw_type: DrawType) -> Self {
        match draw_type {
            DrawType::SingleElimination => Orchestrator::SingleElimination(SingleElimination),
            DrawType::FeedIn => Orchestrator::FeedIn(FeedIn),
            DrawType::DoubleElimination => Orchestrator::DoubleElimination(DoubleElimination),
            DrawType::FeedInChampionship
            | DrawType::FeedInChampionshipToSf
            | DrawType::FeedInChampionshipToQf
            | DrawType::FeedInChampionshipToR16
            | DrawType::ModifiedFeedInChampionship => Orchestrator::FeedInChampionship(
                FeedInChampionship::new(FeedRounds::from(draw_type)),
            ),
            DrawType::FirstRoundLoserConsolation => {
                Orchestrator::FirstRoundLoserConsolation(FirstRoundLoserConsolation)
            }
            DrawType::FirstMatchLoserConsolation => {
                Orchestrator::FirstMatchLoserConsolation(FirstMatchLoserConsolation)
            }
            DrawType::CurtisConsolation => Orchestrator::CurtisConsolation(CurtisConsolation),
            DrawType::RoundRobin => Orchestrator::RoundRobin(RoundRobin::default()),
            DrawType::RoundRobinWithPlayoff => Orchestrator::RoundRobin(RoundRobin {
                playoff_groups: vec![PlayoffGroup::finishing_positions(vec![1])],
                ..RoundRobin::default()
            }),
            DrawType::Compass => Orchestrator::RecursivePlayoff(RecursivePlayoff {
                naming: PlayoffNaming::Compass,
            }),
            DrawType::Olympic => Orchestrator::RecursivePlayoff(RecursivePlayoff {
                naming: PlayoffNaming::Olympic,
            }),
            DrawType::PlayOff => Orchestrator::RecursivePlayoff(RecursivePlayoff {
                naming: PlayoffNaming::PlayOff,
            }),
        }
    }
}
