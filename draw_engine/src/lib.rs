//! # Draw Engine
//!
//! Tournament draw generation, linking and bye placement.
//!
//! A draw is a mutable document ([`DrawDefinition`]) holding structures
//! (elimination trees, feed-in ladders, round robin containers), the links
//! that move winners, losers and finishers between them, and the entries
//! that occupy their draw positions. Every operation takes the document by
//! exclusive reference and either completes or returns a [`DrawError`].
//!
//! ## Architecture
//!
//! Generation flows top-down, mutation flows bottom-up:
//!
//! - **Builders** produce the match-up topology of one structure
//! - **Links** stitch structures together and resolve where a participant lands
//! - **Orchestrators** compose builders and links per [`DrawType`]
//! - **Playoffs** derive structures from finishing positions or round losers
//! - **Placement** assigns seeds, participants, byes and qualifiers, and
//!   propagates byes across the link graph
//! - **Routing** moves recorded outcomes through the topology
//!
//! ## Core Modules
//!
//! - [`generate`]: document-level generation entry points
//! - [`placement`]: seed blocks, bye ordering, manual and automated positioning
//! - [`routing`]: outcome and group finisher routing
//! - [`validation`]: structural checks over a whole document
//!
//! ## Example
//!
//! ```
//! use draw_engine::{DrawParams, DrawType, Entry, PolicyDefinitions, Stage};
//! use draw_engine::{automated_positioning, generate_draw_definition};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut params = DrawParams::new(DrawType::SingleElimination, 4);
//! params.entries = ["ann", "bob", "cid"]
//!     .into_iter()
//!     .map(|id| Entry::new(id, Stage::Main))
//!     .collect();
//!
//! let policy = PolicyDefinitions::default();
//! let mut draw = generate_draw_definition(&params, &policy).unwrap();
//! let main = draw.structures[0].structure_id.clone();
//! automated_positioning(&mut draw, &main, &policy, &mut StdRng::seed_from_u64(7)).unwrap();
//!
//! let structure = draw.main_structure().unwrap();
//! assert_eq!(structure.assignments().iter().filter(|a| a.is_bye()).count(), 1);
//! ```

/// Structure builders: trees, ladders, round robin groups.
pub mod builder;
pub mod constants;
/// Draw-type orchestrators and generation parameters.
pub mod draws;
pub mod error;
pub mod generate;
pub mod ids;
/// Link construction and target resolution.
pub mod links;
/// The draw document model.
pub mod model;
pub mod notice;
pub mod placement;
pub mod playoff;
pub mod policy;
pub mod routing;
pub mod validation;

pub use draws::{DrawParams, PlayoffGroup, QualifyingProfile};
pub use error::{DrawError, DrawResult, ErrorKind};
pub use generate::{add_playoff_structures, generate_draw_definition, generate_structures};
pub use model::{
    DrawDefinition, DrawLink, DrawPosition, DrawType, Entry, EntryStatus, FeedProfile, LinkType,
    MatchUp, MatchUpStatus, Stage, Structure,
};
pub use notice::DrawNotice;
pub use placement::{
    assign_bye, assign_draw_position, assign_qualifier, assign_seed, automated_positioning,
    unplaced_entries,
};
pub use policy::{PolicyDefinitions, PolicyError, SeedBlockShape};
pub use routing::{place_group_finishers, set_match_up_outcome};
pub use validation::validate_draw;
