//! Draw document model.
//!
//! The document shape (field names and enumeration names) is the contract
//! shared with serialization and export layers, so every type here derives
//! `Serialize`/`Deserialize` with camelCase fields.

pub mod draw;
pub mod enums;
pub mod extensions;
pub mod link;
pub mod match_up;
pub mod structure;

pub use draw::{DrawDefinition, Entry};
pub use enums::{
    DrawType, EntryStatus, FeedProfile, FinishingPosition, LinkCondition, LinkType, MatchUpStatus,
    MatchUpType, Stage, StructureType,
};
pub use extensions::ExtensionTable;
pub use link::{DrawLink, LinkSource, LinkTarget};
pub use match_up::{FinishingPositionRange, MatchUp};
pub use structure::{Occupant, PositionAssignment, SeedAssignment, Structure};

/// Numbered slot a participant, bye, or qualifier occupies (1-indexed)
pub type DrawPosition = u32;
/// Structure id type
pub type StructureId = String;
/// Match-up id type
pub type MatchUpId = String;
/// Participant id type
pub type ParticipantId = String;
