//! Draw engine error types.

use thiserror::Error;

use crate::model::{DrawPosition, DrawType, MatchUpStatus, Stage};

/// Broad classification of a [`DrawError`].
///
/// Callers that only need to decide how to react (ask for input, reject the
/// request, or reload the document) can match on the kind instead of every
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required document, identifier or value was absent.
    MissingInput,
    /// A size or type does not fit the requested shape.
    InvalidShape,
    /// The operation would break a document invariant.
    InvariantViolation,
    /// The document (or the requested composition) contradicts itself.
    ConsistencyConflict,
}

/// Draw engine errors
#[derive(Debug, Error, PartialEq)]
pub enum DrawError {
    /// A required value was not supplied
    #[error("Missing required value: {0}")]
    MissingValue(&'static str),

    /// Draw size is not valid for the requested structure
    #[error("Invalid draw size {draw_size}: {reason}")]
    InvalidDrawSize { draw_size: u32, reason: String },

    /// Round robin grouping cannot be satisfied
    #[error("Invalid group size {group_size} for draw size {draw_size}")]
    InvalidGroupSize { draw_size: u32, group_size: u32 },

    /// Draw type name could not be recognized
    #[error("Unrecognized draw type: {0}")]
    UnrecognizedDrawType(String),

    /// Draw type cannot be used where it was requested
    #[error("Draw type {draw_type:?} is not supported here: {reason}")]
    UnsupportedDrawType { draw_type: DrawType, reason: String },

    /// Structure does not exist in the document
    #[error("Structure not found: {0}")]
    StructureNotFound(String),

    /// Match-up does not exist in the document
    #[error("Match-up not found: {0}")]
    MatchUpNotFound(String),

    /// Draw position is not part of the structure
    #[error("Draw position {draw_position} not found in structure {structure_id}")]
    DrawPositionNotFound {
        structure_id: String,
        draw_position: DrawPosition,
    },

    /// Requested round does not exist in the structure
    #[error("Round {round_number} not found in structure {structure_id}")]
    RoundNotFound {
        structure_id: String,
        round_number: u32,
    },

    /// Participant has no placeable entry for the stage
    #[error("Participant {participant_id} has no placeable entry for stage {stage:?}")]
    MissingEntry {
        participant_id: String,
        stage: Stage,
    },

    /// Position already holds a different participant
    #[error("Draw position {draw_position} already occupied by {participant_id}")]
    PositionOccupied {
        draw_position: DrawPosition,
        participant_id: String,
    },

    /// Position holds a bye or qualifier and cannot take a participant
    #[error("Draw position {0} is not available")]
    PositionUnavailable(DrawPosition),

    /// Participant already placed elsewhere in the structure
    #[error("Participant {participant_id} already placed at draw position {draw_position}")]
    ParticipantAlreadyPlaced {
        participant_id: String,
        draw_position: DrawPosition,
    },

    /// Position is fed by a link and cannot take a direct entrant
    #[error("Draw position {0} is fed by a link and cannot hold a direct entrant")]
    LinkedEntryPosition(DrawPosition),

    /// Position belongs to a match-up that is already being contested
    #[error("Draw position {draw_position} is active in a {status:?} match-up")]
    ActivePosition {
        draw_position: DrawPosition,
        status: MatchUpStatus,
    },

    /// Seed number outside the structure's seed limit
    #[error("Seed number {seed_number} exceeds seed limit {seed_limit}")]
    SeedLimitExceeded { seed_number: u32, seed_limit: u32 },

    /// Seeded participant placed outside its seed block
    #[error("Seed {seed_number} cannot be placed at draw position {draw_position}")]
    InvalidSeedPosition {
        seed_number: u32,
        draw_position: DrawPosition,
    },

    /// More placeable entries than draw positions
    #[error("Too many entries: {entries} entries for {positions} positions")]
    TooManyEntries { entries: usize, positions: usize },

    /// Match-up status is not one the caller may write
    #[error("Invalid match-up status {status:?}: {reason}")]
    InvalidMatchUpStatus {
        status: MatchUpStatus,
        reason: String,
    },

    /// Finishing positions of composed structures overlap
    #[error("Finishing positions overlap: {0}")]
    OverlappingFinishingPositions(String),

    /// Finishing positions outside what the source structure produces
    #[error("Invalid finishing positions {positions:?}: {reason}")]
    InvalidFinishingPositions { positions: Vec<u32>, reason: String },

    /// Link references a structure that does not exist
    #[error("Link references unknown structure {0}")]
    DanglingLink(String),

    /// Link graph loops back to an ancestor structure
    #[error("Cyclic link graph through structure {0}")]
    CyclicLinks(String),

    /// Target slot cannot be resolved for a link
    #[error("Link target unresolvable: {0}")]
    UnresolvableLinkTarget(String),

    /// A non-empty structure already occupies the stage slot
    #[error("Stage slot {stage:?}/{stage_sequence} already holds structure {structure_id}")]
    StageSlotOccupied {
        stage: Stage,
        stage_sequence: u32,
        structure_id: String,
    },

    /// Document invariant found broken while traversing
    #[error("Corrupt draw document: {0}")]
    CorruptDocument(String),

    /// Policy configuration rejected
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),
}

impl DrawError {
    /// Classify the error into one of the four kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DrawError::MissingValue(_) | DrawError::MissingEntry { .. } => ErrorKind::MissingInput,

            DrawError::InvalidDrawSize { .. }
            | DrawError::InvalidGroupSize { .. }
            | DrawError::UnrecognizedDrawType(_)
            | DrawError::UnsupportedDrawType { .. }
            | DrawError::StructureNotFound(_)
            | DrawError::MatchUpNotFound(_)
            | DrawError::DrawPositionNotFound { .. }
            | DrawError::RoundNotFound { .. }
            | DrawError::InvalidPolicy(_) => ErrorKind::InvalidShape,

            DrawError::PositionOccupied { .. }
            | DrawError::PositionUnavailable(_)
            | DrawError::ParticipantAlreadyPlaced { .. }
            | DrawError::LinkedEntryPosition(_)
            | DrawError::ActivePosition { .. }
            | DrawError::SeedLimitExceeded { .. }
            | DrawError::InvalidSeedPosition { .. }
            | DrawError::TooManyEntries { .. }
            | DrawError::InvalidMatchUpStatus { .. } => ErrorKind::InvariantViolation,

            DrawError::OverlappingFinishingPositions(_)
            | DrawError::InvalidFinishingPositions { .. }
            | DrawError::DanglingLink(_)
            | DrawError::CyclicLinks(_)
            | DrawError::UnresolvableLinkTarget(_)
            | DrawError::StageSlotOccupied { .. }
            | DrawError::CorruptDocument(_) => ErrorKind::ConsistencyConflict,
        }
    }
}

/// Result type for draw operations
pub type DrawResult<T> = Result<T, DrawError>;
