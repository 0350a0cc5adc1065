//! Draw engine constants.

/// Smallest elimination structure.
pub const MIN_ELIMINATION_DRAW_SIZE: u32 = 2;

/// Largest structure the engine will build.
pub const MAX_DRAW_SIZE: u32 = 1024;

/// Smallest draw (and group) a round robin can hold.
pub const MIN_ROUND_ROBIN_SIZE: u32 = 3;

pub const DEFAULT_GROUP_SIZE: u32 = 4;

/// Positions in the double elimination decider.
pub const DECIDER_DRAW_SIZE: u32 = 2;

/// Smallest main draw that can carry a consolation structure.
pub const MIN_CONSOLATION_DRAW_SIZE: u32 = 4;

// Structure names
pub const MAIN: &str = "Main";
pub const CONSOLATION: &str = "Consolation";
pub const BACKDRAW: &str = "Backdraw";
pub const DECIDER: &str = "Decider";
pub const QUALIFYING: &str = "Qualifying";
pub const PLAY_OFF: &str = "Play-off";
pub const GROUP: &str = "Group";
