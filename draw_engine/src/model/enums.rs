//! Enumerations shared by the draw document.
//!
//! Every enumeration serializes to the exact SCREAMING_SNAKE_CASE names the
//! document contract uses, so consumers can match on the strings directly.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::DrawError;

/// Stage a structure (or an entry) belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Qualifying,
    Main,
    Consolation,
    PlayOff,
    VoluntaryConsolation,
}

impl Stage {
    /// Stage whose entries are eligible to be placed in a structure of this stage.
    ///
    /// Consolation and play-off structures are only ever filled through links,
    /// so their participants come from the main entries.
    pub fn entry_stage(self) -> Stage {
        match self {
            Stage::Qualifying => Stage::Qualifying,
            Stage::VoluntaryConsolation => Stage::VoluntaryConsolation,
            Stage::Main | Stage::Consolation | Stage::PlayOff => Stage::Main,
        }
    }
}

/// Whether a structure is a single bracket or a group of sub-structures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StructureType {
    Item,
    Container,
}

/// How finishing positions are decided within a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishingPosition {
    RoundOutcome,
    WinRatio,
}

/// Kind of contest a draw holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchUpType {
    #[default]
    Singles,
    Doubles,
    Team,
}

/// Status of a match-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchUpStatus {
    #[default]
    ToBePlayed,
    Bye,
    InProgress,
    Suspended,
    Completed,
    Retired,
    Walkover,
    DoubleWalkover,
    Defaulted,
    Abandoned,
    Cancelled,
}

impl MatchUpStatus {
    /// A match-up that is being, or has been, contested.
    pub fn is_active(self) -> bool {
        !matches!(self, MatchUpStatus::ToBePlayed | MatchUpStatus::Bye)
    }

    /// Statuses that carry a winning side.
    pub fn has_winner(self) -> bool {
        matches!(
            self,
            MatchUpStatus::Completed
                | MatchUpStatus::Retired
                | MatchUpStatus::Walkover
                | MatchUpStatus::Defaulted
        )
    }
}

/// What moves across a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkType {
    Winner,
    Loser,
    Position,
}

/// How an arriving participant is slotted into target draw positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedProfile {
    TopDown,
    BottomUp,
    Random,
    Draw,
    LossPosition,
}

impl FeedProfile {
    /// Profile used for the fed round that follows this one.
    pub fn alternate(self) -> FeedProfile {
        match self {
            FeedProfile::TopDown => FeedProfile::BottomUp,
            FeedProfile::BottomUp => FeedProfile::TopDown,
            other => other,
        }
    }
}

/// Restriction on which participants a link carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkCondition {
    /// Only participants losing their first played match cross the link.
    FirstMatchup,
}

/// Acceptance status of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    DirectAcceptance,
    Wildcard,
    Qualifier,
    LuckyLoser,
    Alternate,
    Withdrawn,
}

impl EntryStatus {
    /// Entries that occupy a draw position.
    pub fn is_placeable(self) -> bool {
        matches!(
            self,
            EntryStatus::DirectAcceptance
                | EntryStatus::Wildcard
                | EntryStatus::Qualifier
                | EntryStatus::LuckyLoser
        )
    }
}

/// Closed set of draw types the engine can generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrawType {
    SingleElimination,
    FeedIn,
    DoubleElimination,
    FeedInChampionship,
    FeedInChampionshipToSf,
    FeedInChampionshipToQf,
    FeedInChampionshipToR16,
    ModifiedFeedInChampionship,
    FirstRoundLoserConsolation,
    FirstMatchLoserConsolation,
    CurtisConsolation,
    RoundRobin,
    RoundRobinWithPlayoff,
    Compass,
    Olympic,
    PlayOff,
}

impl DrawType {
    pub const ALL: [DrawType; 16] = [
        DrawType::SingleElimination,
        DrawType::FeedIn,
        DrawType::DoubleElimination,
        DrawType::FeedInChampionship,
        DrawType::FeedInChampionshipToSf,
        DrawType::FeedInChampionshipToQf,
        DrawType::FeedInChampionshipToR16,
        DrawType::ModifiedFeedInChampionship,
        DrawType::FirstRoundLoserConsolation,
        DrawType::FirstMatchLoserConsolation,
        DrawType::CurtisConsolation,
        DrawType::RoundRobin,
        DrawType::RoundRobinWithPlayoff,
        DrawType::Compass,
        DrawType::Olympic,
        DrawType::PlayOff,
    ];

    /// Document name of the draw type.
    pub fn as_str(self) -> &'static str {
        match self {
            DrawType::SingleElimination => "SINGLE_ELIMINATION",
            DrawType::FeedIn => "FEED_IN",
            DrawType::DoubleElimination => "DOUBLE_ELIMINATION",
            DrawType::FeedInChampionship => "FEED_IN_CHAMPIONSHIP",
            DrawType::FeedInChampionshipToSf => "FEED_IN_CHAMPIONSHIP_TO_SF",
            DrawType::FeedInChampionshipToQf => "FEED_IN_CHAMPIONSHIP_TO_QF",
            DrawType::FeedInChampionshipToR16 => "FEED_IN_CHAMPIONSHIP_TO_R16",
            DrawType::ModifiedFeedInChampionship => "MODIFIED_FEED_IN_CHAMPIONSHIP",
            DrawType::FirstRoundLoserConsolation => "FIRST_ROUND_LOSER_CONSOLATION",
            DrawType::FirstMatchLoserConsolation => "FIRST_MATCH_LOSER_CONSOLATION",
            DrawType::CurtisConsolation => "CURTIS_CONSOLATION",
            DrawType::RoundRobin => "ROUND_ROBIN",
            DrawType::RoundRobinWithPlayoff => "ROUND_ROBIN_WITH_PLAYOFF",
            DrawType::Compass => "COMPASS",
            DrawType::Olympic => "OLYMPIC",
            DrawType::PlayOff => "PLAY_OFF",
        }
    }

    /// Draw types whose main structure is an elimination tree of a power-of-two size.
    pub fn requires_power_of_two(self) -> bool {
        !matches!(
            self,
            DrawType::FeedIn | DrawType::RoundRobin | DrawType::RoundRobinWithPlayoff
        )
    }
}

impl fmt::Display for DrawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DrawType {
    type Err = DrawError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        DrawType::ALL
            .into_iter()
            .find(|draw_type| draw_type.as_str() == normalized)
            .ok_or_else(|| DrawError::UnrecognizedDrawType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_type_round_trips_through_name() {
        for draw_type in DrawType::ALL {
            assert_eq!(draw_type.as_str().parse::<DrawType>(), Ok(draw_type));
        }
    }

    #[test]
    fn test_draw_type_parse_is_lenient_on_case_and_separators() {
        assert_eq!(
            "feed-in championship".parse::<DrawType>(),
            Ok(DrawType::FeedInChampionship)
        );
    }

    #[test]
    fn test_unknown_draw_type_is_rejected() {
        let err = "SWISS".parse::<DrawType>().unwrap_err();
        assert_eq!(err, DrawError::UnrecognizedDrawType("SWISS".to_string()));
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&FeedProfile::LossPosition).unwrap(),
            "\"LOSS_POSITION\""
        );
        assert_eq!(
            serde_json::to_string(&MatchUpStatus::ToBePlayed).unwrap(),
            "\"TO_BE_PLAYED\""
        );
        assert_eq!(
            serde_json::to_string(&Stage::PlayOff).unwrap(),
            "\"PLAY_OFF\""
        );
        assert_eq!(
            serde_json::to_string(&DrawType::FeedInChampionshipToR16).unwrap(),
            "\"FEED_IN_CHAMPIONSHIP_TO_R16\""
        );
    }

    #[test]
    fn test_active_statuses() {
        assert!(!MatchUpStatus::ToBePlayed.is_active());
        assert!(!MatchUpStatus::Bye.is_active());
        assert!(MatchUpStatus::InProgress.is_active());
        assert!(MatchUpStatus::Completed.has_winner());
        assert!(!MatchUpStatus::DoubleWalkover.has_winner());
    }
}
