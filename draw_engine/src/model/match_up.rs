//! Match-up model.

use serde::{Deserialize, Serialize};

use super::{DrawPosition, MatchUpId, MatchUpStatus};

/// Finishing positions for the winner and the loser of a match-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishingPositionRange {
    /// Best and worst position the winner can still finish in
    pub winner: [u32; 2],
    /// Best and worst position the loser finishes in
    pub loser: [u32; 2],
}

impl FinishingPositionRange {
    /// Range for a round where `alive` participants remain and `match_ups`
    /// of them are eliminated.
    pub fn for_round(offset: u32, alive: u32, match_ups: u32) -> Self {
        Self {
            winner: [offset + 1, offset + alive - match_ups],
            loser: [offset + alive - match_ups + 1, offset + alive],
        }
    }
}

/// A contest between two draw positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUp {
    pub match_up_id: MatchUpId,
    pub round_number: u32,
    pub round_position: u32,
    /// Side one and side two. Feed round match-ups keep the fed position on
    /// side one.
    pub draw_positions: [Option<DrawPosition>; 2],
    pub match_up_status: MatchUpStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishing_position_range: Option<FinishingPositionRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishing_round: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_name: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub feed_round: bool,
    /// 1 or 2, written by the scoring layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_side: Option<u8>,
}

impl MatchUp {
    pub fn new(match_up_id: MatchUpId, round_number: u32, round_position: u32) -> Self {
        Self {
            match_up_id,
            round_number,
            round_position,
            draw_positions: [None, None],
            match_up_status: MatchUpStatus::ToBePlayed,
            finishing_position_range: None,
            finishing_round: None,
            round_name: None,
            feed_round: false,
            winning_side: None,
        }
    }

    pub fn with_draw_positions(mut self, draw_positions: [Option<DrawPosition>; 2]) -> Self {
        self.draw_positions = draw_positions;
        self
    }

    pub fn contains(&self, draw_position: DrawPosition) -> bool {
        self.draw_positions.contains(&Some(draw_position))
    }

    /// Index (0 or 1) of the side holding `draw_position`.
    pub fn side_of(&self, draw_position: DrawPosition) -> Option<usize> {
        self.draw_positions
            .iter()
            .position(|dp| *dp == Some(draw_position))
    }

    /// Position on the opposite side of `draw_position`; `Some(None)` when
    /// that side is still empty.
    pub fn opponent_of(&self, draw_position: DrawPosition) -> Option<Option<DrawPosition>> {
        self.side_of(draw_position)
            .map(|side| self.draw_positions[1 - side])
    }

    pub fn defined_positions(&self) -> impl Iterator<Item = DrawPosition> + '_ {
        self.draw_positions.iter().flatten().copied()
    }

    pub fn is_complete_pairing(&self) -> bool {
        self.draw_positions.iter().all(Option::is_some)
    }

    /// Position on the winning side, when the scoring layer has written one.
    pub fn winner_position(&self) -> Option<DrawPosition> {
        match self.winning_side {
            Some(side @ 1..=2) => self.draw_positions[usize::from(side) - 1],
            _ => None,
        }
    }

    pub fn loser_position(&self) -> Option<DrawPosition> {
        match self.winning_side {
            Some(side @ 1..=2) => self.draw_positions[2 - usize::from(side)],
            _ => None,
        }
    }
}
