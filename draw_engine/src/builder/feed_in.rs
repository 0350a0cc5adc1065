//! Feed-in ladder builder.
//!
//! A ladder is a spine of running match-ups. Contraction rounds halve the
//! spine; feed rounds pair every spine survivor with a freshly fed position
//! and keep the spine width. Fed positions are numbered from the last feed
//! round backwards starting at 1, base positions take the highest numbers.
//!
//! ```text
//!  base 4, fed [2, 1]         positions
//!  R1  [4 v 5] [6 v 7]        4..7 base
//!  R2  [2 v _] [3 v _]        2..3 fed
//!  R3  [_ v _]
//!  R4  [1 v _]                1 fed
//! ```

use super::assign_finishing_ranges;
use crate::constants::MAX_DRAW_SIZE;
use crate::error::{DrawError, DrawResult};
use crate::ids::IdSource;
use crate::model::MatchUp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderOptions {
    /// Positions paired in round one
    pub base_size: u32,
    /// Positions fed by each feed round, in round order
    pub fed_counts: Vec<u32>,
    pub finishing_position_offset: u32,
}

impl LadderOptions {
    pub fn new(base_size: u32, fed_counts: Vec<u32>) -> Self {
        Self {
            base_size,
            fed_counts,
            finishing_position_offset: 0,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.finishing_position_offset = offset;
        self
    }
}

/// A built ladder
#[derive(Debug, Clone, PartialEq)]
pub struct Ladder {
    pub match_ups: Vec<MatchUp>,
    pub position_count: u32,
    /// Round number of each feed round, in the order of `fed_counts`
    pub feed_rounds: Vec<u32>,
}

/// Base size and fed counts of a FEED_IN main structure of `draw_size`.
///
/// The base is the largest power of two not above the draw size; the rest
/// is fed greedily, widest feed first.
pub fn feed_in_counts(draw_size: u32) -> DrawResult<(u32, Vec<u32>)> {
    if draw_size < 2 || draw_size > MAX_DRAW_SIZE {
        return Err(DrawError::InvalidDrawSize {
            draw_size,
            reason: format!("a feed-in draw needs 2..={MAX_DRAW_SIZE} positions"),
        });
    }

    let base = 1 << draw_size.ilog2();
    let mut remaining = draw_size - base;
    let mut fed_counts = Vec::new();
    let mut width = base / 2;
    while remaining > 0 && width > 0 {
        if remaining >= width {
            fed_counts.push(width);
            remaining -= width;
        }
        width /= 2;
    }

    Ok((base, fed_counts))
}

pub fn build_ladder(ids: &mut IdSource, options: &LadderOptions) -> DrawResult<Ladder> {
    let base = options.base_size;
    if base < 2 || !base.is_power_of_two() {
        return Err(DrawError::InvalidDrawSize {
            draw_size: base,
            reason: "a ladder base must be a power of two of at least 2".to_string(),
        });
    }

    let fed_total: u32 = options.fed_counts.iter().sum();
    let position_count = base + fed_total;
    if position_count > MAX_DRAW_SIZE {
        return Err(DrawError::InvalidDrawSize {
            draw_size: position_count,
            reason: format!("draws are limited to {MAX_DRAW_SIZE} positions"),
        });
    }

    let mut match_ups = Vec::new();
    let mut feed_rounds = Vec::with_capacity(options.fed_counts.len());

    // round one pairs the base positions
    let base_first = fed_total + 1;
    let mut spine = base / 2;
    for round_position in 1..=spine {
        let first = base_first + (round_position - 1) * 2;
        match_ups.push(
            MatchUp::new(ids.next_id(), 1, round_position)
                .with_draw_positions([Some(first), Some(first + 1)]),
        );
    }
    let mut round_number = 1;

    // fed positions count down from the top of the fed range
    let mut next_fed_start = fed_total + 1;
    for &fed in &options.fed_counts {
        if fed == 0 || !fed.is_power_of_two() || fed > spine {
            return Err(DrawError::InvalidDrawSize {
                draw_size: fed,
                reason: format!(
                    "fed count must be a power of two no wider than the spine ({spine})"
                ),
            });
        }

        while spine > fed {
            spine /= 2;
            round_number += 1;
            push_round(ids, &mut match_ups, round_number, spine);
        }

        round_number += 1;
        next_fed_start -= fed;
        for round_position in 1..=fed {
            let mut match_up = MatchUp::new(ids.next_id(), round_number, round_position)
                .with_draw_positions([Some(next_fed_start + round_position - 1), None]);
            match_up.feed_round = true;
            match_ups.push(match_up);
        }
        feed_rounds.push(round_number);
    }

    while spine > 1 {
        spine /= 2;
        round_number += 1;
        push_round(ids, &mut match_ups, round_number, spine);
    }

    assign_finishing_ranges(
        &mut match_ups,
        position_count,
        options.finishing_position_offset,
    );

    Ok(Ladder {
        match_ups,
        position_count,
        feed_rounds,
    })
}

fn push_round(ids: &mut IdSource, match_ups: &mut Vec<MatchUp>, round_number: u32, count: u32) {
    for round_position in 1..=count {
        match_ups.push(MatchUp::new(ids.next_id(), round_number, round_position));
    }
}
