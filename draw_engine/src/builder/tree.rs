//! Elimination tree builder.
//!
//! ## Example
//!
//! ```
//! use draw_engine::builder::{TreeOptions, build_tree};
//! use draw_engine::ids::IdSource;
//!
//! let mut ids = IdSource::sequential("m");
//! let match_ups = build_tree(&mut ids, &TreeOptions::new(8)).unwrap();
//! assert_eq!(match_ups.len(), 7);
//! assert_eq!(match_ups[0].draw_positions, [Some(1), Some(2)]);
//! ```

use super::assign_finishing_ranges;
use crate::constants::{MAX_DRAW_SIZE, MIN_ELIMINATION_DRAW_SIZE};
use crate::error::{DrawError, DrawResult};
use crate::ids::IdSource;
use crate::model::MatchUp;

/// Shape of an elimination tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    pub draw_size: u32,
    pub finishing_position_offset: u32,
    /// Stop building after this many rounds
    pub round_limit: Option<u32>,
}

impl TreeOptions {
    pub fn new(draw_size: u32) -> Self {
        Self {
            draw_size,
            finishing_position_offset: 0,
            round_limit: None,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.finishing_position_offset = offset;
        self
    }

    pub fn with_round_limit(mut self, round_limit: u32) -> Self {
        self.round_limit = Some(round_limit);
        self
    }
}

/// Rounds in a full tree of `draw_size` positions.
pub fn tree_round_count(draw_size: u32) -> u32 {
    draw_size.max(1).ilog2()
}

pub(crate) fn check_tree_size(draw_size: u32) -> DrawResult<()> {
    if draw_size < MIN_ELIMINATION_DRAW_SIZE {
        return Err(DrawError::InvalidDrawSize {
            draw_size,
            reason: format!(
                "an elimination tree needs at least {MIN_ELIMINATION_DRAW_SIZE} positions"
            ),
        });
    }
    if draw_size > MAX_DRAW_SIZE {
        return Err(DrawError::InvalidDrawSize {
            draw_size,
            reason: format!("draws are limited to {MAX_DRAW_SIZE} positions"),
        });
    }
    if !draw_size.is_power_of_two() {
        return Err(DrawError::InvalidDrawSize {
            draw_size,
            reason: "an elimination tree needs a power of two".to_string(),
        });
    }
    Ok(())
}

/// Build every match-up of an elimination tree.
///
/// Round one pairs `2i-1` with `2i`; later rounds start with both sides
/// undefined and are filled as positions advance.
pub fn build_tree(ids: &mut IdSource, options: &TreeOptions) -> DrawResult<Vec<MatchUp>> {
    check_tree_size(options.draw_size)?;

    let full_rounds = tree_round_count(options.draw_size);
    let round_count = match options.round_limit {
        Some(limit) if limit == 0 || limit > full_rounds => {
            return Err(DrawError::InvalidDrawSize {
                draw_size: options.draw_size,
                reason: format!("round limit {limit} outside 1..={full_rounds}"),
            });
        }
        Some(limit) => limit,
        None => full_rounds,
    };

    let mut match_ups = Vec::with_capacity(options.draw_size as usize);
    let mut match_up_count = options.draw_size / 2;

    for round_number in 1..=round_count {
        for round_position in 1..=match_up_count {
            let match_up = MatchUp::new(ids.next_id(), round_number, round_position);
            let match_up = if round_number == 1 {
                let first = round_position * 2 - 1;
                match_up.with_draw_positions([Some(first), Some(first + 1)])
            } else {
                match_up
            };
            match_ups.push(match_up);
        }
        match_up_count /= 2;
    }

    assign_finishing_ranges(
        &mut match_ups,
        options.draw_size,
        options.finishing_position_offset,
    );

    Ok(match_ups)
}
