//! Round robin group builder.

use crate::constants::{GROUP, MAX_DRAW_SIZE, MIN_ROUND_ROBIN_SIZE};
use crate::error::{DrawError, DrawResult};
use crate::ids::IdSource;
use crate::model::{DrawPosition, FinishingPosition, MatchUp, Stage, Structure};

use super::unfilled_positions;

/// Number of groups for `draw_size` entrants in groups of `group_size`.
///
/// Every group holds at most one bye, so a grouping that would need more
/// byes than groups is rejected.
pub fn group_count(draw_size: u32, group_size: u32) -> DrawResult<u32> {
    if draw_size < MIN_ROUND_ROBIN_SIZE || draw_size > MAX_DRAW_SIZE {
        return Err(DrawError::InvalidDrawSize {
            draw_size,
            reason: format!(
                "a round robin needs {MIN_ROUND_ROBIN_SIZE}..={MAX_DRAW_SIZE} entrants"
            ),
        });
    }
    if group_size < MIN_ROUND_ROBIN_SIZE {
        return Err(DrawError::InvalidGroupSize {
            draw_size,
            group_size,
        });
    }

    let groups = draw_size.div_ceil(group_size);
    let byes = groups * group_size - draw_size;
    if byes > groups {
        return Err(DrawError::InvalidGroupSize {
            draw_size,
            group_size,
        });
    }
    Ok(groups)
}

/// Build the groups of a round robin; group `g` holds positions
/// `(g-1)*group_size+1 ..= g*group_size`.
pub fn build_round_robin(
    ids: &mut IdSource,
    draw_size: u32,
    group_size: u32,
    stage: Stage,
) -> DrawResult<Vec<Structure>> {
    let groups = group_count(draw_size, group_size)?;

    let structures = (0..groups)
        .map(|index| {
            let positions: Vec<DrawPosition> =
                (index * group_size + 1..=(index + 1) * group_size).collect();
            let mut group = Structure::new(ids.next_id(), format!("{GROUP} {}", index + 1), stage);
            group.finishing_position = FinishingPosition::WinRatio;
            group.match_ups = round_robin_match_ups(ids, &positions);
            group.position_assignments = unfilled_positions(positions);
            group
        })
        .collect();

    Ok(structures)
}

/// One match-up per unordered pair, split into rounds with the circle method.
pub fn round_robin_match_ups(ids: &mut IdSource, positions: &[DrawPosition]) -> Vec<MatchUp> {
    let mut slots: Vec<Option<DrawPosition>> = positions.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let slot_count = slots.len();
    let mut match_ups = Vec::with_capacity(positions.len() * positions.len().saturating_sub(1) / 2);

    for round_index in 0..slot_count.saturating_sub(1) {
        let mut round_position = 0;
        for i in 0..slot_count / 2 {
            if let (Some(a), Some(b)) = (slots[i], slots[slot_count - 1 - i]) {
                round_position += 1;
                match_ups.push(
                    MatchUp::new(ids.next_id(), round_index as u32 + 1, round_position)
                        .with_draw_positions([Some(a.min(b)), Some(a.max(b))]),
                );
            }
        }
        // circle method: the first slot stays, the rest rotate
        slots[1..].rotate_right(1);
    }

    match_ups
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_group_count() {
        assert_eq!(group_count(16, 4), Ok(4));
        assert_eq!(group_count(14, 4), Ok(4));
        assert_eq!(group_count(3, 4), Ok(1));
        assert_eq!(group_count(10, 5).map(|g| g * 5 - 10), Ok(0));
    }

    #[test]
    fn test_too_many_byes_rejected() {
        assert_eq!(
            group_count(5, 4),
            Err(DrawError::InvalidGroupSize {
                draw_size: 5,
                group_size: 4
            })
        );
        assert!(matches!(
            group_count(2, 4),
            Err(DrawError::InvalidDrawSize { draw_size: 2, .. })
        ));
        assert!(matches!(
            group_count(8, 2),
            Err(DrawError::InvalidGroupSize { group_size: 2, .. })
        ));
    }

    #[test]
    fn test_every_pair_meets_once() {
        let mut ids = IdSource::sequential("m");
        for size in 3..=7u32 {
            let positions: Vec<u32> = (1..=size).collect();
            let match_ups = round_robin_match_ups(&mut ids, &positions);
            assert_eq!(match_ups.len() as u32, size * (size - 1) / 2);

            let pairs: BTreeSet<_> = match_ups.iter().map(|m| m.draw_positions).collect();
            assert_eq!(pairs.len(), match_ups.len());
        }
    }

    #[test]
    fn test_no_position_plays_twice_in_a_round() {
        let mut ids = IdSource::sequential("m");
        let match_ups = round_robin_match_ups(&mut ids, &[1, 2, 3, 4, 5, 6]);
        for round in 1..=5 {
            let mut seen = BTreeSet::new();
            for match_up in match_ups.iter().filter(|m| m.round_number == round) {
                for dp in match_up.defined_positions() {
                    assert!(seen.insert(dp));
                }
            }
            assert_eq!(seen.len(), 6);
        }
    }

    #[test]
    fn test_groups_hold_contiguous_positions() {
        let mut ids = IdSource::sequential("s");
        let groups = build_round_robin(&mut ids, 12, 4, Stage::Main).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[1].draw_positions(), vec![5, 6, 7, 8]);
        assert_eq!(groups[1].structure_name, "Group 2");
        assert_eq!(groups[1].finishing_position, FinishingPosition::WinRatio);
        assert_eq!(groups[1].match_ups.len(), 6);
    }
}
