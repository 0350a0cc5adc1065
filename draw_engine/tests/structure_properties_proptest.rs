/// Property-based tests for generated structures using proptest
///
/// These tests check position coverage, finishing position partitions and
/// bye placement across a range of draw sizes and entrant counts.
use draw_engine::validation::terminal_ranges;
use draw_engine::{
    DrawDefinition, DrawError, DrawParams, DrawType, Entry, MatchUpStatus, PolicyDefinitions,
    Stage, assign_bye, automated_positioning, generate_draw_definition, validate_draw,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

// Strategy for a power-of-two draw size between 4 and 64
fn tree_size_strategy() -> impl Strategy<Value = u32> {
    (2u32..=6).prop_map(|exponent| 1 << exponent)
}

// Strategy for a draw size with an entrant count that needs at most one bye per pair
fn sized_field_strategy() -> impl Strategy<Value = (u32, u32)> {
    tree_size_strategy().prop_flat_map(|size| (Just(size), size / 2 + 1..=size))
}

fn elimination_type_strategy() -> impl Strategy<Value = DrawType> {
    prop_oneof![
        Just(DrawType::SingleElimination),
        Just(DrawType::FeedInChampionship),
        Just(DrawType::FirstRoundLoserConsolation),
        Just(DrawType::FirstMatchLoserConsolation),
        Just(DrawType::DoubleElimination),
    ]
}

fn linked_type_strategy() -> impl Strategy<Value = DrawType> {
    prop_oneof![
        Just(DrawType::FirstRoundLoserConsolation),
        Just(DrawType::FeedInChampionship),
        Just(DrawType::DoubleElimination),
        Just(DrawType::Compass),
        Just(DrawType::CurtisConsolation),
    ]
}

fn draw_with_entries(draw_type: DrawType, draw_size: u32, entrants: u32) -> DrawDefinition {
    let mut params = DrawParams::new(draw_type, draw_size);
    params.entries = (1..=entrants)
        .map(|i| Entry::new(format!("p{i}"), Stage::Main))
        .collect();
    generate_draw_definition(&params, &PolicyDefinitions::default()).unwrap()
}

proptest! {
    #[test]
    fn test_first_round_covers_each_position_once(
        exponent in 3u32..=6,
        draw_type in elimination_type_strategy(),
    ) {
        let size = 1 << exponent;
        let draw = draw_with_entries(draw_type, size, 0);
        let main = draw.main_structure().unwrap();

        let mut positions: Vec<u32> = main
            .round_match_ups(1)
            .iter()
            .flat_map(|m| m.defined_positions())
            .collect();
        positions.sort_unstable();
        prop_assert_eq!(positions, (1..=size).collect::<Vec<_>>());
        prop_assert_eq!(validate_draw(&draw), Ok(()));
    }

    #[test]
    fn test_consolation_draws_partition_finishing_positions(
        exponent in 3u32..=6,
        draw_type in prop_oneof![
            Just(DrawType::FeedInChampionship),
            Just(DrawType::FirstRoundLoserConsolation),
        ],
    ) {
        let size = 1 << exponent;
        let draw = draw_with_entries(draw_type, size, 0);

        let mut finishing: Vec<u32> = terminal_ranges(&draw)
            .unwrap()
            .into_iter()
            .flat_map(|(_, [first, last])| first..=last)
            .collect();
        finishing.sort_unstable();
        prop_assert_eq!(finishing, (1..=size).collect::<Vec<_>>());
    }

    #[test]
    fn test_automated_positioning_fills_with_byes(
        (size, entrants) in sized_field_strategy(),
        seed in any::<u64>(),
    ) {
        let mut draw = draw_with_entries(DrawType::SingleElimination, size, entrants);
        let main = draw.structures[0].structure_id.clone();
        let mut rng = StdRng::seed_from_u64(seed);
        automated_positioning(&mut draw, &main, &PolicyDefinitions::default(), &mut rng).unwrap();

        let structure = &draw.structures[0];
        let byes: Vec<u32> = structure
            .assignments()
            .iter()
            .filter(|a| a.is_bye())
            .map(|a| a.draw_position)
            .collect();
        prop_assert_eq!(byes.len() as u32, size - entrants);
        prop_assert!(structure.assignments().iter().all(|a| a.is_filled()));

        // no first round match-up pairs two byes while entrants outnumber half the draw
        for match_up in structure.round_match_ups(1) {
            let bye_sides = match_up.defined_positions().filter(|dp| byes.contains(dp)).count();
            prop_assert!(bye_sides <= 1);
            prop_assert_eq!(match_up.match_up_status == MatchUpStatus::Bye, bye_sides == 1);
        }

        // re-applying a placed bye changes nothing
        if let Some(&first_bye) = byes.first() {
            let before = draw.structures.clone();
            assign_bye(&mut draw, &main, first_bye).unwrap();
            prop_assert_eq!(&draw.structures, &before);
        }
        prop_assert_eq!(validate_draw(&draw), Ok(()));
    }

    #[test]
    fn test_byes_cascade_through_linked_structures(
        draw_type in linked_type_strategy(),
        (size, entrants) in (3u32..=5)
            .prop_map(|exponent| 1u32 << exponent)
            .prop_flat_map(|size| (Just(size), size / 2 + 1..=size)),
        seed in any::<u64>(),
    ) {
        let mut draw = draw_with_entries(draw_type, size, entrants);
        let main = draw.structures[0].structure_id.clone();
        let mut rng = StdRng::seed_from_u64(seed);
        let policy = PolicyDefinitions::default();
        prop_assert_eq!(automated_positioning(&mut draw, &main, &policy, &mut rng), Ok(()));

        let byes = draw.structures[0].assignments().iter().filter(|a| a.is_bye()).count();
        prop_assert_eq!(byes as u32, size - entrants);
        prop_assert_eq!(validate_draw(&draw), Ok(()));
    }

    #[test]
    fn test_round_robin_groups_hold_every_entrant(size in 3u32..=64) {
        let params = DrawParams::new(DrawType::RoundRobin, size);
        match generate_draw_definition(&params, &PolicyDefinitions::default()) {
            Ok(draw) => {
                let container = &draw.structures[0];
                let groups = container.structures.len() as u32;
                let positions = container.position_count() as u32;
                prop_assert_eq!(positions, groups * 4);
                prop_assert!(positions >= size);
                prop_assert!(positions - size <= groups);
                prop_assert_eq!(validate_draw(&draw), Ok(()));
            }
            Err(err) => {
                let is_group_size = matches!(err, DrawError::InvalidGroupSize { .. });
                prop_assert!(is_group_size);
            }
        }
    }
}
