use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use draw_engine::{
    DrawDefinition, DrawParams, DrawType, Entry, MatchUpStatus, PolicyDefinitions, Stage,
    automated_positioning, generate_draw_definition, set_match_up_outcome, validate_draw,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Helper to create a draw with `entrants` main-stage entries
fn draw_with_entries(draw_type: DrawType, draw_size: u32, entrants: u32) -> DrawDefinition {
    let mut params = DrawParams::new(draw_type, draw_size);
    params.entries = (1..=entrants)
        .map(|i| Entry::new(format!("player{i}"), Stage::Main))
        .collect();
    generate_draw_definition(&params, &PolicyDefinitions::default()).unwrap()
}

/// Helper to create a fully positioned draw
fn positioned_draw(draw_type: DrawType, draw_size: u32, entrants: u32) -> DrawDefinition {
    let mut draw = draw_with_entries(draw_type, draw_size, entrants);
    let main = draw.structures[0].structure_id.clone();
    let mut rng = StdRng::seed_from_u64(42);
    automated_positioning(&mut draw, &main, &PolicyDefinitions::default(), &mut rng).unwrap();
    draw
}

/// Benchmark generation of a single elimination tree at different sizes
fn bench_single_elimination(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_elimination");

    for draw_size in [16, 64, 256].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_positions", draw_size)),
            draw_size,
            |b, &size| {
                let params = DrawParams::new(DrawType::SingleElimination, size);
                let policy = PolicyDefinitions::default();
                b.iter(|| generate_draw_definition(&params, &policy));
            },
        );
    }

    group.finish();
}

/// Benchmark generation of the multi-structure draw types
fn bench_linked_draw_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("linked_draw_types");

    for draw_type in [
        DrawType::FeedInChampionship,
        DrawType::CurtisConsolation,
        DrawType::Compass,
        DrawType::DoubleElimination,
    ]
    .iter()
    {
        group.bench_with_input(BenchmarkId::from_parameter(draw_type), draw_type, |b, &draw_type| {
            let params = DrawParams::new(draw_type, 64);
            let policy = PolicyDefinitions::default();
            b.iter(|| generate_draw_definition(&params, &policy));
        });
    }

    group.finish();
}

/// Benchmark automated positioning with byes cascading into consolation
fn bench_automated_positioning(c: &mut Criterion) {
    let mut group = c.benchmark_group("automated_positioning");

    for entrants in [40, 50, 60].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_of_64", entrants)),
            entrants,
            |b, &n| {
                b.iter_batched(
                    || draw_with_entries(DrawType::FeedInChampionship, 64, n),
                    |mut draw| {
                        let main = draw.structures[0].structure_id.clone();
                        let policy = PolicyDefinitions::default();
                        let mut rng = StdRng::seed_from_u64(7);
                        automated_positioning(&mut draw, &main, &policy, &mut rng).unwrap();
                        draw
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark routing a full first round of outcomes
fn bench_first_round_routing(c: &mut Criterion) {
    c.bench_function("first_round_routing_64", |b| {
        b.iter_batched(
            || positioned_draw(DrawType::FeedInChampionship, 64, 64),
            |mut draw| {
                let ids: Vec<String> = draw.structures[0]
                    .round_match_ups(1)
                    .iter()
                    .map(|m| m.match_up_id.clone())
                    .collect();
                for id in ids {
                    set_match_up_outcome(&mut draw, &id, MatchUpStatus::Completed, Some(1))
                        .unwrap();
                }
                draw
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark whole-document validation (common operation)
fn bench_validate(c: &mut Criterion) {
    let draw = positioned_draw(DrawType::CurtisConsolation, 64, 56);
    c.bench_function("validate_curtis_64", |b| {
        b.iter(|| validate_draw(&draw));
    });
}

criterion_group!(
    generation,
    bench_single_elimination,
    bench_linked_draw_types,
);

criterion_group!(
    mutation,
    bench_automated_positioning,
    bench_first_round_routing,
    bench_validate,
);

criterion_main!(generation, mutation);
