//! Command line front end for the draw engine.
//!
//! Generates a draw, seeds and positions a synthetic field and prints the
//! resulting document as JSON.

mod config;

use anyhow::{Context, Error};
use draw_engine::{
    DrawDefinition, assign_seed, automated_positioning, generate_draw_definition, validate_draw,
};
use log::{info, warn};
use pico_args::Arguments;
use rand::SeedableRng;
use rand::rngs::StdRng;

use config::{CliConfig, CliOverrides};

const HELP: &str = "\
Generate and position a tournament draw

USAGE:
  draw_cli [OPTIONS]

OPTIONS:
  --type         TYPE    Draw type, e.g. SINGLE_ELIMINATION  [default: env DRAW_TYPE or SINGLE_ELIMINATION]
  --size         N       Main structure size                 [default: env DRAW_SIZE]
  --entries      N       Participants to position            [default: env DRAW_ENTRIES or size]
  --seeds        N       Participants seeded in order        [default: env DRAW_SEEDS or 0]
  --group-size   N       Round robin group size              [default: env DRAW_GROUP_SIZE or 4]
  --seed-blocks  SHAPE   cluster or separate                 [default: env DRAW_SEED_BLOCKS or cluster]
  --round-names  STYLE   full or abbreviated                 [default: env DRAW_ROUND_NAMES or full]
  --random-seed  N       Fixed RNG seed                      [default: env DRAW_RANDOM_SEED]

FLAGS:
  --compact              Print JSON on a single line
  -h, --help             Print help information

ENVIRONMENT:
  RUST_LOG               Log filter, e.g. draw_engine=debug
  (A .env file in the working directory is loaded first)
";

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let compact = pargs.contains("--compact");
    let overrides = CliOverrides {
        draw_type: pargs.opt_value_from_str("--type")?,
        draw_size: pargs.opt_value_from_str("--size")?,
        entries: pargs.opt_value_from_str("--entries")?,
        seeds: pargs.opt_value_from_str("--seeds")?,
        group_size: pargs.opt_value_from_str("--group-size")?,
        seed_blocks: pargs.opt_value_from_str("--seed-blocks")?,
        round_names: pargs.opt_value_from_str("--round-names")?,
        random_seed: pargs.opt_value_from_str("--random-seed")?,
    };

    env_logger::builder().format_target(false).init();

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        warn!("Ignoring unknown arguments: {remaining:?}");
    }

    let config = CliConfig::from_env(overrides)?;
    config.validate()?;

    let draw = run(&config)?;
    let output = if compact {
        serde_json::to_string(&draw)?
    } else {
        serde_json::to_string_pretty(&draw)?
    };
    println!("{output}");

    Ok(())
}

fn run(config: &CliConfig) -> Result<DrawDefinition, Error> {
    let policy = config.policy();
    let mut draw = generate_draw_definition(&config.params(), &policy).with_context(|| {
        format!("Failed to generate {} of {}", config.draw_type, config.draw_size)
    })?;

    let main = draw
        .main_structure()
        .map(|s| s.structure_id.clone())
        .context("Generated draw has no main structure")?;

    for seed in 1..=config.seeds {
        let participant_id = CliConfig::participant_id(seed);
        assign_seed(&mut draw, &main, seed, &participant_id, None, &policy)
            .with_context(|| format!("Failed to seed {participant_id}"))?;
    }

    let mut rng = match config.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    automated_positioning(&mut draw, &main, &policy, &mut rng)
        .context("Failed to position entries")?;
    validate_draw(&draw).context("Positioned draw failed validation")?;

    info!(
        "Generated {} with {} structures and {} links",
        draw.draw_name,
        draw.structures.len(),
        draw.links.len()
    );
    Ok(draw)
}
