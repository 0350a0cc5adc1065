//! Draw Generation Example
//!
//! Generates a feed-in championship, positions a short field, plays the
//! first round and prints where every participant ended up.

use draw_engine::{
    DrawParams, DrawType, Entry, MatchUpStatus, PolicyDefinitions, Stage, automated_positioning,
    generate_draw_definition, set_match_up_outcome, validate_draw,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Feed-in Championship Example ===\n");

    let mut params = DrawParams::new(DrawType::FeedInChampionship, 16);
    params.entries = (1..=13)
        .map(|i| Entry::new(format!("player{i}"), Stage::Main))
        .collect();

    let policy = PolicyDefinitions::default();
    let mut draw = generate_draw_definition(&params, &policy)?;
    for structure in &draw.structures {
        println!(
            "{:<12} {:?} with {} positions",
            structure.structure_name,
            structure.stage,
            structure.position_count()
        );
    }

    // Example 1: automated positioning with byes
    println!("\nExample 1: positioning 13 entrants in 16 positions");
    let main = draw.structures[0].structure_id.clone();
    automated_positioning(&mut draw, &main, &policy, &mut StdRng::seed_from_u64(2024))?;
    for assignment in draw.structures[0].assignments() {
        let occupant = match assignment.participant_id() {
            Some(id) => id.to_string(),
            None if assignment.is_bye() => "BYE".to_string(),
            None => "-".to_string(),
        };
        println!("  {:>2}: {}", assignment.draw_position, occupant);
    }

    // Example 2: first round results feed the consolation structure
    println!("\nExample 2: playing round 1");
    let playable: Vec<String> = draw.structures[0]
        .round_match_ups(1)
        .iter()
        .filter(|m| m.match_up_status == MatchUpStatus::ToBePlayed)
        .map(|m| m.match_up_id.clone())
        .collect();
    for id in &playable {
        set_match_up_outcome(&mut draw, id, MatchUpStatus::Completed, Some(1))?;
    }

    let consolation = &draw.structures[1];
    let fed: Vec<&str> = consolation
        .assignments()
        .iter()
        .filter_map(|a| a.participant_id())
        .collect();
    println!("  {} consolation: {:?}", consolation.structure_name, fed);

    validate_draw(&draw)?;
    println!("\nDocument is valid, {} notices pending", draw.drain_notices().len());

    Ok(())
}
