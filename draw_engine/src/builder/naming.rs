//! Round naming.

use crate::model::{MatchUp, Structure};
use crate::policy::RoundNamingPolicy;

/// Write `round_name` on every match-up of the structure (and its groups).
pub fn name_rounds(structure: &mut Structure, policy: &RoundNamingPolicy) {
    let prefix = policy.prefix_for(structure.stage).unwrap_or_default().to_string();

    if structure.is_container() {
        for group in &mut structure.structures {
            for match_up in &mut group.match_ups {
                let name = numbered_round(match_up.round_number, policy.abbreviated);
                match_up.round_name = Some(format!("{prefix}{name}"));
            }
        }
        return;
    }

    let round_count = structure.round_count();
    let is_ladder = structure.match_ups.iter().any(|m| m.feed_round);
    let truncated = structure.round_limit.is_some();

    for round_number in 1..=round_count {
        let match_up_count = structure.round_match_up_count(round_number);
        let name = if is_ladder {
            if round_number == round_count {
                final_round(policy.abbreviated)
            } else {
                numbered_round(round_number, policy.abbreviated)
            }
        } else if truncated {
            round_of(match_up_count * 2, policy.abbreviated)
        } else {
            tree_round(match_up_count, policy.abbreviated)
        };

        let round_name = format!("{prefix}{name}");
        for match_up in round_match_ups_mut(&mut structure.match_ups, round_number) {
            match_up.round_name = Some(round_name.clone());
        }
    }
}

fn round_match_ups_mut(
    match_ups: &mut [MatchUp],
    round_number: u32,
) -> impl Iterator<Item = &mut MatchUp> {
    match_ups
        .iter_mut()
        .filter(move |m| m.round_number == round_number)
}

fn tree_round(match_up_count: u32, abbreviated: bool) -> String {
    match (match_up_count, abbreviated) {
        (1, _) => final_round(abbreviated),
        (2, false) => "Semifinals".to_string(),
        (2, true) => "SF".to_string(),
        (4, false) => "Quarterfinals".to_string(),
        (4, true) => "QF".to_string(),
        (count, _) => round_of(count * 2, abbreviated),
    }
}

fn final_round(abbreviated: bool) -> String {
    if abbreviated { "F" } else { "Final" }.to_string()
}

fn round_of(participants: u32, abbreviated: bool) -> String {
    if abbreviated {
        format!("R{participants}")
    } else {
        format!("Round of {participants}")
    }
}

fn numbered_round(round_number: u32, abbreviated: bool) -> String {
    if abbreviated {
        format!("Rd {round_number}")
    } else {
        format!("Round {round_number}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{LadderOptions, TreeOptions, build_ladder, build_tree, item_structure};
    use crate::ids::IdSource;
    use crate::model::Stage;

    fn names(structure: &Structure) -> Vec<String> {
        (1..=structure.round_count())
            .map(|round| {
                structure.round_match_ups(round)[0]
                    .round_name
                    .clone()
                    .unwrap_or_default()
            })
            .collect()
    }

    #[test]
    fn test_tree_round_names() {
        let mut ids = IdSource::sequential("m");
        let match_ups = build_tree(&mut ids, &TreeOptions::new(32)).unwrap();
        let mut structure = item_structure("s".to_string(), "Main", Stage::Main, 1, match_ups, 32);

        name_rounds(&mut structure, &RoundNamingPolicy::default());
        assert_eq!(
            names(&structure),
            vec!["Round of 32", "Round of 16", "Quarterfinals", "Semifinals", "Final"]
        );

        let abbreviated = RoundNamingPolicy {
            abbreviated: true,
            ..RoundNamingPolicy::default()
        };
        name_rounds(&mut structure, &abbreviated);
        assert_eq!(names(&structure), vec!["R32", "R16", "QF", "SF", "F"]);
    }

    #[test]
    fn test_consolation_prefix() {
        let mut ids = IdSource::sequential("m");
        let ladder = build_ladder(&mut ids, &LadderOptions::new(4, vec![2])).unwrap();
        let mut structure = item_structure(
            "c".to_string(),
            "Consolation",
            Stage::Consolation,
            1,
            ladder.match_ups,
            ladder.position_count,
        );

        name_rounds(&mut structure, &RoundNamingPolicy::default());
        assert_eq!(
            names(&structure),
            vec!["C-Round 1", "C-Round 2", "C-Final"]
        );

        let plain = RoundNamingPolicy {
            stage_prefixes: false,
            ..RoundNamingPolicy::default()
        };
        name_rounds(&mut structure, &plain);
        assert_eq!(names(&structure)[2], "Final");
    }
}
