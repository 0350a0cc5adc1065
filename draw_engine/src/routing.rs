//! Outcome routing.
//!
//! The scoring layer decides who won; routing moves the result through the
//! topology. Winners advance into the next match-up (or over the WINNER
//! link of a last round), losers cross the round's LOSER links, and group
//! finishers cross POSITION links once their finishing order is known.

use log::{info, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{DrawError, DrawResult};
use crate::links::next_slot;
use crate::model::{
    DrawDefinition, DrawLink, DrawPosition, FeedProfile, LinkType, MatchUpStatus, ParticipantId,
    Structure,
};
use crate::placement::propagation::{Arrival, Propagation, Task};
use crate::placement::{base_positions, seed_blocks};
use crate::policy::SeedBlockShape;

fn invalid(status: MatchUpStatus, reason: impl Into<String>) -> DrawError {
    DrawError::InvalidMatchUpStatus {
        status,
        reason: reason.into(),
    }
}

/// Every match-up before `round_number` holding the position was a bye.
fn first_played_match(
    structure: &Structure,
    draw_position: DrawPosition,
    round_number: u32,
) -> bool {
    structure
        .match_ups
        .iter()
        .filter(|m| m.contains(draw_position) && m.round_number < round_number)
        .all(|m| m.match_up_status == MatchUpStatus::Bye)
}

fn participant_at(structure: &Structure, draw_position: DrawPosition) -> Option<ParticipantId> {
    structure
        .assignment(draw_position)
        .and_then(|a| a.participant_id())
        .map(str::to_string)
}

/// Record an outcome written by the scoring layer and route it.
///
/// `winning_side` is 1 or 2 and is required exactly for statuses that carry
/// a winner. Statuses without a decision (IN_PROGRESS, SUSPENDED, ...) are
/// recorded as they are. Once routed, an outcome can only be re-submitted
/// unchanged.
pub fn set_match_up_outcome(
    draw: &mut DrawDefinition,
    match_up_id: &str,
    status: MatchUpStatus,
    winning_side: Option<u8>,
) -> DrawResult<()> {
    let structure_id = draw.structure_id_of_match_up(match_up_id)?;
    let structure = draw.structure(&structure_id)?;
    let match_up = structure
        .match_up(match_up_id)
        .ok_or_else(|| DrawError::MatchUpNotFound(match_up_id.to_string()))?;

    if status == MatchUpStatus::Bye {
        return Err(invalid(status, "byes are only written by placement"));
    }
    if match_up.match_up_status == MatchUpStatus::Bye {
        return Err(invalid(status, format!("{match_up_id} is a bye")));
    }
    let routed = match_up.winning_side.is_some()
        || match_up.match_up_status == MatchUpStatus::DoubleWalkover;
    if routed {
        if match_up.match_up_status == status && match_up.winning_side == winning_side {
            warn!("Outcome of {match_up_id} re-submitted unchanged");
            return Ok(());
        }
        return Err(invalid(status, format!("{match_up_id} already has a routed outcome")));
    }
    match (status.has_winner(), winning_side) {
        (true, Some(1 | 2)) | (false, None) => {}
        (true, _) => return Err(invalid(status, "a winning side of 1 or 2 is required")),
        (false, Some(_)) => return Err(invalid(status, "status carries no winning side")),
    }

    let decides = status.has_winner() || status == MatchUpStatus::DoubleWalkover;
    let mut sides: Option<[DrawPosition; 2]> = None;
    if decides {
        let [Some(first), Some(second)] = match_up.draw_positions else {
            return Err(invalid(status, format!("{match_up_id} is missing a side")));
        };
        if participant_at(structure, first).is_none()
            || participant_at(structure, second).is_none()
        {
            return Err(invalid(status, format!("{match_up_id} needs a participant on both sides")));
        }
        sides = Some([first, second]);
    }
    let is_container = structure.is_container();
    let (round_number, round_position) = (match_up.round_number, match_up.round_position);

    let mut propagation = Propagation::new(draw);
    if let Some(match_up) = propagation
        .draw_mut()
        .structure_mut(&structure_id)?
        .match_up_mut(match_up_id)
    {
        match_up.match_up_status = status;
        match_up.winning_side = winning_side;
    }
    propagation.mark_modified(match_up_id.to_string());

    // group results are routed through finishing orders
    if let (Some(sides), false) = (sides, is_container) {
        let location = Location {
            structure_id: &structure_id,
            round_number,
            round_position,
        };
        match winning_side {
            Some(side) => {
                let winner = sides[usize::from(side) - 1];
                let loser = sides[2 - usize::from(side)];
                route_decision(&mut propagation, &location, winner, loser)?;
            }
            None => route_double_walkover(&mut propagation, &location, sides)?,
        }
    }
    let modified = propagation.run()?;

    info!("Outcome {status:?} recorded for {match_up_id}");
    draw.touch();
    draw.notify_modified(modified);
    Ok(())
}

struct Location<'a> {
    structure_id: &'a str,
    round_number: u32,
    round_position: u32,
}

fn loser_links(propagation: &Propagation<'_>, location: &Location<'_>) -> Vec<DrawLink> {
    propagation
        .draw()
        .links_from_round(location.structure_id, location.round_number)
        .filter(|l| l.link_type == LinkType::Loser)
        .cloned()
        .collect()
}

fn route_decision(
    propagation: &mut Propagation<'_>,
    location: &Location<'_>,
    winner: DrawPosition,
    loser: DrawPosition,
) -> DrawResult<()> {
    let structure = propagation.draw().structure(location.structure_id)?;
    let loser_id = participant_at(structure, loser).ok_or_else(|| {
        DrawError::CorruptDocument(format!("position {loser} lost its participant"))
    })?;
    let winner_first = first_played_match(structure, winner, location.round_number);
    let loser_first = first_played_match(structure, loser, location.round_number);

    propagation.advance(
        location.structure_id,
        location.round_number,
        location.round_position,
        winner,
    )?;

    for link in loser_links(propagation, location) {
        if !link.is_conditional() {
            propagation.send_across(
                &link,
                location.round_position,
                loser,
                Arrival::Participant(loser_id.clone()),
            )?;
            continue;
        }
        if loser_first {
            propagation.send_across(
                &link,
                location.round_position,
                loser,
                Arrival::Participant(loser_id.clone()),
            )?;
        }
        // the slot kept for the winner's first match is no longer needed
        if winner_first {
            propagation.send_across(&link, location.round_position, winner, Arrival::Bye)?;
        }
    }
    Ok(())
}

/// Neither side advances: the next match-up becomes a bye for whoever
/// arrives on the other side, and every LOSER link receives a bye.
fn route_double_walkover(
    propagation: &mut Propagation<'_>,
    location: &Location<'_>,
    sides: [DrawPosition; 2],
) -> DrawResult<()> {
    let structure_id = location.structure_id;
    let structure = propagation.draw().structure(structure_id)?;

    if let Some((index, _)) = next_slot(structure, location.round_number, location.round_position) {
        let next = &structure.match_ups[index];
        if next.match_up_status == MatchUpStatus::ToBePlayed {
            let next_id = next.match_up_id.clone();
            propagation.draw_mut().structure_mut(structure_id)?.match_ups[index].match_up_status =
                MatchUpStatus::Bye;
            propagation.mark_modified(next_id);
        }
        propagation.push(Task::Evaluate {
            structure_id: structure_id.to_string(),
            index,
        });
    } else if let Some(link) = propagation
        .draw()
        .winner_link(structure_id, location.round_number)
        .cloned()
    {
        propagation.send_across(&link, location.round_position, sides[0], Arrival::Bye)?;
    }

    for link in loser_links(propagation, location) {
        if !link.is_conditional() {
            propagation.send_across(&link, location.round_position, sides[1], Arrival::Bye)?;
        }
    }
    Ok(())
}

/// Place round robin finishers across the container's POSITION links.
///
/// `finishing_orders[g]` lists group `g`'s participants best first. Each
/// link takes the finishers of its finishing positions, group by group, and
/// fills its target by the link's feed profile: TOP_DOWN spreads them over
/// the target's seed positions, BOTTOM_UP reverses that order, RANDOM and
/// DRAW shuffle them (DRAW into qualifier placeholders). Target positions
/// left over become byes.
pub fn place_group_finishers<R: Rng + ?Sized>(
    draw: &mut DrawDefinition,
    container_id: &str,
    finishing_orders: &[Vec<ParticipantId>],
    rng: &mut R,
) -> DrawResult<()> {
    let container = draw.structure(container_id)?;
    if !container.is_container() {
        return Err(DrawError::InvalidFinishingPositions {
            positions: Vec::new(),
            reason: format!("{container_id} has no groups"),
        });
    }
    if finishing_orders.len() != container.structures.len() {
        return Err(DrawError::InvalidFinishingPositions {
            positions: Vec::new(),
            reason: format!(
                "{} finishing orders for {} groups",
                finishing_orders.len(),
                container.structures.len()
            ),
        });
    }
    for (group, order) in container.structures.iter().zip(finishing_orders) {
        if let Some(stranger) = order.iter().find(|p| group.position_of(p).is_none()) {
            return Err(DrawError::InvalidFinishingPositions {
                positions: Vec::new(),
                reason: format!("{stranger} is not in {}", group.structure_name),
            });
        }
    }

    let links: Vec<DrawLink> = draw
        .links
        .iter()
        .filter(|l| l.link_type == LinkType::Position && l.source.structure_id == container_id)
        .cloned()
        .collect();

    let mut propagation = Propagation::new(draw);
    for link in &links {
        let mut finishers: Vec<ParticipantId> = Vec::new();
        for &finishing_position in link.source.finishing_positions.as_deref().unwrap_or_default() {
            let index = finishing_position.saturating_sub(1) as usize;
            finishers.extend(finishing_orders.iter().filter_map(|order| order.get(index).cloned()));
        }

        let target = propagation
            .draw()
            .structure(&link.target.structure_id)
            .map_err(|_| DrawError::DanglingLink(link.target.structure_id.clone()))?;
        finishers.retain(|p| target.position_of(p).is_none());

        let by_placeholder = matches!(link.target.feed_profile, FeedProfile::Draw);
        let positions: Vec<DrawPosition> = if by_placeholder {
            target
                .draw_positions()
                .into_iter()
                .filter(|&dp| target.assignment(dp).is_some_and(|a| a.is_qualifier()))
                .collect()
        } else {
            let base = base_positions(target);
            seed_blocks(&base, base.len() as u32, SeedBlockShape::Cluster)
                .into_iter()
                .flat_map(|block| block.positions)
                .filter(|&dp| target.assignment(dp).is_some_and(|a| !a.is_filled()))
                .collect()
        };
        if finishers.len() > positions.len() {
            return Err(DrawError::TooManyEntries {
                entries: finishers.len(),
                positions: positions.len(),
            });
        }

        match link.target.feed_profile {
            FeedProfile::BottomUp => finishers.reverse(),
            FeedProfile::Random | FeedProfile::Draw => finishers.shuffle(rng),
            FeedProfile::TopDown | FeedProfile::LossPosition => {}
        }

        let target_id = link.target.structure_id.clone();
        let placed = finishers.len();
        let arrivals = finishers.into_iter().zip(positions.iter().copied());
        for (participant_id, draw_position) in arrivals {
            propagation.push(Task::Place {
                structure_id: target_id.clone(),
                draw_position,
                participant_id,
            });
        }
        if !by_placeholder {
            for &draw_position in &positions[placed..] {
                propagation.push(Task::Bye {
                    structure_id: target_id.clone(),
                    draw_position,
                    over_qualifier: false,
                });
            }
        }
        info!("{placed} finishers of {container_id} sent to {target_id}");
    }
    let modified = propagation.run()?;

    draw.touch();
    draw.notify_modified(modified);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DrawType, Stage};
    use crate::placement::tests::{add_entries, draw_of, structure_ids};
    use crate::placement::{assign_bye, assign_draw_position};
    use crate::policy::PolicyDefinitions;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn fill(draw: &mut DrawDefinition, structure_id: &str, positions: &[DrawPosition]) {
        let policy = PolicyDefinitions::default();
        for &dp in positions {
            assign_draw_position(draw, structure_id, dp, &format!("p{dp}"), &policy).unwrap();
        }
    }

    fn match_up_id(draw: &DrawDefinition, structure_id: &str, round: u32, position: u32) -> String {
        draw.structure(structure_id).unwrap().round_match_ups(round)[(position - 1) as usize]
            .match_up_id
            .clone()
    }

    #[test]
    fn test_winner_advances_and_loser_feeds_consolation() {
        let mut draw = draw_of(DrawType::FeedInChampionship, 8);
        add_entries(&mut draw, 8, Stage::Main);
        let ids = structure_ids(&draw);
        fill(&mut draw, &ids[0], &[1, 2, 3, 4, 5, 6, 7, 8]);

        let first = match_up_id(&draw, &ids[0], 1, 1);
        set_match_up_outcome(&mut draw, &first, MatchUpStatus::Completed, Some(2)).unwrap();

        let main = draw.structure(&ids[0]).unwrap();
        assert_eq!(main.round_match_ups(2)[0].draw_positions[0], Some(2));
        let consolation = draw.structure(&ids[1]).unwrap();
        assert!(consolation.position_of("p1").is_some());
    }

    #[test]
    fn test_outcome_validation() {
        let mut draw = draw_of(DrawType::SingleElimination, 4);
        add_entries(&mut draw, 4, Stage::Main);
        let main = structure_ids(&draw)[0].clone();
        fill(&mut draw, &main, &[1, 2, 3]);
        let first = match_up_id(&draw, &main, 1, 1);
        let second = match_up_id(&draw, &main, 1, 2);

        let err =
            set_match_up_outcome(&mut draw, &first, MatchUpStatus::Completed, None).unwrap_err();
        assert!(matches!(err, DrawError::InvalidMatchUpStatus { .. }));
        let err = set_match_up_outcome(&mut draw, &first, MatchUpStatus::Bye, None).unwrap_err();
        assert!(matches!(err, DrawError::InvalidMatchUpStatus { .. }));
        // position 4 is still empty
        let err = set_match_up_outcome(&mut draw, &second, MatchUpStatus::Completed, Some(1))
            .unwrap_err();
        assert!(matches!(err, DrawError::InvalidMatchUpStatus { .. }));

        set_match_up_outcome(&mut draw, &first, MatchUpStatus::Completed, Some(1)).unwrap();
        set_match_up_outcome(&mut draw, &first, MatchUpStatus::Completed, Some(1)).unwrap();
        let err = set_match_up_outcome(&mut draw, &first, MatchUpStatus::Completed, Some(2))
            .unwrap_err();
        assert!(matches!(err, DrawError::InvalidMatchUpStatus { .. }));

        assert!(matches!(
            set_match_up_outcome(&mut draw, "missing", MatchUpStatus::Completed, Some(1)),
            Err(DrawError::MatchUpNotFound(_))
        ));
    }

    #[test]
    fn test_in_progress_is_recorded_without_routing() {
        let mut draw = draw_of(DrawType::SingleElimination, 4);
        add_entries(&mut draw, 4, Stage::Main);
        let main = structure_ids(&draw)[0].clone();
        fill(&mut draw, &main, &[1, 2]);
        let first = match_up_id(&draw, &main, 1, 1);

        set_match_up_outcome(&mut draw, &first, MatchUpStatus::InProgress, None).unwrap();
        let structure = draw.structure(&main).unwrap();
        assert_eq!(structure.round_match_ups(1)[0].match_up_status, MatchUpStatus::InProgress);
        assert_eq!(structure.round_match_ups(2)[0].draw_positions, [None, None]);

        // a placed participant is never replaced by a bye
        assert!(matches!(
            assign_bye(&mut draw, &main, 2),
            Err(DrawError::PositionOccupied { .. })
        ));
    }

    #[test]
    fn test_final_winner_crosses_into_decider() {
        let mut draw = draw_of(DrawType::DoubleElimination, 4);
        add_entries(&mut draw, 4, Stage::Main);
        let ids = structure_ids(&draw);
        fill(&mut draw, &ids[0], &[1, 2, 3, 4]);

        for (round, position) in [(1, 1), (1, 2), (2, 1)] {
            let id = match_up_id(&draw, &ids[0], round, position);
            set_match_up_outcome(&mut draw, &id, MatchUpStatus::Completed, Some(1)).unwrap();
        }

        let decider = draw
            .structures
            .iter()
            .find(|s| s.position_count() == 2 && s.structure_id != ids[0])
            .unwrap();
        assert!(decider.position_of("p1").is_some());
    }

    #[test]
    fn test_double_walkover_gives_opponent_a_bye() {
        let mut draw = draw_of(DrawType::SingleElimination, 8);
        add_entries(&mut draw, 8, Stage::Main);
        let main = structure_ids(&draw)[0].clone();
        fill(&mut draw, &main, &[1, 2, 3, 4, 5, 6, 7, 8]);

        let first = match_up_id(&draw, &main, 1, 1);
        let second = match_up_id(&draw, &main, 1, 2);
        set_match_up_outcome(&mut draw, &first, MatchUpStatus::DoubleWalkover, None).unwrap();
        set_match_up_outcome(&mut draw, &second, MatchUpStatus::Completed, Some(1)).unwrap();

        let structure = draw.structure(&main).unwrap();
        let semifinal = structure.round_match_ups(2)[0];
        assert_eq!(semifinal.match_up_status, MatchUpStatus::Bye);
        assert_eq!(semifinal.draw_positions, [None, Some(3)]);
        assert_eq!(structure.round_match_ups(3)[0].draw_positions[0], Some(3));
    }

    #[test]
    fn test_group_finishers_fill_playoff() {
        let mut draw = draw_of(DrawType::RoundRobinWithPlayoff, 12);
        add_entries(&mut draw, 12, Stage::Main);
        let ids = structure_ids(&draw);
        let container = draw.structure(&ids[0]).unwrap().clone();
        let orders: Vec<Vec<ParticipantId>> = container
            .structures
            .iter()
            .map(|group| {
                group
                    .position_assignments
                    .iter()
                    .map(|a| format!("p{}", a.draw_position))
                    .collect()
            })
            .collect();
        fill(&mut draw, &ids[0], &(1..=12).collect::<Vec<_>>());

        place_group_finishers(&mut draw, &ids[0], &orders, &mut StdRng::seed_from_u64(3)).unwrap();

        // three group winners in a four position play-off: one bye
        let playoff = draw.structure(&ids[1]).unwrap();
        assert_eq!(playoff.position_of("p1"), Some(1));
        assert_eq!(playoff.position_of("p5"), Some(4));
        assert_eq!(playoff.position_of("p9"), Some(2));
        assert!(playoff.assignment(3).unwrap().is_bye());
        assert_eq!(playoff.round_match_ups(2)[0].draw_positions[1], Some(4));
    }

    #[test]
    fn test_group_finishers_must_belong_to_group() {
        let mut draw = draw_of(DrawType::RoundRobinWithPlayoff, 8);
        let container = structure_ids(&draw)[0].clone();
        let orders = vec![vec!["p5".to_string()], vec!["p1".to_string()]];

        let mut rng = StdRng::seed_from_u64(1);
        let err = place_group_finishers(&mut draw, &container, &orders, &mut rng).unwrap_err();
        assert!(matches!(err, DrawError::InvalidFinishingPositions { .. }));
    }
}
