//! Bye and participant propagation.
//!
//! Every mutation that can move a position forward is queued as a [`Task`]
//! and processed iteratively. A bye settles the match-ups holding its
//! position: each becomes BYE, the opposing position advances, and
//! the bye itself leaves over the round's LOSER links. Advancing out of the
//! last round crosses the WINNER link, so a single bye can cascade through
//! every linked structure.
//!
//! Positions that already hold a bye or a qualifier are never overwritten;
//! writing the same value twice is a no-op. Within one call, a target
//! position crossed again with the same arrival is left alone; a different
//! arrival there means the links form a cycle.

use log::debug;
use std::collections::{HashMap, VecDeque};

use crate::error::{DrawError, DrawResult};
use crate::links::{next_slot, resolve_target};
use crate::model::{
    DrawDefinition, DrawLink, DrawPosition, FeedProfile, LinkType, MatchUpId, MatchUpStatus,
    Occupant, ParticipantId, StructureId,
};

/// Unit of propagation work
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Task {
    /// Write a bye; `over_qualifier` lets a bye replace a qualifier placeholder
    Bye {
        structure_id: StructureId,
        draw_position: DrawPosition,
        over_qualifier: bool,
    },
    /// Write a participant arriving over a link
    Place {
        structure_id: StructureId,
        draw_position: DrawPosition,
        participant_id: ParticipantId,
    },
    /// Re-evaluate every match-up holding a position
    Settle {
        structure_id: StructureId,
        draw_position: DrawPosition,
    },
    Evaluate {
        structure_id: StructureId,
        index: usize,
    },
}

/// What crosses a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Arrival {
    Participant(ParticipantId),
    Bye,
}

pub(crate) struct Propagation<'a> {
    draw: &'a mut DrawDefinition,
    queue: VecDeque<Task>,
    crossings: HashMap<(StructureId, DrawPosition), Arrival>,
    /// Qualifier placeholders claimed per source structure and position
    claimed: HashMap<(StructureId, DrawPosition), DrawPosition>,
    modified: Vec<MatchUpId>,
}

impl<'a> Propagation<'a> {
    pub(crate) fn new(draw: &'a mut DrawDefinition) -> Self {
        Self {
            draw,
            queue: VecDeque::new(),
            crossings: HashMap::new(),
            claimed: HashMap::new(),
            modified: Vec::new(),
        }
    }

    pub(crate) fn draw(&self) -> &DrawDefinition {
        &*self.draw
    }

    pub(crate) fn draw_mut(&mut self) -> &mut DrawDefinition {
        &mut *self.draw
    }

    pub(crate) fn push(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    pub(crate) fn mark_modified(&mut self, match_up_id: MatchUpId) {
        self.modified.push(match_up_id);
    }

    /// Process queued tasks until none remain; returns the modified match-ups.
    pub(crate) fn run(mut self) -> DrawResult<Vec<MatchUpId>> {
        while let Some(task) = self.queue.pop_front() {
            match task {
                Task::Bye {
                    structure_id,
                    draw_position,
                    over_qualifier,
                } => self.bye(&structure_id, draw_position, over_qualifier)?,
                Task::Place {
                    structure_id,
                    draw_position,
                    participant_id,
                } => self.place(&structure_id, draw_position, &participant_id)?,
                Task::Settle {
                    structure_id,
                    draw_position,
                } => self.settle(&structure_id, draw_position)?,
                Task::Evaluate {
                    structure_id,
                    index,
                } => self.evaluate(&structure_id, index)?,
            }
        }
        Ok(self.modified)
    }

    fn bye(
        &mut self,
        structure_id: &str,
        draw_position: DrawPosition,
        over_qualifier: bool,
    ) -> DrawResult<()> {
        let structure = self.draw.structure(structure_id)?;
        let assignment = structure
            .assignment(draw_position)
            .ok_or_else(|| DrawError::DrawPositionNotFound {
                structure_id: structure_id.to_string(),
                draw_position,
            })?;
        match assignment.occupant() {
            Occupant::Bye => return Ok(()),
            Occupant::Qualifier if !over_qualifier => return Ok(()),
            Occupant::Participant(participant_id) => {
                return Err(DrawError::PositionOccupied {
                    draw_position,
                    participant_id: participant_id.to_string(),
                });
            }
            Occupant::Qualifier | Occupant::Unfilled => {}
        }
        if let Some(active) = structure
            .all_match_ups()
            .into_iter()
            .find(|m| m.contains(draw_position) && m.match_up_status.is_active())
        {
            return Err(DrawError::ActivePosition {
                draw_position,
                status: active.match_up_status,
            });
        }

        debug!("Bye at position {draw_position} of {structure_id}");
        let is_container = structure.is_container();
        let structure = self.draw.structure_mut(structure_id)?;
        if let Some(assignment) = structure.assignment_mut(draw_position) {
            assignment.set_bye();
        }

        if is_container {
            // group match-ups are never propagated
            for match_up in structure.all_match_ups_mut() {
                if match_up.contains(draw_position)
                    && match_up.match_up_status != MatchUpStatus::Bye
                {
                    match_up.match_up_status = MatchUpStatus::Bye;
                    self.modified.push(match_up.match_up_id.clone());
                }
            }
        } else {
            self.push(Task::Settle {
                structure_id: structure_id.to_string(),
                draw_position,
            });
        }
        Ok(())
    }

    fn place(
        &mut self,
        structure_id: &str,
        draw_position: DrawPosition,
        participant_id: &str,
    ) -> DrawResult<()> {
        let structure = self.draw.structure(structure_id)?;
        let assignment = structure
            .assignment(draw_position)
            .ok_or_else(|| DrawError::DrawPositionNotFound {
                structure_id: structure_id.to_string(),
                draw_position,
            })?;
        match assignment.occupant() {
            Occupant::Participant(existing) if existing == participant_id => return Ok(()),
            Occupant::Participant(existing) => {
                return Err(DrawError::PositionOccupied {
                    draw_position,
                    participant_id: existing.to_string(),
                });
            }
            Occupant::Bye => return Err(DrawError::PositionUnavailable(draw_position)),
            Occupant::Qualifier | Occupant::Unfilled => {}
        }
        if let Some(placed) = structure.position_of(participant_id) {
            return Err(DrawError::ParticipantAlreadyPlaced {
                participant_id: participant_id.to_string(),
                draw_position: placed,
            });
        }

        debug!("{participant_id} arrives at position {draw_position} of {structure_id}");
        if let Some(assignment) = self
            .draw
            .structure_mut(structure_id)?
            .assignment_mut(draw_position)
        {
            assignment.set_participant(participant_id.to_string());
        }
        self.push(Task::Settle {
            structure_id: structure_id.to_string(),
            draw_position,
        });
        Ok(())
    }

    fn settle(&mut self, structure_id: &str, draw_position: DrawPosition) -> DrawResult<()> {
        let structure = self.draw.structure(structure_id)?;
        if structure.is_container() {
            return Ok(());
        }
        // earliest round first; a bye settled late may still owe a loser cascade
        let mut indices: Vec<(u32, usize)> = structure
            .match_ups
            .iter()
            .enumerate()
            .filter(|(_, m)| m.contains(draw_position))
            .map(|(index, m)| (m.round_number, index))
            .collect();
        indices.sort_unstable();
        for (_, index) in indices {
            self.push(Task::Evaluate {
                structure_id: structure_id.to_string(),
                index,
            });
        }
        Ok(())
    }

    /// Resolve a match-up that holds a bye, or that lost a side to a double
    /// walkover.
    fn evaluate(&mut self, structure_id: &str, index: usize) -> DrawResult<()> {
        let structure = self.draw.structure(structure_id)?;
        let match_up = structure.match_ups.get(index).ok_or_else(|| {
            DrawError::CorruptDocument(format!("match-up index {index} outside {structure_id}"))
        })?;
        let status = match_up.match_up_status;
        if status.is_active() {
            return Ok(());
        }

        let (round_number, round_position) = (match_up.round_number, match_up.round_position);
        let is_bye = |draw_position| {
            structure
                .assignment(draw_position)
                .is_some_and(|a| a.is_bye())
        };
        let (winner, loser) = match match_up.draw_positions {
            [Some(first), Some(second)] => match (is_bye(first), is_bye(second)) {
                (false, false) => return Ok(()),
                (false, true) => (first, Some(second)),
                (true, false) => (second, Some(first)),
                (true, true) => {
                    // the bye that already moved on stays the one advanced
                    let advanced = next_slot(structure, round_number, round_position)
                        .and_then(|(index, side)| structure.match_ups[index].draw_positions[side]);
                    if advanced == Some(second) {
                        (second, Some(first))
                    } else {
                        (first, Some(second))
                    }
                }
            },
            [Some(draw_position), None] | [None, Some(draw_position)]
                if status == MatchUpStatus::Bye =>
            {
                (draw_position, None)
            }
            _ => return Ok(()),
        };

        if status != MatchUpStatus::Bye {
            let match_up_id = match_up.match_up_id.clone();
            self.draw.structure_mut(structure_id)?.match_ups[index].match_up_status =
                MatchUpStatus::Bye;
            self.modified.push(match_up_id);
        }

        self.advance(structure_id, round_number, round_position, winner)?;
        if let Some(loser) = loser {
            self.cascade_loser(structure_id, round_number, round_position, winner, loser)?;
        }
        Ok(())
    }

    /// Move a position out of its match-up: into the next round, or over the
    /// WINNER link when the round is the last one.
    pub(crate) fn advance(
        &mut self,
        structure_id: &str,
        round_number: u32,
        round_position: u32,
        draw_position: DrawPosition,
    ) -> DrawResult<()> {
        let structure = self.draw.structure(structure_id)?;
        if let Some((index, side)) = next_slot(structure, round_number, round_position) {
            let next = &structure.match_ups[index];
            match next.draw_positions[side] {
                Some(existing) if existing == draw_position => {}
                Some(existing) => {
                    return Err(DrawError::CorruptDocument(format!(
                        "match-up {} side {} holds position {existing}, not {draw_position}",
                        next.match_up_id,
                        side + 1
                    )));
                }
                None => {
                    let match_up_id = next.match_up_id.clone();
                    self.draw.structure_mut(structure_id)?.match_ups[index].draw_positions[side] =
                        Some(draw_position);
                    self.modified.push(match_up_id);
                }
            }
            self.push(Task::Evaluate {
                structure_id: structure_id.to_string(),
                index,
            });
            return Ok(());
        }

        let Some(link) = self.draw.winner_link(structure_id, round_number).cloned() else {
            return Ok(());
        };
        let arrival = match structure.assignment(draw_position).map(|a| a.occupant()) {
            Some(Occupant::Participant(participant_id)) => {
                Arrival::Participant(participant_id.to_string())
            }
            Some(Occupant::Bye) => Arrival::Bye,
            // not known yet; it crosses once a participant is placed
            _ => return Ok(()),
        };
        self.send_across(&link, round_position, draw_position, arrival)
    }

    fn cascade_loser(
        &mut self,
        structure_id: &str,
        round_number: u32,
        round_position: u32,
        winner: DrawPosition,
        loser: DrawPosition,
    ) -> DrawResult<()> {
        let links: Vec<DrawLink> = self
            .draw
            .links_from_round(structure_id, round_number)
            .filter(|l| l.link_type == LinkType::Loser && !l.is_conditional())
            .cloned()
            .collect();

        for link in links {
            if self.is_reserved(structure_id, &link, round_number, winner)? {
                debug!(
                    "Position {winner} of {structure_id} keeps its slot in {}",
                    link.target.structure_id
                );
                continue;
            }
            self.send_across(&link, round_position, loser, Arrival::Bye)?;
        }
        Ok(())
    }

    /// A participant advancing through a bye into their first played match
    /// may still lose it and take the slot over a FIRST_MATCHUP link.
    fn is_reserved(
        &self,
        structure_id: &str,
        link: &DrawLink,
        round_number: u32,
        winner: DrawPosition,
    ) -> DrawResult<bool> {
        let structure = self.draw.structure(structure_id)?;
        if structure.assignment(winner).is_some_and(|a| a.is_bye())
            || structure.initial_round_number(winner) != Some(round_number)
        {
            return Ok(false);
        }
        Ok(self.draw.links.iter().any(|l| {
            l.is_conditional()
                && l.source.structure_id == structure_id
                && l.source.round_number.is_some_and(|r| r > round_number)
                && l.target.structure_id == link.target.structure_id
        }))
    }

    /// Send a participant or a bye over a link from `source_position` in
    /// match-up `round_position` of the link's source round.
    pub(crate) fn send_across(
        &mut self,
        link: &DrawLink,
        round_position: u32,
        source_position: DrawPosition,
        arrival: Arrival,
    ) -> DrawResult<()> {
        let target_id = link.target.structure_id.clone();
        if let Arrival::Participant(participant_id) = &arrival {
            let target = self
                .draw
                .structure(&target_id)
                .map_err(|_| DrawError::DanglingLink(target_id.clone()))?;
            if target.position_of(participant_id).is_some() {
                return Ok(());
            }
        }

        let draw_position = self.arrival_position(link, round_position, source_position)?;
        let target = self.draw.structure(&target_id)?;
        let is_bye = target.assignment(draw_position).is_some_and(|a| a.is_bye());
        if arrival == Arrival::Bye && is_bye {
            return Ok(());
        }

        let key = (target_id.clone(), draw_position);
        match self.crossings.get(&key) {
            Some(pending) if *pending == arrival => return Ok(()),
            Some(_) => return Err(DrawError::CyclicLinks(target_id)),
            None => {}
        }
        self.crossings.insert(key, arrival.clone());

        let task = match arrival {
            Arrival::Bye => Task::Bye {
                structure_id: target_id,
                draw_position,
                over_qualifier: true,
            },
            Arrival::Participant(participant_id) => Task::Place {
                structure_id: target_id,
                draw_position,
                participant_id,
            },
        };
        self.push(task);
        Ok(())
    }

    /// Target position of a link crossing. DRAW and RANDOM links fill the
    /// first open qualifier placeholder of the target round; a source
    /// position crossing again gets the placeholder it claimed before.
    fn arrival_position(
        &mut self,
        link: &DrawLink,
        round_position: u32,
        source_position: DrawPosition,
    ) -> DrawResult<DrawPosition> {
        match link.target.feed_profile {
            FeedProfile::Draw | FeedProfile::Random => {
                let source = (link.source.structure_id.clone(), source_position);
                if let Some(&draw_position) = self.claimed.get(&source) {
                    return Ok(draw_position);
                }
                let target_id = &link.target.structure_id;
                let target = self.draw.structure(target_id)?;
                let draw_position = target
                    .draw_positions()
                    .into_iter()
                    .filter(|&dp| target.initial_round_number(dp) == Some(link.target.round_number))
                    .filter(|&dp| !self.crossings.contains_key(&(target_id.clone(), dp)))
                    .find(|&dp| target.assignment(dp).is_some_and(|a| a.is_qualifier()))
                    .ok_or_else(|| {
                        DrawError::UnresolvableLinkTarget(format!(
                            "no qualifier position left in {}",
                            target.structure_id
                        ))
                    })?;
                self.claimed.insert(source, draw_position);
                Ok(draw_position)
            }
            _ => {
                let slot =
                    resolve_target(&*self.draw, link, round_position, Some(source_position))?;
                slot.draw_position.ok_or_else(|| {
                    DrawError::UnresolvableLinkTarget(format!(
                        "match-up {} side {} has no draw position",
                        slot.match_up_id,
                        slot.side + 1
                    ))
                })
            }
        }
    }
}

/// Write a bye at `draw_position` and propagate it.
///
/// Idempotent on byes and qualifier placeholders; a position holding a
/// participant, or part of a contested match-up, is rejected.
pub fn assign_bye(
    draw: &mut DrawDefinition,
    structure_id: &str,
    draw_position: DrawPosition,
) -> DrawResult<()> {
    let unchanged = draw
        .structure(structure_id)?
        .assignment(draw_position)
        .is_some_and(|a| matches!(a.occupant(), Occupant::Bye | Occupant::Qualifier));
    if unchanged {
        return Ok(());
    }

    let mut propagation = Propagation::new(draw);
    propagation.push(Task::Bye {
        structure_id: structure_id.to_string(),
        draw_position,
        over_qualifier: false,
    });
    let modified = propagation.run()?;

    draw.touch();
    draw.notify_modified(modified);
    Ok(())
}
