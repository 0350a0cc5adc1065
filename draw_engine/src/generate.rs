//! Document-level generation.
//!
//! [`generate_draw_definition`] builds a complete document from
//! [`DrawParams`]. [`generate_structures`] and [`add_playoff_structures`]
//! grow an existing document. Every call either adds all of its structures
//! and links or leaves the document untouched.

use log::{debug, info};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::builder::name_rounds;
use crate::draws::qualifying::generate_qualifying;
use crate::draws::{
    DrawGenerator, DrawParams, GeneratedDraw, GenerationContext, Orchestrator, PlayoffGroup,
    PlayoffSource, StructurePlan,
};
use crate::error::{DrawError, DrawResult};
use crate::model::{DrawDefinition, LinkType, Stage, StructureId};
use crate::notice::DrawNotice;
use crate::playoff::{elimination_playoffs, round_robin_playoffs};
use crate::policy::PolicyDefinitions;
use crate::validation::check_links;

/// Generate a new draw document with its main structure, every structure
/// the draw type composes, and the optional qualifying stage.
pub fn generate_draw_definition(
    params: &DrawParams,
    policy: &PolicyDefinitions,
) -> DrawResult<DrawDefinition> {
    params.validate()?;
    policy.validate()?;

    let mut ctx = GenerationContext::new(policy.clone(), params.supplied_ids.clone());
    let generated = generate_with_qualifying(&mut ctx, params)?;

    let draw_id = params
        .draw_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let mut draw = DrawDefinition::new(draw_id, params.draw_type);
    if let Some(draw_name) = &params.draw_name {
        draw.draw_name = draw_name.clone();
    }
    draw.match_up_type = params.match_up_type;
    draw.entries = params.entries.clone();

    let added = attach(&mut draw, generated, policy)?;
    info!(
        "Generated {} draw {} with {} structure(s)",
        params.draw_type,
        draw.draw_id,
        added.len()
    );
    Ok(draw)
}

/// Add the structures of `params.draw_type` to an existing document.
///
/// The main structure takes `stage_sequence` of `stage` (the next free slot
/// when absent). An empty structure already in that slot is replaced
/// together with its links; one holding assignments is an error.
pub fn generate_structures(
    draw: &mut DrawDefinition,
    params: &DrawParams,
    stage: Stage,
    stage_sequence: Option<u32>,
    policy: &PolicyDefinitions,
) -> DrawResult<Vec<StructureId>> {
    params.validate()?;
    policy.validate()?;

    let mut candidate = draw.clone();
    if let Some(stage_sequence) = stage_sequence {
        clear_stage_slot(&mut candidate, stage, stage_sequence)?;
    }

    let mut ctx = GenerationContext::new(policy.clone(), params.supplied_ids.clone())
        .after_existing(&candidate.structures);
    let plan = StructurePlan::new(params.draw_size, stage).with_name(params.structure_name.clone());
    let mut generated = Orchestrator::from_params(params).generate(&mut ctx, &plan)?;
    if let (Some(stage_sequence), Some(main)) = (stage_sequence, generated.structures.first_mut()) {
        main.stage_sequence = stage_sequence;
    }

    let added = attach(&mut candidate, generated, policy)?;
    info!("Added {} structure(s) to draw {}", added.len(), candidate.draw_id);
    *draw = candidate;
    Ok(added)
}

/// Build playoff structures fed from an existing source structure.
///
/// Round robin sources take groups of finishing positions and are linked
/// with POSITION links; elimination sources take rounds whose losers feed
/// the new structure over a LOSER link.
pub fn add_playoff_structures(
    draw: &mut DrawDefinition,
    source_id: &str,
    groups: &[PlayoffGroup],
    policy: &PolicyDefinitions,
) -> DrawResult<Vec<StructureId>> {
    policy.validate()?;
    if groups.is_empty() {
        return Err(DrawError::MissingValue("playoffGroups"));
    }

    let mut candidate = draw.clone();
    let source = candidate.structure(source_id)?.clone();
    for group in groups {
        if let Some(stage_sequence) = group.stage_sequence {
            clear_stage_slot(&mut candidate, Stage::PlayOff, stage_sequence)?;
        }
    }

    let mut ctx =
        GenerationContext::new(policy.clone(), Vec::new()).after_existing(&candidate.structures);
    let generated = if source.is_container() {
        check_linked_finishers(&candidate, source_id, groups)?;
        round_robin_playoffs(&mut ctx, &source, groups)?
    } else {
        elimination_playoffs(&mut ctx, &source, &candidate.links, groups)?
    };

    let added = attach(&mut candidate, generated, policy)?;
    info!(
        "Added {} playoff structure(s) below {source_id} in draw {}",
        added.len(),
        candidate.draw_id
    );
    *draw = candidate;
    Ok(added)
}

fn generate_with_qualifying(
    ctx: &mut GenerationContext,
    params: &DrawParams,
) -> DrawResult<GeneratedDraw> {
    let plan = StructurePlan::new(params.draw_size, Stage::Main)
        .with_name(params.structure_name.clone());
    let mut generated = Orchestrator::from_params(params).generate(ctx, &plan)?;

    if let Some(profile) = &params.qualifying {
        let main = generated
            .structures
            .first()
            .cloned()
            .ok_or_else(|| DrawError::CorruptDocument("no main structure generated".to_string()))?;
        let qualifying = generate_qualifying(ctx, profile, &main)?;
        debug!("Qualifying stage of {} feeds {}", profile.draw_size, main.structure_id);
        generated.absorb(qualifying);
    }
    Ok(generated)
}

/// Name rounds, move generated structures and links into the document, check
/// the link graph, and queue notices.
fn attach(
    draw: &mut DrawDefinition,
    generated: GeneratedDraw,
    policy: &PolicyDefinitions,
) -> DrawResult<Vec<StructureId>> {
    let GeneratedDraw {
        mut structures,
        links,
        extensions,
    } = generated;

    for structure in &mut structures {
        name_rounds(structure, &policy.round_naming);
    }
    let structure_ids: Vec<StructureId> =
        structures.iter().map(|s| s.structure_id.clone()).collect();
    let match_up_ids: Vec<_> = structures.iter().flat_map(|s| s.match_up_ids()).collect();

    draw.structures.extend(structures);
    draw.links.extend(links);
    draw.extensions.merge(extensions);
    check_links(draw)?;

    draw.touch();
    draw.notify(DrawNotice::StructuresAdded {
        structure_ids: structure_ids.clone(),
    });
    if !match_up_ids.is_empty() {
        draw.notify(DrawNotice::MatchUpsAdded { match_up_ids });
    }
    Ok(structure_ids)
}

/// Make a stage slot free: an empty occupant is dropped with its links.
fn clear_stage_slot(
    draw: &mut DrawDefinition,
    stage: Stage,
    stage_sequence: u32,
) -> DrawResult<()> {
    let Some(occupant) = draw
        .structures
        .iter()
        .find(|s| s.stage == stage && s.stage_sequence == stage_sequence)
    else {
        return Ok(());
    };
    if occupant.has_assignments() || !occupant.seed_assignments.is_empty() {
        return Err(DrawError::StageSlotOccupied {
            stage,
            stage_sequence,
            structure_id: occupant.structure_id.clone(),
        });
    }

    let structure_id = occupant.structure_id.clone();
    debug!("Replacing empty structure {structure_id} in {stage:?}/{stage_sequence}");
    draw.structures.retain(|s| s.structure_id != structure_id);
    draw.links.retain(|l| {
        l.source.structure_id != structure_id && l.target.structure_id != structure_id
    });
    Ok(())
}

/// Finishing positions of a round robin may only feed one structure.
fn check_linked_finishers(
    draw: &DrawDefinition,
    source_id: &str,
    groups: &[PlayoffGroup],
) -> DrawResult<()> {
    let linked: BTreeSet<u32> = draw
        .links
        .iter()
        .filter(|l| l.link_type == LinkType::Position && l.source.structure_id == source_id)
        .flat_map(|l| l.source.finishing_positions.iter().flatten().copied())
        .collect();

    for group in groups {
        if let PlayoffSource::FinishingPositions(positions) = &group.source {
            if let Some(position) = positions.iter().find(|p| linked.contains(p)) {
                return Err(DrawError::OverlappingFinishingPositions(format!(
                    "finishing position {position} of {source_id} already feeds a structure"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draws::QualifyingProfile;
    use crate::model::{DrawType, Entry};
    use crate::validation::validate_draw;

    fn policy() -> PolicyDefinitions {
        PolicyDefinitions::default()
    }

    #[test]
    fn test_generate_single_elimination() {
        let mut params = DrawParams::new(DrawType::SingleElimination, 8);
        params.draw_id = Some("d1".to_string());
        params.entries = (1..=6).map(|i| Entry::new(format!("p{i}"), Stage::Main)).collect();

        let mut draw = generate_draw_definition(&params, &policy()).unwrap();
        assert_eq!(draw.draw_id, "d1");
        assert_eq!(draw.draw_name, "SINGLE_ELIMINATION");
        assert_eq!(draw.entries.len(), 6);
        assert_eq!(draw.structures.len(), 1);

        let main = draw.main_structure().unwrap();
        assert_eq!(main.round_match_ups(3)[0].round_name.as_deref(), Some("Final"));

        let notices = draw.drain_notices();
        assert!(matches!(notices[0], DrawNotice::DrawModified { .. }));
        assert!(matches!(
            &notices[1],
            DrawNotice::StructuresAdded { structure_ids } if structure_ids.len() == 1
        ));
        assert!(matches!(
            &notices[2],
            DrawNotice::MatchUpsAdded { match_up_ids } if match_up_ids.len() == 7
        ));
    }

    #[test]
    fn test_supplied_ids_are_used_in_order() {
        let mut params = DrawParams::new(DrawType::SingleElimination, 2);
        params.supplied_ids = vec!["main".to_string(), "final".to_string()];

        let draw = generate_draw_definition(&params, &policy()).unwrap();
        assert_eq!(draw.structures[0].structure_id, "main");
        assert_eq!(draw.structures[0].match_ups[0].match_up_id, "final");
    }

    #[test]
    fn test_generation_with_qualifying() {
        let mut params = DrawParams::new(DrawType::FeedInChampionship, 16);
        params.qualifying = Some(QualifyingProfile::new(16, 4));

        let draw = generate_draw_definition(&params, &policy()).unwrap();
        assert_eq!(draw.structures.len(), 3);
        let qualifying = draw
            .structures
            .iter()
            .find(|s| s.stage == Stage::Qualifying)
            .unwrap();
        assert_eq!(
            qualifying.round_match_ups(1)[0].round_name.as_deref(),
            Some("Q-Round of 16")
        );
        assert_eq!(validate_draw(&draw), Ok(()));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = DrawParams::new(DrawType::Compass, 12);
        assert!(matches!(
            generate_draw_definition(&params, &policy()),
            Err(DrawError::InvalidDrawSize { .. })
        ));
    }

    #[test]
    fn test_generate_structures_into_empty_slot() {
        let params = DrawParams::new(DrawType::SingleElimination, 8);
        let mut draw = generate_draw_definition(&params, &policy()).unwrap();
        let old_main = draw.structures[0].structure_id.clone();

        let replacement = DrawParams::new(DrawType::FirstRoundLoserConsolation, 16);
        let added =
            generate_structures(&mut draw, &replacement, Stage::Main, Some(1), &policy()).unwrap();

        assert_eq!(added.len(), 2);
        assert!(draw.structure(&old_main).is_err());
        assert_eq!(draw.main_structure().unwrap().position_count(), 16);
    }

    #[test]
    fn test_generate_structures_rejects_occupied_slot() {
        let mut params = DrawParams::new(DrawType::SingleElimination, 4);
        params.entries = vec![Entry::new("p1", Stage::Main)];
        let mut draw = generate_draw_definition(&params, &policy()).unwrap();
        let main = draw.structures[0].structure_id.clone();
        crate::placement::assign_draw_position(&mut draw, &main, 1, "p1", &policy()).unwrap();
        let before = draw.clone();

        let err =
            generate_structures(&mut draw, &params, Stage::Main, Some(1), &policy()).unwrap_err();
        assert!(matches!(err, DrawError::StageSlotOccupied { stage_sequence: 1, .. }));
        assert_eq!(draw, before);
    }

    #[test]
    fn test_add_round_robin_playoffs() {
        let params = DrawParams::new(DrawType::RoundRobin, 16);
        let mut draw = generate_draw_definition(&params, &policy()).unwrap();
        let container = draw.structures[0].structure_id.clone();

        let groups = vec![
            PlayoffGroup::finishing_positions(vec![1, 2]),
            PlayoffGroup::finishing_positions(vec![3, 4]).with_name("Silver"),
        ];
        let added = add_playoff_structures(&mut draw, &container, &groups, &policy()).unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(draw.structure(&added[1]).unwrap().structure_name, "Silver");
        assert_eq!(draw.links.len(), 2);

        let again = vec![PlayoffGroup::finishing_positions(vec![2])];
        assert!(matches!(
            add_playoff_structures(&mut draw, &container, &again, &policy()),
            Err(DrawError::OverlappingFinishingPositions(_))
        ));
    }

    #[test]
    fn test_add_elimination_playoff() {
        let params = DrawParams::new(DrawType::SingleElimination, 16);
        let mut draw = generate_draw_definition(&params, &policy()).unwrap();
        let main = draw.structures[0].structure_id.clone();

        let added =
            add_playoff_structures(&mut draw, &main, &[PlayoffGroup::round(2)], &policy()).unwrap();
        let playoff = draw.structure(&added[0]).unwrap();
        assert_eq!(playoff.stage, Stage::PlayOff);
        assert_eq!(playoff.position_count(), 4);
        assert_eq!(validate_draw(&draw), Ok(()));
    }
}
