//! Qualifying stage prepended to a main structure.

use serde_json::json;

use super::{GeneratedDraw, GenerationContext, QualifyingProfile};
use crate::builder::{
    TreeOptions, build_round_robin, build_tree, container_structure, group_count, item_structure,
};
use crate::constants::{DEFAULT_GROUP_SIZE, QUALIFYING};
use crate::error::{DrawError, DrawResult};
use crate::links::{position_link, winner_link};
use crate::model::extensions::ROUND_TARGET;
use crate::model::{DrawType, Stage, Structure};

/// Build the qualifying structure and the link into round one of `main`.
///
/// A tree is truncated once `qualifying_positions` winners remain; a round
/// robin sends the same number of finishers from every group.
pub fn generate_qualifying(
    ctx: &mut GenerationContext,
    profile: &QualifyingProfile,
    main: &Structure,
) -> DrawResult<GeneratedDraw> {
    profile.validate()?;

    let qualifiers = profile.qualifying_positions;
    if qualifiers as usize >= main.position_count() {
        return Err(DrawError::InvalidDrawSize {
            draw_size: qualifiers,
            reason: format!(
                "{qualifiers} qualifiers do not fit a main structure of {} positions",
                main.position_count()
            ),
        });
    }

    let name = profile
        .structure_name
        .clone()
        .unwrap_or_else(|| QUALIFYING.to_string());
    let feed_profile = ctx.policy.feed.qualifier_profile;
    let structure_id = ctx.ids.next_id();

    let (qualifying, link) = match profile.draw_type {
        DrawType::RoundRobin => {
            let group_size = profile.group_size.unwrap_or(DEFAULT_GROUP_SIZE);
            let groups = group_count(profile.draw_size, group_size)?;
            let per_group = qualifiers / groups;
            if qualifiers % groups != 0 || per_group >= group_size {
                return Err(DrawError::InvalidFinishingPositions {
                    positions: vec![qualifiers],
                    reason: format!("{qualifiers} qualifiers cannot be split over {groups} groups"),
                });
            }

            let group_structures =
                build_round_robin(&mut ctx.ids, profile.draw_size, group_size, Stage::Qualifying)?;
            let stage_sequence = ctx.next_sequence(Stage::Qualifying);
            let container = container_structure(
                structure_id,
                name,
                Stage::Qualifying,
                stage_sequence,
                group_structures,
            );
            let link = position_link(
                &container.structure_id,
                (1..=per_group).collect(),
                &main.structure_id,
                feed_profile,
            );
            (container, link)
        }
        _ => {
            let round_limit = (profile.draw_size / qualifiers).ilog2();
            let match_ups = build_tree(
                &mut ctx.ids,
                &TreeOptions::new(profile.draw_size).with_round_limit(round_limit),
            )?;
            let stage_sequence = ctx.next_sequence(Stage::Qualifying);
            let mut tree = item_structure(
                structure_id,
                name,
                Stage::Qualifying,
                stage_sequence,
                match_ups,
                profile.draw_size,
            );
            tree.round_limit = Some(round_limit);
            tree.qualifying_round_number = Some(round_limit);
            let link = winner_link(
                &tree.structure_id,
                round_limit,
                &main.structure_id,
                1,
                feed_profile,
            );
            (tree, link)
        }
    };

    let mut generated = GeneratedDraw::default();
    generated
        .extensions
        .set(qualifying.structure_id.clone(), ROUND_TARGET, json!(1));
    generated.links.push(link);
    generated.structures.push(qualifying);
    Ok(generated)
}
