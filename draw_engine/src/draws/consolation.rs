//! Consolation draws built from a main tree plus separate consolation trees
//! or ladders.

use super::{DrawGenerator, GeneratedDraw, GenerationContext, StructurePlan};
use crate::builder::LadderOptions;
use crate::builder::tree::{check_tree_size, tree_round_count};
use crate::constants::{CONSOLATION, MAIN, MIN_CONSOLATION_DRAW_SIZE, PLAY_OFF};
use crate::error::{DrawError, DrawResult};
use crate::links::{first_match_loser_link, ladder_feed_links, loser_link};
use crate::model::{FeedProfile, Stage};

fn check_consolation_size(draw_size: u32) -> DrawResult<()> {
    check_tree_size(draw_size)?;
    if draw_size < MIN_CONSOLATION_DRAW_SIZE {
        return Err(DrawError::InvalidDrawSize {
            draw_size,
            reason: format!(
                "a consolation needs a main draw of at least {MIN_CONSOLATION_DRAW_SIZE}"
            ),
        });
    }
    Ok(())
}

/// Main tree plus a half-size consolation tree fed by first round losers.
fn first_round_consolation(
    ctx: &mut GenerationContext,
    plan: &StructurePlan,
) -> DrawResult<GeneratedDraw> {
    let draw_size = plan.draw_size;
    check_consolation_size(draw_size)?;

    let offset = plan.finishing_position_offset;
    let main = ctx.tree_structure(plan.name_or(MAIN), plan.stage, draw_size, offset)?;
    let consolation = ctx.tree_structure(
        CONSOLATION,
        Stage::Consolation,
        draw_size / 2,
        offset + draw_size / 2,
    )?;
    let links = vec![loser_link(
        &main.structure_id,
        1,
        &consolation.structure_id,
        1,
        ctx.policy.feed.first_round_profile,
    )];

    Ok(GeneratedDraw {
        structures: vec![main, consolation],
        links,
        ..GeneratedDraw::default()
    })
}

/// FIRST_ROUND_LOSER_CONSOLATION
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstRoundLoserConsolation;

impl DrawGenerator for FirstRoundLoserConsolation {
    fn generate(
        &self,
        ctx: &mut GenerationContext,
        plan: &StructurePlan,
    ) -> DrawResult<GeneratedDraw> {
        first_round_consolation(ctx, plan)
    }
}

/// FIRST_MATCH_LOSER_CONSOLATION: a first round consolation whose second
/// round losers also enter when round two was their first played match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstMatchLoserConsolation;

impl DrawGenerator for FirstMatchLoserConsolation {
    fn generate(
        &self,
        ctx: &mut GenerationContext,
        plan: &StructurePlan,
    ) -> DrawResult<GeneratedDraw> {
        let mut generated = first_round_consolation(ctx, plan)?;
        let link = first_match_loser_link(
            &generated.structures[0].structure_id,
            2,
            &generated.structures[1].structure_id,
            ctx.policy.feed.first_match_profile,
        );
        generated.links.push(link);
        Ok(generated)
    }
}

/// CURTIS_CONSOLATION: every pair of main rounds (excluding the final)
/// feeds its own ladder; a lone remaining round becomes a two-position
/// play-off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurtisConsolation;

impl DrawGenerator for CurtisConsolation {
    fn generate(
        &self,
        ctx: &mut GenerationContext,
        plan: &StructurePlan,
    ) -> DrawResult<GeneratedDraw> {
        let draw_size = plan.draw_size;
        check_consolation_size(draw_size)?;

        let offset = plan.finishing_position_offset;
        let round_count = tree_round_count(draw_size);
        let main = ctx.tree_structure(plan.name_or(MAIN), plan.stage, draw_size, offset)?;
        let main_id = main.structure_id.clone();

        let mut generated = GeneratedDraw::single(main);
        let fed_main_rounds: Vec<u32> = (1..round_count).collect();

        for (index, rounds) in fed_main_rounds.chunks(2).enumerate() {
            match *rounds {
                [first, second] => {
                    let base = draw_size >> first;
                    let fed = draw_size >> second;
                    let options = LadderOptions::new(base, vec![fed]).with_offset(offset + fed);
                    let (ladder, feed_rounds) = ctx.ladder_structure(
                        format!("{CONSOLATION} {}", index + 1),
                        Stage::Consolation,
                        &options,
                    )?;
                    generated.links.extend(ladder_feed_links(
                        &main_id,
                        &[first, second],
                        &ladder.structure_id,
                        &feed_rounds,
                        ctx.policy.feed.first_round_profile,
                    )?);
                    generated.structures.push(ladder);
                }
                [lone] => {
                    let size = draw_size >> lone;
                    let play_off_offset = offset + size;
                    let play_off = ctx.tree_structure(
                        format!("{PLAY_OFF} {}-{}", play_off_offset + 1, play_off_offset + size),
                        Stage::PlayOff,
                        size,
                        play_off_offset,
                    )?;
                    generated.links.push(loser_link(
                        &main_id,
                        lone,
                        &play_off.structure_id,
                        1,
                        FeedProfile::TopDown,
                    ));
                    generated.structures.push(play_off);
                }
                _ => {}
            }
        }

        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkType;
    use crate::policy::PolicyDefinitions;

    fn generate<G: DrawGenerator>(generator: G, draw_size: u32) -> GeneratedDraw {
        let mut ctx = GenerationContext::new(PolicyDefinitions::default(), Vec::new());
        generator
            .generate(&mut ctx, &StructurePlan::new(draw_size, Stage::Main))
            .unwrap()
    }

    #[test]
    fn test_first_round_loser_consolation() {
        let generated = generate(FirstRoundLoserConsolation, 16);
        let consolation = &generated.structures[1];
        assert_eq!(consolation.position_count(), 8);
        assert_eq!(consolation.finishing_range(), Some([9, 16]));
        assert_eq!(generated.links.len(), 1);
        assert_eq!(generated.links[0].target.feed_profile, FeedProfile::TopDown);
    }

    #[test]
    fn test_first_match_loser_consolation_adds_conditional_link() {
        let generated = generate(FirstMatchLoserConsolation, 16);
        assert_eq!(generated.links.len(), 2);

        let conditional = &generated.links[1];
        assert!(conditional.is_conditional());
        assert_eq!(conditional.source.round_number, Some(2));
        assert_eq!(conditional.target.feed_profile, FeedProfile::LossPosition);
    }

    #[test]
    fn test_curtis_pairs_rounds_into_ladders() {
        let generated = generate(CurtisConsolation, 32);
        let names: Vec<&str> = generated
            .structures
            .iter()
            .map(|s| s.structure_name.as_str())
            .collect();
        assert_eq!(names, vec!["Main", "Consolation 1", "Consolation 2"]);
        assert_eq!(generated.structures[1].finishing_range(), Some([9, 32]));
        assert_eq!(generated.structures[2].finishing_range(), Some([3, 8]));
        assert_eq!(generated.links.len(), 4);
    }

    #[test]
    fn test_curtis_lone_round_becomes_play_off() {
        let generated = generate(CurtisConsolation, 16);
        let play_off = generated.structures.last().unwrap();
        assert_eq!(play_off.stage, Stage::PlayOff);
        assert_eq!(play_off.structure_name, "Play-off 3-4");
        assert_eq!(play_off.position_count(), 2);

        let into_play_off = generated
            .links
            .iter()
            .find(|l| l.target.structure_id == play_off.structure_id)
            .unwrap();
        assert_eq!(into_play_off.link_type, LinkType::Loser);
        assert_eq!(into_play_off.source.round_number, Some(3));
    }

    #[test]
    fn test_consolation_needs_four_positions() {
        let mut ctx = GenerationContext::new(PolicyDefinitions::default(), Vec::new());
        let err = FirstRoundLoserConsolation
            .generate(&mut ctx, &StructurePlan::new(2, Stage::Main))
            .unwrap_err();
        assert!(matches!(err, DrawError::InvalidDrawSize { draw_size: 2, .. }));
    }
}
