//! Generation parameters.

use serde::{Deserialize, Serialize};

use crate::builder::tree::check_tree_size;
use crate::constants::{DEFAULT_GROUP_SIZE, MIN_ROUND_ROBIN_SIZE};
use crate::error::{DrawError, DrawResult};
use crate::model::{DrawType, Entry, MatchUpType};

/// Where a playoff structure takes its participants from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayoffSource {
    /// Finishers of every round robin group in these positions
    FinishingPositions(Vec<u32>),
    /// Losers of this round of an elimination structure
    Round(u32),
}

/// One playoff structure to build from a source structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoffGroup {
    pub source: PlayoffSource,
    pub draw_type: DrawType,
    pub structure_name: Option<String>,
    /// Stage slot to fill; the next free PLAY_OFF slot when absent
    pub stage_sequence: Option<u32>,
}

impl PlayoffGroup {
    pub fn finishing_positions(positions: Vec<u32>) -> Self {
        Self {
            source: PlayoffSource::FinishingPositions(positions),
            draw_type: DrawType::SingleElimination,
            structure_name: None,
            stage_sequence: None,
        }
    }

    pub fn round(round_number: u32) -> Self {
        Self {
            source: PlayoffSource::Round(round_number),
            draw_type: DrawType::SingleElimination,
            structure_name: None,
            stage_sequence: None,
        }
    }

    pub fn with_draw_type(mut self, draw_type: DrawType) -> Self {
        self.draw_type = draw_type;
        self
    }

    pub fn with_name(mut self, structure_name: impl Into<String>) -> Self {
        self.structure_name = Some(structure_name.into());
        self
    }
}

/// A qualifying stage feeding the main structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualifyingProfile {
    pub draw_size: u32,
    /// Qualifiers produced; for round robins, a multiple of the group count
    pub qualifying_positions: u32,
    /// SINGLE_ELIMINATION or ROUND_ROBIN
    pub draw_type: DrawType,
    pub group_size: Option<u32>,
    pub structure_name: Option<String>,
}

impl QualifyingProfile {
    pub fn new(draw_size: u32, qualifying_positions: u32) -> Self {
        Self {
            draw_size,
            qualifying_positions,
            draw_type: DrawType::SingleElimination,
            group_size: None,
            structure_name: None,
        }
    }

    pub fn validate(&self) -> DrawResult<()> {
        match self.draw_type {
            DrawType::SingleElimination => {
                check_tree_size(self.draw_size)?;
                if self.qualifying_positions == 0
                    || !self.qualifying_positions.is_power_of_two()
                    || self.qualifying_positions >= self.draw_size
                {
                    return Err(DrawError::InvalidDrawSize {
                        draw_size: self.draw_size,
                        reason: format!(
                            "{} qualifying positions cannot be taken from a tree of {}",
                            self.qualifying_positions, self.draw_size
                        ),
                    });
                }
                Ok(())
            }
            DrawType::RoundRobin => {
                if self.qualifying_positions == 0 {
                    return Err(DrawError::MissingValue("qualifyingPositions"));
                }
                Ok(())
            }
            other => Err(DrawError::UnsupportedDrawType {
                draw_type: other,
                reason: "qualifying stages are single elimination or round robin".to_string(),
            }),
        }
    }
}

/// Everything needed to generate a draw definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawParams {
    pub draw_id: Option<String>,
    pub draw_name: Option<String>,
    pub draw_type: DrawType,
    /// Positions of an elimination main structure, entrants of a round robin
    pub draw_size: u32,
    pub match_up_type: MatchUpType,
    pub group_size: Option<u32>,
    /// Feed-in championships: the main final's loser also feeds the consolation
    pub feeds_from_final: bool,
    /// Name of the main structure
    pub structure_name: Option<String>,
    pub qualifying: Option<QualifyingProfile>,
    /// ROUND_ROBIN_WITH_PLAYOFF only
    pub playoff_groups: Vec<PlayoffGroup>,
    pub entries: Vec<Entry>,
    /// Ids consumed in order before any uuid is generated
    pub supplied_ids: Vec<String>,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            draw_id: None,
            draw_name: None,
            draw_type: DrawType::SingleElimination,
            draw_size: 32,
            match_up_type: MatchUpType::Singles,
            group_size: None,
            feeds_from_final: false,
            structure_name: None,
            qualifying: None,
            playoff_groups: Vec::new(),
            entries: Vec::new(),
            supplied_ids: Vec::new(),
        }
    }
}

impl DrawParams {
    pub fn new(draw_type: DrawType, draw_size: u32) -> Self {
        Self {
            draw_type,
            draw_size,
            ..Self::default()
        }
    }

    pub fn group_size_or_default(&self) -> u32 {
        self.group_size.unwrap_or(DEFAULT_GROUP_SIZE)
    }

    /// Playoff groups to build; group winners into a single elimination
    /// when none were configured.
    pub fn effective_playoff_groups(&self) -> Vec<PlayoffGroup> {
        if self.playoff_groups.is_empty() && self.draw_type == DrawType::RoundRobinWithPlayoff {
            vec![PlayoffGroup::finishing_positions(vec![1])]
        } else {
            self.playoff_groups.clone()
        }
    }

    pub fn validate(&self) -> DrawResult<()> {
        if self.draw_size == 0 {
            return Err(DrawError::MissingValue("drawSize"));
        }
        if self.draw_type.requires_power_of_two() {
            check_tree_size(self.draw_size)?;
        }
        if let Some(group_size) = self.group_size {
            if group_size < MIN_ROUND_ROBIN_SIZE {
                return Err(DrawError::InvalidGroupSize {
                    draw_size: self.draw_size,
                    group_size,
                });
            }
        }
        if !self.playoff_groups.is_empty() && self.draw_type != DrawType::RoundRobinWithPlayoff {
            return Err(DrawError::UnsupportedDrawType {
                draw_type: self.draw_type,
                reason: "playoff groups are only generated for round robin with playoff"
                    .to_string(),
            });
        }
        if let Some(qualifying) = &self.qualifying {
            qualifying.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert_eq!(DrawParams::default().validate(), Ok(()));
    }

    #[test]
    fn test_missing_draw_size() {
        let params = DrawParams::new(DrawType::SingleElimination, 0);
        assert_eq!(params.validate(), Err(DrawError::MissingValue("drawSize")));
    }

    #[test]
    fn test_power_of_two_only_for_tree_types() {
        assert!(DrawParams::new(DrawType::Compass, 12).validate().is_err());
        assert!(DrawParams::new(DrawType::FeedIn, 12).validate().is_ok());
        assert!(DrawParams::new(DrawType::RoundRobin, 10).validate().is_ok());
    }

    #[test]
    fn test_playoff_groups_default_to_group_winners() {
        let params = DrawParams::new(DrawType::RoundRobinWithPlayoff, 16);
        assert_eq!(
            params.effective_playoff_groups(),
            vec![PlayoffGroup::finishing_positions(vec![1])]
        );
        assert!(
            DrawParams::new(DrawType::RoundRobin, 16)
                .effective_playoff_groups()
                .is_empty()
        );
    }

    #[test]
    fn test_qualifying_profile_validation() {
        assert_eq!(QualifyingProfile::new(16, 4).validate(), Ok(()));
        assert!(QualifyingProfile::new(16, 3).validate().is_err());
        assert!(QualifyingProfile::new(16, 16).validate().is_err());

        let mut compass = QualifyingProfile::new(16, 4);
        compass.draw_type = DrawType::Compass;
        assert!(matches!(
            compass.validate(),
            Err(DrawError::UnsupportedDrawType { .. })
        ));
    }
}
