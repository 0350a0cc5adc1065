//! Policy definitions supplied by the policy layer.
//!
//! Policies are read-only configuration: the engine never writes them back.
//! Every policy has a `Default` matching common tournament practice and a
//! `validate()` that rejects combinations the engine cannot honor.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::error::DrawError;
use crate::model::{FeedProfile, Stage};

/// Policy validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Seed limit must be at least 1")]
    InvalidSeedLimit,

    #[error("Round name prefix for {0:?} must not be empty")]
    EmptyPrefix(Stage),

    #[error("Feed profile {profile:?} cannot be used for {field}")]
    InvalidFeedProfile {
        field: &'static str,
        profile: FeedProfile,
    },

    #[error("Unknown seed block shape: {0}")]
    UnknownSeedBlockShape(String),
}

impl From<PolicyError> for DrawError {
    fn from(err: PolicyError) -> Self {
        DrawError::InvalidPolicy(err.to_string())
    }
}

/// Where a seed lands inside a section that holds no earlier seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeedBlockShape {
    /// End of the section next to its paired section
    #[default]
    Cluster,
    /// End of the section away from its paired section
    Separate,
}

impl FromStr for SeedBlockShape {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cluster" => Ok(SeedBlockShape::Cluster),
            "separate" => Ok(SeedBlockShape::Separate),
            _ => Err(PolicyError::UnknownSeedBlockShape(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedingPolicy {
    pub seed_block_shape: SeedBlockShape,

    /// Overrides the default limit of half the structure's positions
    pub seed_limit: Option<u32>,

    /// Shuffle seeds within a block (and unseeded entrants) during
    /// automated positioning
    pub randomize_within_blocks: bool,
}

impl Default for SeedingPolicy {
    fn default() -> Self {
        Self {
            seed_block_shape: SeedBlockShape::Cluster,
            seed_limit: None,
            randomize_within_blocks: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundNamingPolicy {
    /// F / SF / QF / R16 instead of Final / Semifinals / ...
    pub abbreviated: bool,

    /// Prefix round names of non-main structures with their stage prefix
    pub stage_prefixes: bool,

    pub qualifying_prefix: String,
    pub consolation_prefix: String,
    pub play_off_prefix: String,
}

impl Default for RoundNamingPolicy {
    fn default() -> Self {
        Self {
            abbreviated: false,
            stage_prefixes: true,
            qualifying_prefix: "Q-".to_string(),
            consolation_prefix: "C-".to_string(),
            play_off_prefix: "P-".to_string(),
        }
    }
}

impl RoundNamingPolicy {
    pub fn prefix_for(&self, stage: Stage) -> Option<&str> {
        if !self.stage_prefixes {
            return None;
        }
        match stage {
            Stage::Qualifying => Some(&self.qualifying_prefix),
            Stage::Consolation | Stage::VoluntaryConsolation => Some(&self.consolation_prefix),
            Stage::PlayOff => Some(&self.play_off_prefix),
            Stage::Main => None,
        }
    }
}

/// Feed profiles for generated links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPolicy {
    /// Profile of the first fed round; later fed rounds alternate
    pub first_round_profile: FeedProfile,

    /// Profile of the first-match-loser link
    pub first_match_profile: FeedProfile,

    /// Profile of round robin playoff links
    pub playoff_profile: FeedProfile,

    /// Profile of qualifying-to-main links
    pub qualifier_profile: FeedProfile,
}

impl Default for FeedPolicy {
    fn default() -> Self {
        Self {
            first_round_profile: FeedProfile::TopDown,
            first_match_profile: FeedProfile::LossPosition,
            playoff_profile: FeedProfile::TopDown,
            qualifier_profile: FeedProfile::Draw,
        }
    }
}

/// All policies consumed by generation and placement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDefinitions {
    pub seeding: SeedingPolicy,
    pub round_naming: RoundNamingPolicy,
    pub feed: FeedPolicy,
}

impl PolicyDefinitions {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.seeding.seed_limit == Some(0) {
            return Err(PolicyError::InvalidSeedLimit);
        }

        if self.round_naming.stage_prefixes {
            for stage in [Stage::Qualifying, Stage::Consolation, Stage::PlayOff] {
                if self
                    .round_naming
                    .prefix_for(stage)
                    .is_some_and(|prefix| prefix.trim().is_empty())
                {
                    return Err(PolicyError::EmptyPrefix(stage));
                }
            }
        }

        let feed = &self.feed;
        if !matches!(
            feed.first_round_profile,
            FeedProfile::TopDown | FeedProfile::BottomUp
        ) {
            return Err(PolicyError::InvalidFeedProfile {
                field: "firstRoundProfile",
                profile: feed.first_round_profile,
            });
        }
        if !matches!(
            feed.first_match_profile,
            FeedProfile::LossPosition | FeedProfile::TopDown | FeedProfile::BottomUp
        ) {
            return Err(PolicyError::InvalidFeedProfile {
                field: "firstMatchProfile",
                profile: feed.first_match_profile,
            });
        }
        for (field, profile) in [
            ("playoffProfile", feed.playoff_profile),
            ("qualifierProfile", feed.qualifier_profile),
        ] {
            if profile == FeedProfile::LossPosition {
                return Err(PolicyError::InvalidFeedProfile { field, profile });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies_are_valid() {
        assert_eq!(PolicyDefinitions::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_seed_limit_rejected() {
        let mut policy = PolicyDefinitions::default();
        policy.seeding.seed_limit = Some(0);
        assert_eq!(policy.validate(), Err(PolicyError::InvalidSeedLimit));
    }

    #[test]
    fn test_loss_position_rejected_for_playoffs() {
        let mut policy = PolicyDefinitions::default();
        policy.feed.playoff_profile = FeedProfile::LossPosition;
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::InvalidFeedProfile {
                field: "playoffProfile",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_prefix_rejected_only_when_prefixes_enabled() {
        let mut policy = PolicyDefinitions::default();
        policy.round_naming.consolation_prefix = String::new();
        assert_eq!(
            policy.validate(),
            Err(PolicyError::EmptyPrefix(Stage::Consolation))
        );

        policy.round_naming.stage_prefixes = false;
        assert_eq!(policy.validate(), Ok(()));
    }

    #[test]
    fn test_seed_block_shape_parse() {
        assert_eq!("Separate".parse(), Ok(SeedBlockShape::Separate));
        assert!("zigzag".parse::<SeedBlockShape>().is_err());
    }

    #[test]
    fn test_policy_error_maps_to_draw_error() {
        let err: DrawError = PolicyError::InvalidSeedLimit.into();
        assert!(matches!(err, DrawError::InvalidPolicy(_)));
    }
}
