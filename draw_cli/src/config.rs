//! Command line configuration.
//!
//! Flags take priority over environment variables (a `.env` file is loaded
//! first), and every value is validated before a draw is generated.

use draw_engine::{DrawParams, DrawType, Entry, PolicyDefinitions, SeedBlockShape, Stage};

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub draw_type: Option<String>,
    pub draw_size: Option<String>,
    pub entries: Option<String>,
    pub seeds: Option<String>,
    pub group_size: Option<String>,
    pub seed_blocks: Option<String>,
    pub round_names: Option<String>,
    pub random_seed: Option<String>,
}

/// Complete CLI configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub draw_type: DrawType,
    /// Positions of the main structure (entrants for round robins)
    pub draw_size: u32,
    /// Number of generated participants
    pub entries: u32,
    /// The first `seeds` participants are seeded in order
    pub seeds: u32,
    pub group_size: Option<u32>,
    pub seed_block_shape: SeedBlockShape,
    pub abbreviated_round_names: bool,
    /// Fixed RNG seed for reproducible positioning
    pub random_seed: Option<u64>,
}

impl CliConfig {
    /// Load configuration from flags, falling back to the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a value is missing or cannot be parsed
    pub fn from_env(overrides: CliOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    /// Load configuration from flags, falling back to `lookup`
    pub fn from_lookup<F>(overrides: CliOverrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |flag: Option<String>, var: &str| flag.or_else(|| lookup(var));

        let draw_type = value(overrides.draw_type, "DRAW_TYPE")
            .map(|v| parse::<DrawType>("DRAW_TYPE", &v))
            .transpose()?
            .unwrap_or(DrawType::SingleElimination);

        let draw_size = value(overrides.draw_size, "DRAW_SIZE")
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "DRAW_SIZE".to_string(),
                hint: "Pass --size N or set DRAW_SIZE".to_string(),
            })
            .and_then(|v| parse::<u32>("DRAW_SIZE", &v))?;

        let entries = value(overrides.entries, "DRAW_ENTRIES")
            .map(|v| parse::<u32>("DRAW_ENTRIES", &v))
            .transpose()?
            .unwrap_or(draw_size);

        let seeds = value(overrides.seeds, "DRAW_SEEDS")
            .map(|v| parse::<u32>("DRAW_SEEDS", &v))
            .transpose()?
            .unwrap_or(0);

        let group_size = value(overrides.group_size, "DRAW_GROUP_SIZE")
            .map(|v| parse::<u32>("DRAW_GROUP_SIZE", &v))
            .transpose()?;

        let seed_block_shape = value(overrides.seed_blocks, "DRAW_SEED_BLOCKS")
            .map(|v| parse::<SeedBlockShape>("DRAW_SEED_BLOCKS", &v))
            .transpose()?
            .unwrap_or_default();

        let abbreviated_round_names = match value(overrides.round_names, "DRAW_ROUND_NAMES") {
            None => false,
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "full" => false,
                "abbreviated" | "short" => true,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DRAW_ROUND_NAMES".to_string(),
                        reason: format!("expected full or abbreviated, got {v}"),
                    });
                }
            },
        };

        let random_seed = value(overrides.random_seed, "DRAW_RANDOM_SEED")
            .map(|v| parse::<u64>("DRAW_RANDOM_SEED", &v))
            .transpose()?;

        Ok(CliConfig {
            draw_type,
            draw_size,
            entries,
            seeds,
            group_size,
            seed_block_shape,
            abbreviated_round_names,
            random_seed,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.draw_size < 2 {
            return Err(ConfigError::Invalid {
                var: "DRAW_SIZE".to_string(),
                reason: "Must be at least 2".to_string(),
            });
        }

        if self.entries > self.draw_size {
            return Err(ConfigError::Invalid {
                var: "DRAW_ENTRIES".to_string(),
                reason: format!("Cannot exceed draw size ({})", self.draw_size),
            });
        }

        if self.seeds > self.entries {
            return Err(ConfigError::Invalid {
                var: "DRAW_SEEDS".to_string(),
                reason: format!("Cannot exceed entries ({})", self.entries),
            });
        }

        Ok(())
    }

    /// Participant id of the `index`th generated entry (1-based)
    pub fn participant_id(index: u32) -> String {
        format!("P{index:03}")
    }

    pub fn params(&self) -> DrawParams {
        let mut params = DrawParams::new(self.draw_type, self.draw_size);
        params.group_size = self.group_size;
        params.entries = (1..=self.entries)
            .map(|i| Entry::new(Self::participant_id(i), Stage::Main))
            .collect();
        params
    }

    pub fn policy(&self) -> PolicyDefinitions {
        let mut policy = PolicyDefinitions::default();
        policy.seeding.seed_block_shape = self.seed_block_shape;
        policy.round_naming.abbreviated = self.abbreviated_round_names;
        policy
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse a setting, naming the variable on failure
fn parse<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var: var.to_string(),
        reason: e.to_string(),
    })
}
