//! Training parameters.
//!
//! [`TrainingConfig`] is read from JSON with camelCase keys; every key is optional
//! and falls back to the defaults below.
//!
//! | key | default |
//! |---|---|
//! | `populationSize` | 50 |
//! | `archiveLimit` | 10 |
//! | `tickIntervalMs` | 10 |
//! | `obstacleSpawnIntervalMs` | 750 |
//! | `mutationRateRange` | `[0.05, 0.2]` |
//! | `crossoverProbability` | 0.3 |
//! | `seed` | none (seeded from the OS) |
//! | `generationTickLimit` | none |
//! | `obstacleSizing` | `{"kind": "fixed"}` |
//! | `physics` | `{"gravity": 0.1, "jumpVelocity": 5.0}` |
//! | `scoring` | `{"survivalReward": 1, "collisionPenalty": 0, "outOfBoundsPenalty": 300}` |

use std::time::Duration;

use serde::{Deserialize, Serialize};
use skyrunner_engine::{ObstacleSizing, Physics};

use crate::agent::Scoring;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingConfig {
    /// Number of agents per generation.
    pub population_size: usize,
    /// Maximum number of elite records kept.
    pub archive_limit: usize,
    pub tick_interval_ms: u64,
    pub obstacle_spawn_interval_ms: u64,
    /// Per-weight mutation rate is drawn uniformly from this range for every child.
    pub mutation_rate_range: (f64, f64),
    /// Probability that a non-elite child is bred by crossover rather than mutation.
    pub crossover_probability: f64,
    pub seed: Option<u64>,
    /// Retires surviving agents after this many ticks.
    pub generation_tick_limit: Option<u64>,
    pub obstacle_sizing: ObstacleSizing,
    pub physics: Physics,
    pub scoring: Scoring,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            archive_limit: 10,
            tick_interval_ms: 10,
            obstacle_spawn_interval_ms: 750,
            mutation_rate_range: (0.05, 0.2),
            crossover_probability: 0.3,
            seed: None,
            generation_tick_limit: None,
            obstacle_sizing: ObstacleSizing::default(),
            physics: Physics::default(),
            scoring: Scoring::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("archive limit must be at least 1")]
    EmptyArchive,
    #[display("{name} must be greater than zero")]
    ZeroInterval { name: &'static str },
    #[display("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },
    #[display("mutation rate range [{min}, {max}] is inverted")]
    InvertedRange { min: f64, max: f64 },
    #[display("generation tick limit must be at least 1")]
    ZeroTickLimit,
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.archive_limit == 0 {
            return Err(ConfigError::EmptyArchive);
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                name: "tickIntervalMs",
            });
        }
        if self.obstacle_spawn_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                name: "obstacleSpawnIntervalMs",
            });
        }
        let (min, max) = self.mutation_rate_range;
        for (name, value) in [
            ("mutationRateRange", min),
            ("mutationRateRange", max),
            ("crossoverProbability", self.crossover_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { name, value });
            }
        }
        if min > max {
            return Err(ConfigError::InvertedRange { min, max });
        }
        if self.generation_tick_limit == Some(0) {
            return Err(ConfigError::ZeroTickLimit);
        }
        Ok(())
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.obstacle_spawn_interval_ms)
    }

    /// The spawn interval expressed in whole ticks, at least one.
    #[must_use]
    pub fn spawn_every_ticks(&self) -> u64 {
        (self.obstacle_spawn_interval_ms / self.tick_interval_ms.max(1)).max(1)
    }
}
