//! Neuroevolution of skyrunner ships.
//!
//! A population of network-controlled [`Agent`]s flies through a shared obstacle
//! field until every agent has crashed or left the viable band. The best genome of
//! each generation is kept in a bounded [`EliteArchive`], and the next population
//! is bred from the archive with the [`GeneticOperators`]. Learning happens only
//! through selection and recombination; networks are never trained by gradient.
//!
//! # Architecture
//!
//! ```text
//! GenerationController
//!     ├─ ObstacleField  ← spawn clock (wall-clock thread or tick countdown)
//!     ├─ Agents         ← advanced in parallel against one field snapshot
//!     ├─ EliteArchive   → GeneticOperators → next population
//!     └─ GenomeStore    ← every archived winner, one file per generation
//! ```
//!
//! # Modules
//!
//! - [`config`] - [`TrainingConfig`] and its validation
//! - [`agent`] - Per-tick agent behaviour and scoring
//! - [`archive`] - [`ScoreRecord`] and the bounded elite archive
//! - [`genetic`] - Crossover, mutation and sign inversion
//! - [`store`] - Durable [`GenomeStore`] implementations
//! - [`controller`] - The generation state machine
//!
//! # Example
//!
//! ```
//! use skyrunner_training::{
//!     GenerationController, MemoryStore, SpawnClock, TickOutcome, TrainingConfig,
//! };
//!
//! let config = TrainingConfig {
//!     population_size: 4,
//!     seed: Some(7),
//!     generation_tick_limit: Some(200),
//!     ..TrainingConfig::default()
//! };
//! let mut controller =
//!     GenerationController::new(config, Box::new(MemoryStore::new()), SpawnClock::Ticks)?;
//!
//! let summary = loop {
//!     if let TickOutcome::GenerationComplete(summary) = controller.tick() {
//!         break summary;
//!     }
//! };
//! assert_eq!(summary.generation, 1);
//! assert_eq!(controller.archive().len(), 1);
//! # Ok::<(), skyrunner_training::ControllerError>(())
//! ```

pub use self::{
    agent::{Agent, AgentState, AgentStatus, Scoring},
    archive::{EliteArchive, ScoreRecord},
    config::{ConfigError, TrainingConfig},
    controller::{
        ControllerError, GenerationController, GenerationState, GenerationSummary, Phase,
        SpawnClock, TickOutcome,
    },
    genetic::GeneticOperators,
    store::{DirectoryStore, GenomeStore, MemoryStore, PersistenceError},
};

pub mod agent;
pub mod archive;
pub mod config;
pub mod controller;
pub mod genetic;
pub mod store;
