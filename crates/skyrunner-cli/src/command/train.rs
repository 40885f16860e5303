use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use skyrunner_training::{
    GenerationController, GenerationSummary, ScoreRecord, SpawnClock, TickOutcome, TrainingConfig,
};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training configuration file (JSON format)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding one record per archived generation
    #[arg(long, default_value = "./data/archive/")]
    archive_dir: PathBuf,
    /// Keep the archive in memory only
    #[arg(long, default_value_t = false)]
    no_persist: bool,
    /// Number of generations to run
    #[arg(long, default_value_t = 100)]
    generations: u64,
    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,
    /// Retire survivors after this many ticks (overrides the config file)
    #[arg(long)]
    tick_limit: Option<u64>,
    /// Output file path for the training report
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrainingReport {
    trained_at: DateTime<Utc>,
    config: TrainingConfig,
    generations: Vec<GenerationSummary>,
    archive: Vec<ScoreRecord>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        config,
        archive_dir,
        no_persist,
        generations,
        seed,
        tick_limit,
        output,
    } = arg;

    let mut config = util::load_config(config.as_deref())?;
    if seed.is_some() {
        config.seed = *seed;
    }
    if tick_limit.is_some() {
        config.generation_tick_limit = *tick_limit;
    }
    if config.generation_tick_limit.is_none() {
        log::warn!("no generation tick limit; a perfect flyer will never finish its generation");
    }

    let store = util::open_store(archive_dir, !*no_persist);
    if !*no_persist {
        log::info!("archiving to {}", archive_dir.display());
    }
    let mut controller = GenerationController::new(config.clone(), store, SpawnClock::Ticks)?;
    let first_generation = controller.generation();

    let mut summaries = vec![];
    while summaries.len() < usize::try_from(*generations)? {
        if let TickOutcome::GenerationComplete(summary) = controller.tick() {
            summaries.push(summary);
        }
    }

    let last_generation = controller.generation();
    log::info!(
        "trained generations {}..={last_generation}; archive best {}",
        first_generation + 1,
        controller.archive().best().map_or(0, |record| record.score),
    );

    let report = TrainingReport {
        trained_at: Utc::now(),
        config,
        generations: summaries,
        archive: controller.archive().iter().cloned().collect(),
    };
    util::save_json(&report, output.as_deref())?;

    Ok(())
}
