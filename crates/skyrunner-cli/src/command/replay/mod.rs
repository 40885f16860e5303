use std::path::PathBuf;

use anyhow::Context as _;
use ratatui_runtime::Runtime;
use skyrunner_training::{Agent, DirectoryStore};

use crate::{
    command::{course::Course, replay::app::ReplayApp},
    util,
};

mod app;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Archived generation record (JSON format)
    record: PathBuf,
    /// Training configuration file (JSON format) for physics, scoring and timing
    #[arg(long)]
    config: Option<PathBuf>,
    /// Random seed for obstacle placement (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        record,
        config,
        seed,
    } = arg;

    let config = util::load_config(config.as_deref())?;
    eprintln!("Loading record from {}", record.display());
    let record_path = record;
    let record = DirectoryStore::read_record(record_path)?;
    eprintln!("Loaded generation {} (score {})", record.generation, record.score);
    let agent = Agent::new(record.genome.clone(), 0).with_context(|| {
        format!(
            "Record does not fit the standard network: {}",
            record_path.display()
        )
    })?;

    let course = Course::start(
        config.obstacle_sizing,
        config.spawn_interval(),
        seed.or(config.seed).unwrap_or_else(rand::random),
    )?;
    let mut app = ReplayApp::new(course, agent, record, config);
    Runtime::new().run(&mut app)?;
    let best = app.finish()?;

    eprintln!("Best score: {best}");
    Ok(())
}
