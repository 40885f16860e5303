use std::path::PathBuf;

use ratatui_runtime::Runtime;
use skyrunner_training::{GenerationController, SpawnClock};

use crate::{command::watch::app::WatchApp, util};

mod app;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct WatchArg {
    /// Training configuration file (JSON format)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding one record per archived generation
    #[arg(long, default_value = "./data/archive/")]
    archive_dir: PathBuf,
    /// Keep the archive in memory only
    #[arg(long, default_value_t = false)]
    no_persist: bool,
    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,
    /// Start in turbo mode
    #[arg(long, default_value_t = false)]
    turbo: bool,
}

pub(crate) fn run(arg: &WatchArg) -> anyhow::Result<()> {
    let WatchArg {
        config,
        archive_dir,
        no_persist,
        seed,
        turbo,
    } = arg;

    let mut config = util::load_config(config.as_deref())?;
    if seed.is_some() {
        config.seed = *seed;
    }
    let store = util::open_store(archive_dir, !*no_persist);
    let controller = GenerationController::new(config, store, SpawnClock::Wall)?;

    let mut app = WatchApp::new(controller, *turbo);
    Runtime::new().run(&mut app)?;
    let controller = app.finish()?;

    eprintln!(
        "Stopped in generation {}; archive best {}",
        controller.generation() + 1,
        controller.archive().best().map_or(0, |record| record.score),
    );
    Ok(())
}
