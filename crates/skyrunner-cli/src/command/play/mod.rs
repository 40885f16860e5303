use std::time::Duration;

use ratatui_runtime::Runtime;
use skyrunner_engine::{ObstacleSizing, Physics};

use crate::command::{course::Course, play::app::PlayApp};

mod app;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Milliseconds between simulation ticks
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,
    /// Milliseconds between obstacle spawns
    #[arg(long, default_value_t = 750)]
    spawn_ms: u64,
    /// Obstacles of random size and speed
    #[arg(long, default_value_t = false)]
    varied: bool,
    /// Random seed for obstacle placement
    #[arg(long)]
    seed: Option<u64>,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            spawn_ms: 750,
            varied: false,
            seed: None,
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        tick_ms,
        spawn_ms,
        varied,
        seed,
    } = arg;

    anyhow::ensure!(
        *tick_ms > 0 && *spawn_ms > 0,
        "tick and spawn intervals must be positive"
    );
    let sizing = if *varied {
        ObstacleSizing::Varied
    } else {
        ObstacleSizing::Fixed
    };
    let course = Course::start(
        sizing,
        Duration::from_millis(*spawn_ms),
        seed.unwrap_or_else(rand::random),
    )?;

    let mut app = PlayApp::new(course, Physics::default(), Duration::from_millis(*tick_ms));
    Runtime::new().run(&mut app)?;
    let best = app.finish()?;

    eprintln!("Best score: {best}");
    Ok(())
}
