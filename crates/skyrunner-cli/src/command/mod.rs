use clap::{Parser, Subcommand};

use self::{play::PlayArg, replay::ReplayArg, train::TrainArg, watch::WatchArg};

mod course;
mod play;
mod replay;
mod train;
mod watch;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Fly a ship yourself
    Play(#[clap(flatten)] PlayArg),
    /// Train a population headless and archive the winners
    Train(#[clap(flatten)] TrainArg),
    /// Train a population while watching it in the terminal
    Watch(#[clap(flatten)] WatchArg),
    /// Fly an archived genome
    Replay(#[clap(flatten)] ReplayArg),
}

impl Mode {
    /// Log level used when `RUST_LOG` is unset.
    ///
    /// Terminal modes stay silent so log lines never tear the alternate screen.
    fn default_log_filter(&self) -> &'static str {
        match self {
            Mode::Train(_) => "info",
            Mode::Play(_) | Mode::Watch(_) | Mode::Replay(_) => "off",
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let mode = args.mode.unwrap_or(Mode::Play(PlayArg::default()));

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(mode.default_log_filter()),
    )
    .init();

    match mode {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Watch(arg) => watch::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
    }
    Ok(())
}
