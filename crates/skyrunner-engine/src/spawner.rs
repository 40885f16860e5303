use std::{
    io,
    sync::{
        Arc,
        mpsc::{self, RecvTimeoutError, Sender},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::obstacle_field::ObstacleField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpawnerCommand {
    Restart,
    Pause,
    Resume,
    Stop,
}

/// Wall-clock spawn timer feeding a shared [`ObstacleField`].
///
/// Spawns one obstacle per interval on a dedicated thread, independent of how fast
/// the field is ticked. Dropping the spawner stops and joins the thread.
#[derive(Debug)]
pub struct ObstacleSpawner {
    commands: Sender<SpawnerCommand>,
    handle: Option<JoinHandle<()>>,
}

impl ObstacleSpawner {
    /// Starts the spawn thread. The first obstacle appears one `interval` after start.
    pub fn start(field: Arc<ObstacleField>, interval: Duration, seed: u64) -> io::Result<Self> {
        let (commands, receiver) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("obstacle-spawner".into())
            .spawn(move || {
                let mut rng = Pcg32::seed_from_u64(seed);
                let mut deadline = Instant::now() + interval;
                loop {
                    let timeout = deadline.saturating_duration_since(Instant::now());
                    match receiver.recv_timeout(timeout) {
                        Ok(SpawnerCommand::Restart) => {
                            field.reset();
                            deadline = Instant::now() + interval;
                        }
                        Ok(SpawnerCommand::Pause) => {
                            // Everything but Resume, Restart and Stop is irrelevant while paused.
                            loop {
                                match receiver.recv() {
                                    Ok(SpawnerCommand::Resume) => break,
                                    Ok(SpawnerCommand::Restart) => {
                                        field.reset();
                                        break;
                                    }
                                    Ok(SpawnerCommand::Pause) => {}
                                    Ok(SpawnerCommand::Stop) | Err(_) => return,
                                }
                            }
                            deadline = Instant::now() + interval;
                        }
                        Ok(SpawnerCommand::Resume) => {}
                        Ok(SpawnerCommand::Stop) | Err(RecvTimeoutError::Disconnected) => return,
                        Err(RecvTimeoutError::Timeout) => {
                            field.spawn(&mut rng);
                            deadline = Instant::now() + interval;
                        }
                    }
                }
            })?;
        Ok(Self {
            commands,
            handle: Some(handle),
        })
    }

    /// Empties the field and restarts the interval from now; used at generation
    /// boundaries.
    ///
    /// Both happen on the spawner thread, so an obstacle of the previous interval
    /// never lands in the emptied field. A paused spawner resumes.
    pub fn restart(&self) {
        self.send(SpawnerCommand::Restart);
    }

    /// Suspends or resumes spawning. Resuming restarts the interval.
    pub fn set_paused(&self, paused: bool) {
        self.send(if paused {
            SpawnerCommand::Pause
        } else {
            SpawnerCommand::Resume
        });
    }

    fn send(&self, command: SpawnerCommand) {
        if self.commands.send(command).is_err() {
            log::warn!("obstacle spawner thread is gone; {command:?} ignored");
        }
    }
}

impl Drop for ObstacleSpawner {
    fn drop(&mut self) {
        let _ = self.commands.send(SpawnerCommand::Stop);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::warn!("obstacle spawner thread panicked");
        }
    }
}
