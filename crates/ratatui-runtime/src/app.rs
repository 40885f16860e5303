use ratatui::Frame;

use crate::{ControlSignal, Runtime};

/// Trait for TUI applications.
///
/// Applications executed by `Runtime::run()` must implement this trait.
pub trait App {
    /// Initializes the application.
    ///
    /// Called at the start of `Runtime::run()`. Use this to configure the tick interval
    /// and render mode.
    fn init(&mut self, runtime: &mut Runtime);

    /// Returns whether the application should exit.
    ///
    /// Checked before every event, so an exit requested by a signal takes effect
    /// before the next tick.
    fn should_exit(&self) -> bool;

    /// Handles a decoded input signal.
    fn handle_signal(&mut self, runtime: &mut Runtime, signal: ControlSignal);

    /// Advances the application by one tick.
    fn update(&mut self, runtime: &mut Runtime);

    /// Draws the screen.
    fn draw(&self, frame: &mut Frame);
}
