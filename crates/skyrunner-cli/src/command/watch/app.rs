use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    widgets::Block as BlockWidget,
};
use ratatui_runtime::{App, ControlSignal, RenderMode, Runtime};
use skyrunner_engine::{FrameRecorder, RenderError};
use skyrunner_training::{GenerationController, GenerationSummary, TickOutcome};

use crate::ui::widgets::{HelpBar, KeyBinding, SceneCanvas, TrainingStatsDisplay};

const FRAME_RATE: f64 = 30.0;
const TURBO_TICKS_PER_UPDATE: usize = 25;

const BINDINGS: &[KeyBinding] = &[
    KeyBinding::new(&["p"], "Pause"),
    KeyBinding::new(&["t"], "Turbo"),
    KeyBinding::new(&["q", "Esc"], "Quit"),
];

#[derive(Debug)]
pub struct WatchApp {
    controller: GenerationController,
    recorder: FrameRecorder,
    last_summary: Option<GenerationSummary>,
    render_error: Option<RenderError>,
    paused: bool,
    turbo: bool,
    exit: bool,
}

impl WatchApp {
    pub fn new(controller: GenerationController, turbo: bool) -> Self {
        Self {
            controller,
            recorder: FrameRecorder::new(),
            last_summary: None,
            render_error: None,
            paused: false,
            turbo,
            exit: false,
        }
    }

    /// Hands back the controller, or the render error that stopped the app.
    pub fn finish(self) -> Result<GenerationController, RenderError> {
        match self.render_error {
            Some(error) => Err(error),
            None => Ok(self.controller),
        }
    }

    fn record_frame(&mut self) {
        if let Err(error) = self.controller.draw(&mut self.recorder) {
            self.render_error = Some(error);
            self.exit = true;
        }
    }

    fn apply_tick_interval(&self, runtime: &mut Runtime) {
        let interval = (!self.paused).then(|| self.controller.config().tick_interval());
        runtime.set_tick_interval(interval);
    }
}

impl App for WatchApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_render_mode(RenderMode::throttled_from_rate(FRAME_RATE));
        self.apply_tick_interval(runtime);
        self.record_frame();
    }

    fn should_exit(&self) -> bool {
        self.exit
    }

    fn handle_signal(&mut self, runtime: &mut Runtime, signal: ControlSignal) {
        match signal {
            ControlSignal::Quit => self.exit = true,
            ControlSignal::TogglePause => {
                self.paused = !self.paused;
                self.controller.set_paused(self.paused);
                self.apply_tick_interval(runtime);
            }
            ControlSignal::ToggleTurbo => self.turbo = !self.turbo,
            ControlSignal::PrimaryAction => {}
        }
    }

    fn update(&mut self, _runtime: &mut Runtime) {
        if self.paused {
            return;
        }
        let steps = if self.turbo { TURBO_TICKS_PER_UPDATE } else { 1 };
        for _ in 0..steps {
            if let TickOutcome::GenerationComplete(summary) = self.controller.tick() {
                self.last_summary = Some(summary);
            }
        }
        self.record_frame();
    }

    fn draw(&self, frame: &mut Frame) {
        let help = HelpBar::new(BINDINGS).block(BlockWidget::bordered());
        let stats = TrainingStatsDisplay::new(&self.controller)
            .block(BlockWidget::bordered().title("Training"));

        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(help.height())])
                .areas(frame.area());
        let [scene_area, stats_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(stats.width())])
                .areas(main_area);

        let mut title = format!("Generation {}", self.controller.generation() + 1);
        if self.paused {
            title.push_str(" [PAUSED]");
        }
        if self.turbo {
            title.push_str(" [TURBO]");
        }
        let mut scene_block = BlockWidget::bordered().title(title);
        if let Some(summary) = &self.last_summary {
            scene_block = scene_block.title_bottom(format!(
                "gen {}: best {} mean {:.1} worst {}",
                summary.generation, summary.best_score, summary.mean_score, summary.worst_score
            ));
        }
        let scene = SceneCanvas::new(self.recorder.presented()).block(scene_block);

        frame.render_widget(scene, scene_area);
        frame.render_widget(stats, stats_area);
        frame.render_widget(help, help_area);
    }
}
