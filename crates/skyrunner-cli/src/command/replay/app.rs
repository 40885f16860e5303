use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    text::Line,
    widgets::Block as BlockWidget,
};
use ratatui_runtime::{App, ControlSignal, RenderMode, Runtime};
use skyrunner_engine::{FrameRecorder, RenderError};
use skyrunner_training::{Agent, AgentStatus, ScoreRecord, TrainingConfig};

use crate::{
    command::course::Course,
    ui::widgets::{HelpBar, KeyBinding, SceneCanvas, style},
};

const FRAME_RATE: f64 = 60.0;

const BINDINGS: &[KeyBinding] = &[
    KeyBinding::new(&["Space", "↑", "Enter", "Click"], "Restart after a crash"),
    KeyBinding::new(&["q", "Esc"], "Quit"),
];

/// Flies one archived genome alone.
#[derive(Debug)]
pub struct ReplayApp {
    course: Course,
    agent: Agent,
    record: ScoreRecord,
    config: TrainingConfig,
    recorder: FrameRecorder,
    best: i64,
    render_error: Option<RenderError>,
    exit: bool,
}

impl ReplayApp {
    pub fn new(course: Course, agent: Agent, record: ScoreRecord, config: TrainingConfig) -> Self {
        Self {
            course,
            agent,
            record,
            config,
            recorder: FrameRecorder::new(),
            best: i64::MIN,
            render_error: None,
            exit: false,
        }
    }

    /// Returns the best score of the session, or the render error that ended it.
    pub fn finish(self) -> Result<i64, RenderError> {
        match self.render_error {
            Some(error) => Err(error),
            None => Ok(self.best.max(self.agent.score())),
        }
    }

    fn record_frame(&mut self) {
        if let Err(error) = self.course.draw_frame(&mut self.recorder, &self.agent) {
            self.render_error = Some(error);
            self.exit = true;
        }
    }
}

impl App for ReplayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_interval(Some(self.config.tick_interval()));
        runtime.set_render_mode(RenderMode::throttled_from_rate(FRAME_RATE));
        self.record_frame();
    }

    fn should_exit(&self) -> bool {
        self.exit
    }

    fn handle_signal(&mut self, _runtime: &mut Runtime, signal: ControlSignal) {
        match signal {
            ControlSignal::Quit => self.exit = true,
            ControlSignal::PrimaryAction if !self.agent.is_alive() => {
                self.agent.reset();
                self.course.restart();
                self.record_frame();
            }
            ControlSignal::PrimaryAction
            | ControlSignal::TogglePause
            | ControlSignal::ToggleTurbo => {}
        }
    }

    fn update(&mut self, _runtime: &mut Runtime) {
        if !self.agent.is_alive() {
            return;
        }
        let snapshot = self.course.advance();
        self.agent.advance(&snapshot, &self.config.physics, &self.config.scoring);
        if !self.agent.is_alive() {
            self.best = self.best.max(self.agent.score());
            self.course.halt();
        }
        self.record_frame();
    }

    fn draw(&self, frame: &mut Frame) {
        let help = HelpBar::new(BINDINGS).block(BlockWidget::bordered());
        let [scene_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(help.height())])
                .areas(frame.area());

        let state = self.agent.state();
        let title = format!(
            "Replay: generation {} (archived score {})  Score: {}",
            self.record.generation, self.record.score, state.score
        );
        let scene =
            SceneCanvas::new(self.recorder.presented()).block(BlockWidget::bordered().title(title));
        frame.render_widget(scene, scene_area);
        frame.render_widget(help, help_area);

        if !state.status.is_alive() {
            let cause = match state.status {
                AgentStatus::OutOfBounds(_) => "OUT OF BOUNDS",
                AgentStatus::Alive | AgentStatus::Crashed | AgentStatus::Retired => "CRASHED",
            };
            let banner = Line::styled(format!(" {cause} - press Space to restart "), style::BANNER);
            let banner_area = scene_area.centered(
                Constraint::Length(u16::try_from(banner.width()).unwrap_or(u16::MAX)),
                Constraint::Length(1),
            );
            frame.render_widget(banner, banner_area);
        }
    }
}
