use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    text::Line,
    widgets::Block as BlockWidget,
};
use ratatui_runtime::{App, ControlSignal, RenderMode, Runtime};
use skyrunner_engine::{FrameRecorder, Physics, PlayerShip, RenderError};

use crate::{
    command::course::Course,
    ui::widgets::{HelpBar, KeyBinding, SceneCanvas, style},
};

const FRAME_RATE: f64 = 60.0;

const BINDINGS: &[KeyBinding] = &[
    KeyBinding::new(&["Space", "↑", "Enter", "Click"], "Jump / Retry"),
    KeyBinding::new(&["q", "Esc"], "Quit"),
];

#[derive(Debug)]
pub struct PlayApp {
    course: Course,
    ship: PlayerShip,
    recorder: FrameRecorder,
    tick_interval: Duration,
    best: u64,
    render_error: Option<RenderError>,
    exit: bool,
}

impl PlayApp {
    pub fn new(course: Course, physics: Physics, tick_interval: Duration) -> Self {
        Self {
            course,
            ship: PlayerShip::new(physics),
            recorder: FrameRecorder::new(),
            tick_interval,
            best: 0,
            render_error: None,
            exit: false,
        }
    }

    /// Returns the best score of the session, or the render error that ended it.
    pub fn finish(self) -> Result<u64, RenderError> {
        match self.render_error {
            Some(error) => Err(error),
            None => Ok(self.best),
        }
    }

    fn record_frame(&mut self) {
        if let Err(error) = self.course.draw_frame(&mut self.recorder, &self.ship) {
            self.render_error = Some(error);
            self.exit = true;
        }
    }

    fn retry(&mut self) {
        self.ship.reset();
        self.course.restart();
        self.record_frame();
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_interval(Some(self.tick_interval));
        runtime.set_render_mode(RenderMode::throttled_from_rate(FRAME_RATE));
        self.record_frame();
    }

    fn should_exit(&self) -> bool {
        self.exit
    }

    fn handle_signal(&mut self, _runtime: &mut Runtime, signal: ControlSignal) {
        match signal {
            ControlSignal::Quit => self.exit = true,
            ControlSignal::PrimaryAction if self.ship.is_alive() => self.ship.jump(),
            ControlSignal::PrimaryAction => self.retry(),
            ControlSignal::TogglePause | ControlSignal::ToggleTurbo => {}
        }
    }

    fn update(&mut self, _runtime: &mut Runtime) {
        if !self.ship.is_alive() {
            return;
        }
        let snapshot = self.course.advance();
        self.ship.update(&snapshot);
        if !self.ship.is_alive() {
            self.best = self.best.max(self.ship.score());
            self.course.halt();
        }
        self.record_frame();
    }

    fn draw(&self, frame: &mut Frame) {
        let help = HelpBar::new(BINDINGS).block(BlockWidget::bordered());
        let [scene_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(help.height())])
                .areas(frame.area());

        let title = format!("Score: {}  Best: {}", self.ship.score(), self.best);
        let scene =
            SceneCanvas::new(self.recorder.presented()).block(BlockWidget::bordered().title(title));
        frame.render_widget(scene, scene_area);
        frame.render_widget(help, help_area);

        if !self.ship.is_alive() {
            let banner = Line::styled(" GAME OVER - press Space to retry ", style::BANNER);
            let banner_area = scene_area.centered(
                Constraint::Length(u16::try_from(banner.width()).unwrap_or(u16::MAX)),
                Constraint::Length(1),
            );
            frame.render_widget(banner, banner_area);
        }
    }
}
