//! Rendering collaborator boundary.
//!
//! The simulation never depends on rendering: scene members describe themselves
//! as a sequence of sprite draws into a [`Renderer`], and whatever sits behind the
//! trait (a terminal canvas, a recorder in tests) decides how to show them.
//!
//! A frame is always `clear` → `draw_sprite`* → `present`, drawn back to front:
//! background, then obstacles, then ships.
//!
//! Scene members implementing [`Drawable`] are the [`ObstacleField`], the
//! [`PlayerShip`] and the training agents.
//!
//! [`ObstacleField`]: crate::ObstacleField
//! [`PlayerShip`]: crate::PlayerShip

use std::mem;

use crate::{FIELD_HEIGHT, FIELD_WIDTH, geometry::Rect};

/// Texture handle understood by every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Background,
    Obstacle,
    /// A training agent; `variant` selects one of several ship skins.
    Agent {
        variant: u8,
    },
    /// The player-controlled ship; `frame` is the animation frame.
    Player {
        frame: u8,
    },
}

/// Destination rectangle in screen space (top-left origin, `y` growing downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRect {
    /// The whole visible field.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const FIELD: Self = Self {
        x: 0,
        y: 0,
        width: FIELD_WIDTH as u32,
        height: FIELD_HEIGHT as u32,
    };

    /// Converts a world-space rectangle to screen space, rounding to whole units.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_world(rect: &Rect) -> Self {
        Self {
            x: rect.origin.x.round() as i32,
            y: (FIELD_HEIGHT - rect.top()).round() as i32,
            width: rect.width.round().max(0.0) as u32,
            height: rect.height.round().max(0.0) as u32,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RenderError {
    #[display("sprite drawn or frame presented without a preceding clear")]
    NoFrameInProgress,
    #[display("rendering surface unavailable: {reason}")]
    SurfaceUnavailable { reason: String },
}

/// Draw-call sink for one frame at a time.
pub trait Renderer {
    /// Starts a new frame, discarding anything not yet presented.
    fn clear(&mut self) -> Result<(), RenderError>;

    /// Queues `sprite` to be drawn into `dest`.
    fn draw_sprite(&mut self, sprite: Sprite, dest: ScreenRect) -> Result<(), RenderError>;

    /// Publishes the frame started by the last [`clear`](Self::clear).
    fn present(&mut self) -> Result<(), RenderError>;
}

/// Anything that can issue its own draw calls into an open frame.
pub trait Drawable {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub sprite: Sprite,
    pub dest: ScreenRect,
}

/// A [`Renderer`] that keeps the draw calls of the last presented frame.
///
/// The simulation thread draws into the recorder after every tick; a display layer
/// reads [`presented`](Self::presented) whenever it repaints. Frames that were
/// cleared but never presented are not visible to readers.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pending: Option<Vec<DrawCall>>,
    presented: Vec<DrawCall>,
    frames: u64,
}

impl FrameRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw calls of the most recently presented frame, in draw order.
    #[must_use]
    pub fn presented(&self) -> &[DrawCall] {
        &self.presented
    }

    /// Number of frames presented so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for FrameRecorder {
    fn clear(&mut self) -> Result<(), RenderError> {
        let mut pending = self.pending.take().unwrap_or_default();
        pending.clear();
        self.pending = Some(pending);
        Ok(())
    }

    fn draw_sprite(&mut self, sprite: Sprite, dest: ScreenRect) -> Result<(), RenderError> {
        self.pending
            .as_mut()
            .ok_or(RenderError::NoFrameInProgress)?
            .push(DrawCall { sprite, dest });
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let mut frame = self.pending.take().ok_or(RenderError::NoFrameInProgress)?;
        mem::swap(&mut self.presented, &mut frame);
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    #[test]
    fn test_from_world_flips_y() {
        let rect = Rect::new(Vec2::new(10.0, 700.0), 20.0, 30.0);
        let screen = ScreenRect::from_world(&rect);
        assert_eq!(
            screen,
            ScreenRect {
                x: 10,
                y: 38,
                width: 20,
                height: 30
            }
        );
    }

    #[test]
    fn test_recorder_publishes_on_present() {
        let mut recorder = FrameRecorder::new();
        recorder.clear().unwrap();
        recorder
            .draw_sprite(Sprite::Background, ScreenRect::FIELD)
            .unwrap();
        assert!(recorder.presented().is_empty());

        recorder.present().unwrap();
        assert_eq!(recorder.frames(), 1);
        assert_eq!(recorder.presented().len(), 1);
        assert_eq!(recorder.presented()[0].sprite, Sprite::Background);
    }

    #[test]
    fn test_recorder_rejects_draw_without_clear() {
        let mut recorder = FrameRecorder::new();
        assert!(matches!(
            recorder.draw_sprite(Sprite::Obstacle, ScreenRect::FIELD),
            Err(RenderError::NoFrameInProgress)
        ));
        assert!(matches!(
            recorder.present(),
            Err(RenderError::NoFrameInProgress)
        ));
    }

    #[test]
    fn test_recorder_keeps_previous_frame_until_next_present() {
        let mut recorder = FrameRecorder::new();
        recorder.clear().unwrap();
        recorder.draw_sprite(Sprite::Obstacle, ScreenRect::FIELD).unwrap();
        recorder.present().unwrap();

        recorder.clear().unwrap();
        assert_eq!(recorder.presented().len(), 1);
        recorder.present().unwrap();
        assert!(recorder.presented().is_empty());
    }
}
