//! Simulation engine for the skyrunner obstacle course.
//!
//! This crate owns everything that moves on the field and everything that can
//! be drawn:
//!
//! - [`geometry`] - Points, circles, rectangles and the circle vs convex polygon test
//! - [`ObstacleField`] - Shared set of obstacles, advanced once per tick and queried
//!   concurrently through immutable [`FieldSnapshot`]s
//! - [`ObstacleSpawner`] - Wall-clock spawn timer running on its own thread
//! - [`ShipBody`] / [`PlayerShip`] - Ship physics (gravity, jump impulse, viable band)
//! - [`render`] - The [`Renderer`] collaborator and the [`Drawable`] capability
//!
//! # Coordinates
//!
//! The field is [`FIELD_WIDTH`] × [`FIELD_HEIGHT`] world units with the origin at the
//! bottom-left corner and `y` growing upwards. Screen rectangles handed to a
//! [`Renderer`] use the usual top-left origin; [`ScreenRect::from_world`] does the flip.
//!
//! # Example
//!
//! ```
//! use skyrunner_engine::{ObstacleField, ObstacleSizing, PlayerShip, Physics};
//!
//! let field = ObstacleField::new(ObstacleSizing::default());
//! field.spawn_at(100.0, 200.0, 50.0, 9.0);
//!
//! let mut ship = PlayerShip::new(Physics::default());
//! for _ in 0..10 {
//!     field.advance();
//!     ship.update(&field.snapshot());
//! }
//! assert!(ship.is_alive());
//! ```

pub use self::{
    geometry::{Circle, ConvexPolygon, Rect, Vec2},
    obstacle_field::*,
    render::{DrawCall, Drawable, FrameRecorder, RenderError, Renderer, ScreenRect, Sprite},
    ship::*,
    spawner::*,
};

pub mod geometry;
mod obstacle_field;
pub mod render;
mod ship;
mod spawner;

/// Width of the visible field in world units.
pub const FIELD_WIDTH: f64 = 1024.0;

/// Height of the visible field in world units.
pub const FIELD_HEIGHT: f64 = 768.0;
