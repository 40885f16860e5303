use serde::{Deserialize, Serialize};

use crate::{
    FIELD_HEIGHT,
    geometry::{Rect, Vec2},
    obstacle_field::FieldSnapshot,
    render::{Drawable, RenderError, Renderer, ScreenRect, Sprite},
};

/// Fixed horizontal position of every ship.
pub const SHIP_X: f64 = 15.0;
/// Height at which ships start.
pub const SHIP_START_HEIGHT: f64 = 600.0;
pub const SHIP_WIDTH: f64 = 50.0;
pub const SHIP_HEIGHT: f64 = 43.0;

/// Constants of ship motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Physics {
    /// Downward acceleration applied every tick.
    pub gravity: f64,
    /// Upward velocity set by a jump.
    pub jump_velocity: f64,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            gravity: 0.1,
            jump_velocity: 5.0,
        }
    }
}

/// Side of the viable vertical band a ship left through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum BandExit {
    Above,
    Below,
}

/// Kinematic state of a ship. Velocity is positive upwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipBody {
    height: f64,
    velocity: f64,
}

impl Default for ShipBody {
    fn default() -> Self {
        Self::new()
    }
}

impl ShipBody {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            height: SHIP_START_HEIGHT,
            velocity: 0.0,
        }
    }

    #[must_use]
    pub const fn with_state(height: f64, velocity: f64) -> Self {
        Self { height, velocity }
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        Vec2::new(SHIP_X, self.height)
    }

    /// Collision box centred on the ship's position.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        Rect::centered(self.position(), SHIP_WIDTH, SHIP_HEIGHT)
    }

    /// Instantaneous upward impulse; replaces the current velocity.
    pub fn jump(&mut self, physics: &Physics) {
        self.velocity = physics.jump_velocity;
    }

    /// Moves by the current velocity, then applies gravity.
    pub fn integrate(&mut self, physics: &Physics) {
        self.height += self.velocity;
        self.velocity -= physics.gravity;
    }

    /// Returns which side of the viable band the ship has left, if any.
    ///
    /// The band spans from one ship height above the floor up to the top of the field.
    #[must_use]
    pub fn band_exit(&self) -> Option<BandExit> {
        if self.height > FIELD_HEIGHT {
            Some(BandExit::Above)
        } else if self.height < SHIP_HEIGHT {
            Some(BandExit::Below)
        } else {
            None
        }
    }

    #[must_use]
    pub fn screen_rect(&self) -> ScreenRect {
        ScreenRect::from_world(&self.bounding_box())
    }
}

const ANIMATION_FRAMES: u64 = 4;
const TICKS_PER_FRAME: u64 = 10;

/// The manually controlled ship of interactive play.
///
/// Unlike training agents it has no score penalties: the score is simply the
/// number of ticks survived.
#[derive(Debug, Clone)]
pub struct PlayerShip {
    body: ShipBody,
    physics: Physics,
    alive: bool,
    ticks: u64,
}

impl PlayerShip {
    #[must_use]
    pub fn new(physics: Physics) -> Self {
        Self {
            body: ShipBody::new(),
            physics,
            alive: true,
            ticks: 0,
        }
    }

    #[must_use]
    pub fn body(&self) -> &ShipBody {
        &self.body
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Ticks survived since the last reset.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.ticks
    }

    pub fn jump(&mut self) {
        if self.alive {
            self.body.jump(&self.physics);
        }
    }

    /// Advances one tick against the given field state.
    pub fn update(&mut self, field: &FieldSnapshot) {
        if !self.alive {
            return;
        }
        if field.rect_overlaps_any(&self.body.bounding_box()) {
            self.alive = false;
            return;
        }
        self.ticks += 1;
        self.body.integrate(&self.physics);
        if self.body.band_exit().is_some() {
            self.alive = false;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.physics);
    }
}

impl Drawable for PlayerShip {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        #[expect(clippy::cast_possible_truncation)]
        let frame = (self.ticks / TICKS_PER_FRAME % ANIMATION_FRAMES) as u8;
        renderer.draw_sprite(Sprite::Player { frame }, self.body.screen_rect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObstacleField;

    #[test]
    fn test_integrate_moves_then_accelerates() {
        let physics = Physics::default();
        let mut body = ShipBody::with_state(600.0, 1.0);
        body.integrate(&physics);
        assert_eq!(body.height(), 601.0);
        assert!((body.velocity() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_jump_replaces_velocity() {
        let physics = Physics::default();
        let mut body = ShipBody::with_state(600.0, -3.0);
        body.jump(&physics);
        assert_eq!(body.velocity(), 5.0);
    }

    #[test]
    fn test_band_exit() {
        assert_eq!(ShipBody::with_state(768.5, 0.0).band_exit(), Some(BandExit::Above));
        assert_eq!(ShipBody::with_state(42.9, 0.0).band_exit(), Some(BandExit::Below));
        assert_eq!(ShipBody::with_state(768.0, 0.0).band_exit(), None);
        assert_eq!(ShipBody::with_state(43.0, 0.0).band_exit(), None);
    }

    #[test]
    fn test_free_fall_leaves_band_below() {
        let field = ObstacleField::default();
        let mut ship = PlayerShip::new(Physics::default());
        let mut ticks = 0;
        while ship.is_alive() {
            ship.update(&field.snapshot());
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert!(ship.body().band_exit().unwrap().is_below());
        assert_eq!(ship.score(), ticks);
    }

    #[test]
    fn test_collision_kills_without_moving() {
        let field = ObstacleField::default();
        field.spawn_at(SHIP_X, SHIP_START_HEIGHT, 50.0, 9.0);
        let mut ship = PlayerShip::new(Physics::default());
        ship.update(&field.snapshot());
        assert!(!ship.is_alive());
        assert_eq!(ship.score(), 0);
        assert_eq!(ship.body().height(), SHIP_START_HEIGHT);

        ship.jump();
        assert_eq!(ship.body().velocity(), 0.0);
        ship.reset();
        assert!(ship.is_alive());
    }
}
