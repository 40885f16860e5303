use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Circle, Rect, Vec2},
    render::{Drawable, RenderError, Renderer, ScreenRect, Sprite},
};

/// Horizontal coordinate at which new obstacles enter, well past the visible edge.
pub const SPAWN_X: f64 = 2000.0;

/// Spawn heights are drawn uniformly from `0..SPAWN_HEIGHT_RANGE`.
pub const SPAWN_HEIGHT_RANGE: u32 = 786;

/// A single obstacle moving from right to left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    x: f64,
    y: f64,
    radius: f64,
    speed: f64,
    spawned_at: u64,
}

impl Obstacle {
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Field tick during which this obstacle was spawned.
    #[must_use]
    pub fn spawned_at(&self) -> u64 {
        self.spawned_at
    }

    #[must_use]
    pub fn circle(&self) -> Circle {
        Circle::new(Vec2::new(self.x, self.y), self.radius)
    }

    fn advanced(self) -> Self {
        Self {
            x: self.x - self.speed,
            ..self
        }
    }

    /// Returns `true` once the obstacle has fully left the field on the near side.
    #[must_use]
    pub fn is_past_near_edge(&self) -> bool {
        self.x + 2.0 * self.radius <= 0.0
    }

    fn screen_rect(&self) -> ScreenRect {
        let diameter = 2.0 * self.radius;
        ScreenRect::from_world(&Rect::centered(
            Vec2::new(self.x, self.y),
            diameter,
            diameter,
        ))
    }
}

/// How radius and speed are chosen for newly spawned obstacles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ObstacleSizing {
    /// Every obstacle has the same radius and speed.
    #[default]
    Fixed,
    /// Size class `s` in `1..=5`: radius `20 + 10s`, speed `10 - s` (big ones are slow).
    Varied,
}

impl ObstacleSizing {
    pub const FIXED_RADIUS: f64 = 50.0;
    pub const FIXED_SPEED: f64 = 9.0;

    /// Returns `(radius, speed)` for the next obstacle.
    pub fn sample<R>(self, rng: &mut R) -> (f64, f64)
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Fixed => (Self::FIXED_RADIUS, Self::FIXED_SPEED),
            Self::Varied => {
                let size = f64::from(rng.random_range(1..=5_u8));
                (20.0 + 10.0 * size, 10.0 - size)
            }
        }
    }
}

#[derive(Debug)]
struct FieldState {
    obstacles: Arc<[Obstacle]>,
    ticks: u64,
}

impl FieldState {
    fn new() -> Self {
        Self {
            obstacles: Arc::from(Vec::new()),
            ticks: 0,
        }
    }
}

/// The shared set of active obstacles.
///
/// The field is designed to be shared (`Arc<ObstacleField>`) between the simulation
/// tick, a spawn timer and any number of readers. The active set is an immutable
/// `Arc<[Obstacle]>` that writers replace wholesale under the write lock, so a
/// [`FieldSnapshot`] always sees one complete committed state.
///
/// # Example
///
/// ```
/// use skyrunner_engine::{ObstacleField, ObstacleSizing, Vec2};
///
/// let field = ObstacleField::new(ObstacleSizing::Fixed);
/// field.spawn_at(500.0, 300.0, 50.0, 9.0);
/// assert!(field.point_in_any(Vec2::new(500.0, 300.0)));
///
/// field.advance();
/// assert_eq!(field.snapshot().obstacles()[0].x(), 491.0);
/// ```
#[derive(Debug)]
pub struct ObstacleField {
    sizing: ObstacleSizing,
    state: RwLock<FieldState>,
}

impl Default for ObstacleField {
    fn default() -> Self {
        Self::new(ObstacleSizing::default())
    }
}

impl ObstacleField {
    #[must_use]
    pub fn new(sizing: ObstacleSizing) -> Self {
        Self {
            sizing,
            state: RwLock::new(FieldState::new()),
        }
    }

    #[must_use]
    pub fn sizing(&self) -> ObstacleSizing {
        self.sizing
    }

    // Writers replace the whole state in one assignment, so a poisoned lock
    // still guards a consistent value.
    fn read(&self) -> RwLockReadGuard<'_, FieldState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FieldState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawns an obstacle at the entry edge with a random height.
    pub fn spawn<R>(&self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let (radius, speed) = self.sizing.sample(rng);
        let y = f64::from(rng.random_range(0..SPAWN_HEIGHT_RANGE));
        self.spawn_at(SPAWN_X, y, radius, speed);
    }

    /// Spawns an obstacle with explicit position, radius and speed.
    pub fn spawn_at(&self, x: f64, y: f64, radius: f64, speed: f64) {
        let mut state = self.write();
        let obstacle = Obstacle {
            x,
            y,
            radius,
            speed,
            spawned_at: state.ticks,
        };
        let mut obstacles = state.obstacles.to_vec();
        obstacles.push(obstacle);
        state.obstacles = obstacles.into();
    }

    /// Moves every obstacle by its speed and prunes those past the near edge.
    pub fn advance(&self) {
        let mut state = self.write();
        let obstacles: Vec<Obstacle> = state
            .obstacles
            .iter()
            .map(|obstacle| obstacle.advanced())
            .filter(|obstacle| !obstacle.is_past_near_edge())
            .collect();
        state.obstacles = obstacles.into();
        state.ticks += 1;
    }

    /// Removes every obstacle and rewinds the tick counter.
    pub fn reset(&self) {
        *self.write() = FieldState::new();
    }

    /// Returns the latest committed state.
    #[must_use]
    pub fn snapshot(&self) -> FieldSnapshot {
        let state = self.read();
        FieldSnapshot {
            obstacles: Arc::clone(&state.obstacles),
            ticks: state.ticks,
        }
    }

    /// Number of ticks since the last reset.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.read().ticks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().obstacles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// See [`FieldSnapshot::point_in_any`].
    #[must_use]
    pub fn point_in_any(&self, point: Vec2) -> bool {
        self.snapshot().point_in_any(point)
    }

    /// See [`FieldSnapshot::rect_overlaps_any`].
    #[must_use]
    pub fn rect_overlaps_any(&self, rect: &Rect) -> bool {
        self.snapshot().rect_overlaps_any(rect)
    }
}

impl Drawable for ObstacleField {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        self.snapshot().draw(renderer)
    }
}

/// Immutable view of the active obstacles at one point in time.
#[derive(Debug, Clone)]
pub struct FieldSnapshot {
    obstacles: Arc<[Obstacle]>,
    ticks: u64,
}

impl FieldSnapshot {
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns `true` if `point` falls within any obstacle's collision circle.
    ///
    /// Used for sensing, never for lethal collisions.
    #[must_use]
    pub fn point_in_any(&self, point: Vec2) -> bool {
        self.obstacles()
            .iter()
            .any(|obstacle| obstacle.circle().contains(point))
    }

    /// Returns `true` if `rect` intersects any obstacle's collision circle.
    ///
    /// Every obstacle is tested in parallel and the results are OR-reduced; the call
    /// returns only after all tests have joined.
    #[must_use]
    pub fn rect_overlaps_any(&self, rect: &Rect) -> bool {
        let polygon = rect.to_polygon();
        self.obstacles()
            .par_iter()
            .any(|obstacle| polygon.intersects_circle(&obstacle.circle()))
    }
}

impl Drawable for FieldSnapshot {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        for obstacle in self.obstacles() {
            renderer.draw_sprite(Sprite::Obstacle, obstacle.screen_rect())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{FIELD_WIDTH, FrameRecorder};

    #[test]
    fn test_obstacle_advances_by_speed_each_tick() {
        let field = ObstacleField::default();
        field.spawn_at(FIELD_WIDTH, 300.0, 50.0, 9.0);
        for n in 1..=20 {
            field.advance();
            let snapshot = field.snapshot();
            assert_eq!(snapshot.obstacles()[0].x(), FIELD_WIDTH - 9.0 * f64::from(n));
        }
    }

    #[test]
    fn test_obstacle_pruned_after_leaving_near_edge() {
        let field = ObstacleField::default();
        field.spawn_at(FIELD_WIDTH, 300.0, 50.0, 9.0);

        // x + 2r <= 0 first holds once x <= -100, i.e. after ceil(1124 / 9) = 125 ticks.
        for _ in 0..124 {
            field.advance();
        }
        assert_eq!(field.len(), 1);
        field.advance();
        assert!(field.is_empty());

        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            let x = rng.random_range(-500.0..2500.0);
            let y = rng.random_range(-500.0..1500.0);
            let rect = Rect::centered(Vec2::new(x, y), 400.0, 400.0);
            assert!(!field.rect_overlaps_any(&rect));
        }
        assert!(!field.rect_overlaps_any(&Rect::centered(
            Vec2::new(-100.0, 300.0),
            50.0,
            50.0
        )));
    }

    #[test]
    fn test_spawn_uses_entry_edge_and_sizing() {
        let field = ObstacleField::new(ObstacleSizing::Fixed);
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..50 {
            field.spawn(&mut rng);
        }
        for obstacle in field.snapshot().obstacles() {
            assert_eq!(obstacle.x(), SPAWN_X);
            assert_eq!(obstacle.radius(), 50.0);
            assert_eq!(obstacle.speed(), 9.0);
            assert!((0.0..f64::from(SPAWN_HEIGHT_RANGE)).contains(&obstacle.y()));
        }
    }

    #[test]
    fn test_varied_sizing_trades_size_for_speed() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..100 {
            let (radius, speed) = ObstacleSizing::Varied.sample(&mut rng);
            assert!((30.0..=70.0).contains(&radius));
            assert_eq!(radius / 10.0 - 2.0, 10.0 - speed);
        }
    }

    #[test]
    fn test_spawn_records_field_tick() {
        let field = ObstacleField::default();
        field.advance();
        field.advance();
        field.spawn_at(SPAWN_X, 100.0, 50.0, 9.0);
        assert_eq!(field.snapshot().obstacles()[0].spawned_at(), 2);
    }

    #[test]
    fn test_point_in_any() {
        let field = ObstacleField::default();
        field.spawn_at(500.0, 300.0, 50.0, 9.0);
        assert!(field.point_in_any(Vec2::new(540.0, 300.0)));
        assert!(!field.point_in_any(Vec2::new(560.0, 300.0)));
    }

    #[test]
    fn test_reset_clears_obstacles_and_ticks() {
        let field = ObstacleField::default();
        field.spawn_at(500.0, 300.0, 50.0, 9.0);
        field.advance();
        field.reset();
        assert!(field.is_empty());
        assert_eq!(field.ticks(), 0);
    }

    #[test]
    fn test_snapshot_unaffected_by_later_writes() {
        let field = ObstacleField::default();
        field.spawn_at(500.0, 300.0, 50.0, 9.0);
        let snapshot = field.snapshot();
        field.advance();
        field.reset();
        assert_eq!(snapshot.obstacles().len(), 1);
        assert_eq!(snapshot.obstacles()[0].x(), 500.0);
    }

    #[test]
    fn test_readers_never_observe_partial_advance() {
        // All obstacles move and leave together, so every committed state has them
        // at one common x, and either all of them or none.
        const COUNT: usize = 8;
        let field = Arc::new(ObstacleField::default());
        for i in 0..8_u8 {
            field.spawn_at(1000.0, 100.0 + f64::from(i) * 60.0, 5.0, 3.0);
        }
        let writer = {
            let field = Arc::clone(&field);
            thread::spawn(move || {
                for _ in 0..400 {
                    field.advance();
                }
            })
        };
        for _ in 0..2000 {
            let snapshot = field.snapshot();
            let obstacles = snapshot.obstacles();
            assert!(obstacles.is_empty() || obstacles.len() == COUNT);
            assert!(obstacles.windows(2).all(|pair| pair[0].x() == pair[1].x()));
        }
        writer.join().unwrap();
        assert!(field.is_empty());
    }

    #[test]
    fn test_draws_one_sprite_per_obstacle() {
        let field = ObstacleField::default();
        field.spawn_at(500.0, 300.0, 50.0, 9.0);
        field.spawn_at(800.0, 100.0, 50.0, 9.0);

        let mut recorder = FrameRecorder::new();
        recorder.clear().unwrap();
        field.draw(&mut recorder).unwrap();
        recorder.present().unwrap();

        let frame = recorder.presented();
        assert_eq!(frame.len(), 2);
        assert!(frame.iter().all(|call| call.sprite == Sprite::Obstacle));
        assert_eq!(
            frame[0].dest,
            ScreenRect {
                x: 450,
                y: 418,
                width: 100,
                height: 100
            }
        );
    }
}
