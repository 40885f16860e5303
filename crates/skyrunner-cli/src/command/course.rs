use std::{io, sync::Arc, time::Duration};

use skyrunner_engine::{
    Drawable, FieldSnapshot, ObstacleField, ObstacleSizing, ObstacleSpawner, RenderError, Renderer,
    ScreenRect, Sprite,
};

/// An obstacle field with its own wall-clock spawner, for single-ship modes.
#[derive(Debug)]
pub struct Course {
    field: Arc<ObstacleField>,
    spawner: ObstacleSpawner,
}

impl Course {
    pub fn start(sizing: ObstacleSizing, spawn_interval: Duration, seed: u64) -> io::Result<Self> {
        let field = Arc::new(ObstacleField::new(sizing));
        let spawner = ObstacleSpawner::start(Arc::clone(&field), spawn_interval, seed)?;
        Ok(Self { field, spawner })
    }

    /// Moves every obstacle one tick and returns the resulting state.
    pub fn advance(&self) -> FieldSnapshot {
        self.field.advance();
        self.field.snapshot()
    }

    /// Stops spawning until the next [`restart`](Self::restart).
    pub fn halt(&self) {
        self.spawner.set_paused(true);
    }

    /// Empties the field and starts spawning again.
    pub fn restart(&self) {
        self.field.reset();
        self.spawner.set_paused(false);
    }

    /// Draws one frame: background, obstacles, then `ship`.
    pub fn draw_frame(
        &self,
        renderer: &mut dyn Renderer,
        ship: &dyn Drawable,
    ) -> Result<(), RenderError> {
        renderer.clear()?;
        renderer.draw_sprite(Sprite::Background, ScreenRect::FIELD)?;
        self.field.draw(renderer)?;
        ship.draw(renderer)?;
        renderer.present()
    }
}
