//! A network-controlled ship being evaluated for fitness.
//!
//! Each tick an alive agent earns the survival reward, dies if its bounding box
//! touches an obstacle, and otherwise senses the field, lets its network decide
//! whether to jump, and integrates physics. Leaving the viable band kills it with
//! the out-of-bounds penalty. Dead agents are frozen: their score and position stay
//! readable until the agent is reset or discarded.
//!
//! Agents are advanced in parallel. Sensing and the network decision run without
//! holding the agent's lock; the resulting state change is committed under a
//! single write guard, so a reader (the renderer) always sees a complete tick.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::Rng;
use serde::{Deserialize, Serialize};
use skyrunner_brain::{DecisionNetwork, Genome, ShapeMismatch, Topology, sensors};
use skyrunner_engine::{
    BandExit, Drawable, FieldSnapshot, Physics, RenderError, Renderer, ShipBody, Sprite,
};

/// Score changes applied during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scoring {
    /// Added every tick an agent is alive.
    pub survival_reward: i64,
    /// Subtracted when an agent hits an obstacle.
    pub collision_penalty: i64,
    /// Subtracted when an agent leaves the viable band.
    pub out_of_bounds_penalty: i64,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            survival_reward: 1,
            collision_penalty: 0,
            out_of_bounds_penalty: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum AgentStatus {
    Alive,
    /// Hit an obstacle.
    Crashed,
    /// Left the viable band.
    OutOfBounds(BandExit),
    /// Stopped by the generation tick limit.
    Retired,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentState {
    pub ship: ShipBody,
    pub score: i64,
    pub status: AgentStatus,
}

impl AgentState {
    fn new() -> Self {
        Self {
            ship: ShipBody::new(),
            score: 0,
            status: AgentStatus::Alive,
        }
    }
}

/// Number of distinct agent skins.
pub const AGENT_VARIANTS: u8 = 5;

#[derive(Debug)]
pub struct Agent {
    network: DecisionNetwork,
    variant: u8,
    state: RwLock<AgentState>,
}

impl Agent {
    /// Creates an agent flying `genome` with the standard sensor topology.
    pub fn new(genome: Genome, variant: u8) -> Result<Self, ShapeMismatch> {
        let network = DecisionNetwork::new(Topology::standard(), genome)?;
        Ok(Self::with_network(network, variant))
    }

    /// Creates an agent with N(0, 1) weights.
    pub fn random<R>(rng: &mut R, variant: u8) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::with_network(DecisionNetwork::random(Topology::standard(), rng), variant)
    }

    fn with_network(network: DecisionNetwork, variant: u8) -> Self {
        Self {
            network,
            variant: variant % AGENT_VARIANTS,
            state: RwLock::new(AgentState::new()),
        }
    }

    // Every write replaces the state under one guard, so a poisoned lock still
    // holds a complete tick.
    fn read(&self) -> RwLockReadGuard<'_, AgentState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AgentState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> AgentState {
        *self.read()
    }

    #[must_use]
    pub fn score(&self) -> i64 {
        self.read().score
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.read().status.is_alive()
    }

    #[must_use]
    pub fn variant(&self) -> u8 {
        self.variant
    }

    #[must_use]
    pub fn network(&self) -> &DecisionNetwork {
        &self.network
    }

    #[must_use]
    pub fn export_genome(&self) -> Genome {
        self.network.export_genome()
    }

    /// Advances the agent by one tick. Does nothing once the agent is dead.
    pub fn advance(&self, field: &FieldSnapshot, physics: &Physics, scoring: &Scoring) {
        let ship = {
            let state = self.read();
            if !state.status.is_alive() {
                return;
            }
            state.ship
        };

        if field.rect_overlaps_any(&ship.bounding_box()) {
            let mut state = self.write();
            state.score += scoring.survival_reward - scoring.collision_penalty;
            state.status = AgentStatus::Crashed;
            return;
        }

        let inputs = sensors::sense(&ship, field);
        // The standard topology takes exactly the sensor vector.
        let jump = self.network.decide(&inputs).unwrap_or(false);

        let mut state = self.write();
        state.score += scoring.survival_reward;
        if jump {
            state.ship.jump(physics);
        }
        state.ship.integrate(physics);
        if let Some(exit) = state.ship.band_exit() {
            state.score -= scoring.out_of_bounds_penalty;
            state.status = AgentStatus::OutOfBounds(exit);
        }
    }

    /// Stops a surviving agent without any penalty.
    pub fn retire(&self) {
        let mut state = self.write();
        if state.status.is_alive() {
            state.status = AgentStatus::Retired;
        }
    }

    /// Returns the agent to the start position with a zero score.
    pub fn reset(&self) {
        *self.write() = AgentState::new();
    }

    #[cfg(test)]
    pub(crate) fn force_state(&self, score: i64, status: AgentStatus) {
        let mut state = self.write();
        state.score = score;
        state.status = status;
    }
}

impl Drawable for Agent {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        let state = self.state();
        if !state.status.is_alive() {
            return Ok(());
        }
        renderer.draw_sprite(
            Sprite::Agent {
                variant: self.variant,
            },
            state.ship.screen_rect(),
        )
    }
}
