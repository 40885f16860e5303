//! Decision making for skyrunner ships.
//!
//! A ship's behaviour is a small fixed-topology feed-forward network whose weights
//! (the [`Genome`]) are the only thing evolved during training.
//!
//! # Architecture
//!
//! ```text
//! FieldSnapshot + ShipBody
//!     ↓ sense()
//! 8 inputs: height, velocity, 6 ray distances
//!     ↓ DecisionNetwork::evaluate()
//! 4 sigmoid → 4 sigmoid → 1 sigmoid
//!     ↓ > 0.5
//! jump / no jump
//! ```
//!
//! # Modules
//!
//! - [`genome`] - The weight tensor and the [`Topology`] it must match
//! - [`network`] - Forward evaluation
//! - [`sensors`] - Ray-cast sensing of the obstacle field
//!
//! Every network evaluation is a pure function of the genome and the inputs; the
//! same genome always produces the same decisions for the same field state.

pub use self::{
    genome::{Genome, Topology},
    network::DecisionNetwork,
};

pub mod genome;
pub mod network;
pub mod sensors;

/// A genome or an input vector does not fit the network topology.
///
/// Returned by every operation that combines genomes with a [`Topology`]. The
/// offending value is never coerced into shape.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeMismatch {
    #[display("expected {expected} inputs, got {actual}")]
    InputWidth { expected: usize, actual: usize },
    #[display("expected {expected} layers, got {actual}")]
    LayerCount { expected: usize, actual: usize },
    #[display("layer {layer}: expected {expected} neurons, got {actual}")]
    NeuronCount {
        layer: usize,
        expected: usize,
        actual: usize,
    },
    #[display("layer {layer}, neuron {neuron}: expected {expected} weights, got {actual}")]
    WeightCount {
        layer: usize,
        neuron: usize,
        expected: usize,
        actual: usize,
    },
}
