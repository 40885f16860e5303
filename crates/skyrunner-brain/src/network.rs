use rand::Rng;

use crate::{Genome, ShapeMismatch, Topology};

/// Output above which a network decides to jump.
pub const DECISION_THRESHOLD: f64 = 0.5;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Feed-forward network with sigmoid activation on every layer.
///
/// The network owns its genome; loading and exporting copy weights in and out
/// unchanged.
///
/// # Example
///
/// ```
/// use skyrunner_brain::{DecisionNetwork, Topology};
///
/// let topology = Topology::standard();
/// let zeros = topology.random_genome(&mut rand::rng()).map_weights(|_| 0.0);
/// let network = DecisionNetwork::new(topology, zeros).unwrap();
///
/// // Every neuron of an all-zero network outputs sigmoid(0).
/// assert_eq!(network.evaluate(&[0.0; 8]).unwrap(), 0.5);
/// assert!(!network.decide(&[0.0; 8]).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct DecisionNetwork {
    topology: Topology,
    genome: Genome,
}

impl DecisionNetwork {
    pub fn new(topology: Topology, genome: Genome) -> Result<Self, ShapeMismatch> {
        topology.check(&genome)?;
        Ok(Self { topology, genome })
    }

    pub fn random<R>(topology: Topology, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let genome = topology.random_genome(rng);
        Self { topology, genome }
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Replaces the weights. On mismatch the current weights are kept.
    pub fn load_genome(&mut self, genome: Genome) -> Result<(), ShapeMismatch> {
        self.topology.check(&genome)?;
        self.genome = genome;
        Ok(())
    }

    #[must_use]
    pub fn export_genome(&self) -> Genome {
        self.genome.clone()
    }

    /// Runs a forward pass and returns the single output in `[0, 1]`.
    pub fn evaluate(&self, inputs: &[f64]) -> Result<f64, ShapeMismatch> {
        if inputs.len() != self.topology.inputs() {
            return Err(ShapeMismatch::InputWidth {
                expected: self.topology.inputs(),
                actual: inputs.len(),
            });
        }
        let mut activations = inputs.to_vec();
        for layer in self.genome.layers() {
            // bias input
            activations.push(1.0);
            activations = layer
                .iter()
                .map(|weights| sigmoid(weights.iter().zip(&activations).map(|(w, a)| w * a).sum()))
                .collect();
        }
        Ok(activations.first().copied().unwrap_or(0.0))
    }

    /// Returns `true` when the network votes to jump.
    pub fn decide(&self, inputs: &[f64]) -> Result<bool, ShapeMismatch> {
        Ok(self.evaluate(inputs)? > DECISION_THRESHOLD)
    }
}
