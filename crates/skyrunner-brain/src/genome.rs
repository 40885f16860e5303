//! Network weights and their expected shape.
//!
//! A [`Genome`] is indexed `[layer][neuron][incoming]`. The last incoming weight of
//! every neuron is its bias, applied to a constant input of `1.0`, so a neuron in a
//! layer following `n` values holds `n + 1` weights.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::{ShapeMismatch, sensors::INPUT_WIDTH};

/// Weight tensor of one network.
///
/// Genomes are plain values: copying one into the archive or into a child never
/// shares storage with the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    layers: Vec<Vec<Vec<f64>>>,
}

impl Genome {
    #[must_use]
    pub fn from_layers(layers: Vec<Vec<Vec<f64>>>) -> Self {
        Self { layers }
    }

    #[must_use]
    pub fn layers(&self) -> &[Vec<Vec<f64>>] {
        &self.layers
    }

    #[must_use]
    pub fn into_layers(self) -> Vec<Vec<Vec<f64>>> {
        self.layers
    }

    /// Iterates over every weight in layer, neuron, incoming order.
    pub fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.layers.iter().flatten().flatten().copied()
    }

    #[must_use]
    pub fn weight_count(&self) -> usize {
        self.layers.iter().flatten().map(Vec::len).sum()
    }

    /// Returns a genome of the same shape with `f` applied to every weight.
    #[must_use]
    pub fn map_weights<F>(&self, mut f: F) -> Self
    where
        F: FnMut(f64) -> f64,
    {
        let layers = self
            .layers
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|neuron| neuron.iter().map(|&w| f(w)).collect())
                    .collect()
            })
            .collect();
        Self { layers }
    }

    /// Combines two genomes of identical shape weight by weight.
    pub fn zip_weights<F>(&self, other: &Self, mut f: F) -> Result<Self, ShapeMismatch>
    where
        F: FnMut(f64, f64) -> f64,
    {
        Topology::of(self).check(other)?;
        let layers = self
            .layers
            .iter()
            .zip(&other.layers)
            .map(|(a, b)| {
                a.iter()
                    .zip(b)
                    .map(|(a, b)| a.iter().zip(b).map(|(&a, &b)| f(a, b)).collect())
                    .collect()
            })
            .collect();
        Ok(Self { layers })
    }
}

/// Shape of a fully connected network: input width and neurons per layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    inputs: usize,
    layout: Vec<usize>,
}

impl Default for Topology {
    fn default() -> Self {
        Self::standard()
    }
}

impl Topology {
    /// Creates a topology.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` is zero, the layout is empty, or any layer is empty.
    #[must_use]
    pub fn new(inputs: usize, layout: Vec<usize>) -> Self {
        assert!(inputs > 0, "a network needs at least one input");
        assert!(!layout.is_empty(), "a network needs at least one layer");
        assert!(layout.iter().all(|&n| n > 0), "layers must not be empty");
        Self { inputs, layout }
    }

    /// The ship controller: 8 sensor inputs, two hidden layers of 4, one output.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(INPUT_WIDTH, vec![4, 4, 1])
    }

    /// Reads the shape of an existing genome. Used to compare two genomes.
    fn of(genome: &Genome) -> Self {
        Self {
            inputs: genome
                .layers
                .first()
                .and_then(|layer| layer.first())
                .map_or(0, |neuron| neuron.len().saturating_sub(1)),
            layout: genome.layers.iter().map(Vec::len).collect(),
        }
    }

    #[must_use]
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    #[must_use]
    pub fn layout(&self) -> &[usize] {
        &self.layout
    }

    #[must_use]
    pub fn outputs(&self) -> usize {
        self.layout.last().copied().unwrap_or(0)
    }

    /// `(neurons, weights per neuron)` for every layer.
    fn layer_shapes(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let fan_in = std::iter::once(self.inputs).chain(self.layout.iter().copied());
        self.layout
            .iter()
            .zip(fan_in)
            .map(|(&neurons, previous)| (neurons, previous + 1))
    }

    #[must_use]
    pub fn weight_count(&self) -> usize {
        self.layer_shapes()
            .map(|(neurons, weights)| neurons * weights)
            .sum()
    }

    /// Verifies that `genome` has exactly this topology's shape.
    pub fn check(&self, genome: &Genome) -> Result<(), ShapeMismatch> {
        if genome.layers.len() != self.layout.len() {
            return Err(ShapeMismatch::LayerCount {
                expected: self.layout.len(),
                actual: genome.layers.len(),
            });
        }
        for (layer, (neurons, (expected_neurons, expected_weights))) in
            genome.layers.iter().zip(self.layer_shapes()).enumerate()
        {
            if neurons.len() != expected_neurons {
                return Err(ShapeMismatch::NeuronCount {
                    layer,
                    expected: expected_neurons,
                    actual: neurons.len(),
                });
            }
            for (neuron, weights) in neurons.iter().enumerate() {
                if weights.len() != expected_weights {
                    return Err(ShapeMismatch::WeightCount {
                        layer,
                        neuron,
                        expected: expected_weights,
                        actual: weights.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Draws every weight independently from N(0, 1).
    pub fn random_genome<R>(&self, rng: &mut R) -> Genome
    where
        R: Rng + ?Sized,
    {
        let layers = self
            .layer_shapes()
            .map(|(neurons, weights)| {
                (0..neurons)
                    .map(|_| (0..weights).map(|_| rng.sample(StandardNormal)).collect())
                    .collect()
            })
            .collect();
        Genome { layers }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_standard_shape() {
        let topology = Topology::standard();
        assert_eq!(topology.weight_count(), 4 * 9 + 4 * 5 + 5);

        let genome = topology.random_genome(&mut Pcg32::seed_from_u64(0));
        assert_eq!(genome.layers().len(), 3);
        assert_eq!(genome.layers()[0].len(), 4);
        assert!(genome.layers()[0].iter().all(|n| n.len() == 9));
        assert!(genome.layers()[1].iter().all(|n| n.len() == 5));
        assert_eq!(genome.layers()[2].len(), 1);
        assert_eq!(genome.weight_count(), 61);
        assert!(topology.check(&genome).is_ok());
    }

    #[test]
    fn test_random_weights_look_standard_normal() {
        let topology = Topology::new(100, vec![100]);
        let genome = topology.random_genome(&mut Pcg32::seed_from_u64(7));
        #[expect(clippy::cast_precision_loss)]
        let n = genome.weight_count() as f64;
        let mean = genome.weights().sum::<f64>() / n;
        let variance = genome.weights().map(|w| (w - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.05, "mean = {mean}");
        assert!((variance - 1.0).abs() < 0.1, "variance = {variance}");
    }

    #[test]
    fn test_check_reports_first_mismatch() {
        let topology = Topology::standard();
        let mut layers = topology
            .random_genome(&mut Pcg32::seed_from_u64(1))
            .into_layers();

        layers[1][2].pop();
        assert_eq!(
            topology.check(&Genome::from_layers(layers.clone())),
            Err(ShapeMismatch::WeightCount {
                layer: 1,
                neuron: 2,
                expected: 5,
                actual: 4
            })
        );

        layers[1].pop();
        assert_eq!(
            topology.check(&Genome::from_layers(layers.clone())),
            Err(ShapeMismatch::NeuronCount {
                layer: 1,
                expected: 4,
                actual: 3
            })
        );

        layers.pop();
        assert_eq!(
            topology.check(&Genome::from_layers(layers)),
            Err(ShapeMismatch::LayerCount {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_zip_weights_requires_same_shape() {
        let mut rng = Pcg32::seed_from_u64(2);
        let a = Topology::standard().random_genome(&mut rng);
        let b = Topology::standard().random_genome(&mut rng);
        let sum = a.zip_weights(&b, |x, y| x + y).unwrap();
        for ((s, x), y) in sum.weights().zip(a.weights()).zip(b.weights()) {
            assert_eq!(s, x + y);
        }

        let small = Topology::new(8, vec![4, 1]).random_genome(&mut rng);
        assert!(a.zip_weights(&small, |x, _| x).is_err());
    }

    #[test]
    fn test_serializes_as_nested_arrays() {
        let genome = Genome::from_layers(vec![vec![vec![0.5, -1.0]]]);
        assert_eq!(serde_json::to_string(&genome).unwrap(), "[[[0.5,-1.0]]]");
        let back: Genome = serde_json::from_str("[[[0.5,-1.0]]]").unwrap();
        assert_eq!(back, genome);
    }
}
