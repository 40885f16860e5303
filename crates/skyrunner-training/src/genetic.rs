//! Genetic operators over network genomes.
//!
//! All operators work weight by weight on genomes of one fixed [`Topology`] and
//! return a fresh genome; parents are never modified.
//!
//! # Operators
//!
//! ## Uniform crossover
//!
//! Every weight of the child is copied from one of the two parents, each with
//! probability 0.5. Genomes of the same topology line up weight for weight, so no
//! repair step is needed.
//!
//! ## Multiplicative mutation
//!
//! With probability `rate` a weight is scaled by a factor drawn uniformly from
//! `[0.5, 1.5)`. Scaling never flips a sign, so mutation refines the magnitude of
//! a connection without turning an excitatory one inhibitory.
//!
//! ## Sign inversion
//!
//! With probability `rate` a weight is negated. Not part of the default breeding
//! policy, which relies on crossover and mutation only.
//!
//! # Errors
//!
//! Every operator first checks its inputs against the operators' topology and
//! fails with [`ShapeMismatch`] instead of producing a malformed child.

use rand::Rng;
use skyrunner_brain::{Genome, ShapeMismatch, Topology};

#[derive(Debug, Clone, Default)]
pub struct GeneticOperators {
    topology: Topology,
}

impl GeneticOperators {
    #[must_use]
    pub fn new(topology: Topology) -> Self {
        Self { topology }
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Draws a new genome with N(0, 1) weights.
    pub fn random_genome<R>(&self, rng: &mut R) -> Genome
    where
        R: Rng + ?Sized,
    {
        self.topology.random_genome(rng)
    }

    /// Uniform crossover of two parents.
    pub fn crossover<R>(&self, a: &Genome, b: &Genome, rng: &mut R) -> Result<Genome, ShapeMismatch>
    where
        R: Rng + ?Sized,
    {
        self.topology.check(a)?;
        self.topology.check(b)?;
        a.zip_weights(b, |x, y| if rng.random_bool(0.5) { x } else { y })
    }

    /// Scales each weight by `U[0.5, 1.5)` with probability `rate`.
    ///
    /// `rate` is clamped to `[0, 1]`; a NaN or infinite rate mutates nothing.
    pub fn mutate<R>(&self, base: &Genome, rate: f64, rng: &mut R) -> Result<Genome, ShapeMismatch>
    where
        R: Rng + ?Sized,
    {
        self.topology.check(base)?;
        let rate = probability(rate);
        Ok(base.map_weights(|w| {
            if rng.random_bool(rate) {
                w * (rng.random::<f64>() + 0.5)
            } else {
                w
            }
        }))
    }

    /// Negates each weight with probability `rate`, treated like the rate of
    /// [`mutate`](Self::mutate).
    pub fn invert_sign<R>(
        &self,
        base: &Genome,
        rate: f64,
        rng: &mut R,
    ) -> Result<Genome, ShapeMismatch>
    where
        R: Rng + ?Sized,
    {
        self.topology.check(base)?;
        let rate = probability(rate);
        Ok(base.map_weights(|w| if rng.random_bool(rate) { -w } else { w }))
    }
}

/// Clamps `rate` into a probability; non-finite rates become 0.
fn probability(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
