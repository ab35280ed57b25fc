//! Rumor distortion.
//!
//! Before retelling, a node may garble one detail of the rumor. The more
//! conflicting versions it has heard, the likelier that becomes:
//!
//! ```text
//! P(H) = 1 / (exp((H_max - H) * K / H_max) + 1)
//! ```
//!
//! `K` is the conservation factor: high values keep confident nodes faithful.

use crate::error::ModelError;
use crate::rumor::{Rumor, RUMOR_BITS};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Probability that a node with memory entropy `entropy` distorts a rumor.
pub fn distortion_probability(entropy: f64, max_entropy: f64, conservation: f64) -> f64 {
    1.0 / (((max_entropy - entropy) * conservation / max_entropy).exp() + 1.0)
}

/// Parameters of the distortion process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistortionModel {
    /// Conservation factor K
    pub conservation: f64,

    /// Largest possible memory entropy (bits)
    pub max_entropy: f64,
}

impl Default for DistortionModel {
    fn default() -> Self {
        Self {
            conservation: 1.0,
            max_entropy: RUMOR_BITS as f64,
        }
    }
}

impl DistortionModel {
    /// Creates a validated model.
    pub fn new(conservation: f64, max_entropy: f64) -> Result<Self, ModelError> {
        let model = Self {
            conservation,
            max_entropy,
        };
        model.validate()?;
        Ok(model)
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.max_entropy.is_finite() && self.max_entropy > 0.0) {
            return Err(ModelError::parameter(format!(
                "max entropy must be positive, got {}",
                self.max_entropy
            )));
        }
        if !(self.conservation.is_finite() && self.conservation >= 0.0) {
            return Err(ModelError::parameter(format!(
                "conservation factor must be >= 0, got {}",
                self.conservation
            )));
        }
        Ok(())
    }

    /// Distortion probability for a node with the given entropy.
    pub fn probability(&self, entropy: f64) -> f64 {
        distortion_probability(entropy, self.max_entropy, self.conservation)
    }

    /// Possibly flips one uniformly chosen bit of `rumor`.
    ///
    /// Returns `Some(distorted)` when a distortion happened.
    pub fn maybe_distort<R: Rng + ?Sized>(
        &self,
        rumor: Rumor,
        entropy: f64,
        rng: &mut R,
    ) -> Result<Option<Rumor>, ModelError> {
        let p = self.probability(entropy).clamp(0.0, 1.0);
        if !rng.gen_bool(p) {
            return Ok(None);
        }
        let bit = rng.gen_range(0..RUMOR_BITS);
        rumor.flip_bit(bit).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_probability_at_max_entropy_is_half() {
        assert_relative_eq!(distortion_probability(5.0, 5.0, 1.0), 0.5);
        assert_relative_eq!(distortion_probability(5.0, 5.0, 10.0), 0.5);
    }

    #[test]
    fn test_probability_for_certain_node() {
        // H = 0, K = 1: 1 / (e + 1)
        let expected = 1.0 / (std::f64::consts::E + 1.0);
        assert_relative_eq!(distortion_probability(0.0, 5.0, 1.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_probability_monotone_in_entropy() {
        let model = DistortionModel::default();
        let mut last = 0.0;
        for step in 0..=50 {
            let p = model.probability(step as f64 * 0.1);
            assert!(p > last);
            assert!(p > 0.0 && p < 1.0);
            last = p;
        }
    }

    #[test]
    fn test_conservation_suppresses_distortion() {
        let loose = DistortionModel::new(0.5, 5.0).unwrap();
        let strict = DistortionModel::new(8.0, 5.0).unwrap();
        assert!(strict.probability(1.0) < loose.probability(1.0));

        // K = 0 turns every retelling into a coin flip
        let indifferent = DistortionModel::new(0.0, 5.0).unwrap();
        assert_relative_eq!(indifferent.probability(0.0), 0.5);
    }

    #[test]
    fn test_validation() {
        assert!(DistortionModel::new(1.0, 0.0).is_err());
        assert!(DistortionModel::new(-0.1, 5.0).is_err());
        assert!(DistortionModel::new(f64::NAN, 5.0).is_err());
    }

    #[test]
    fn test_maybe_distort_flips_one_bit() {
        let model = DistortionModel::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let mut distorted = 0;
        for _ in 0..500 {
            if let Some(r) = model.maybe_distort(Rumor::TRUE, 0.0, &mut rng).unwrap() {
                assert_eq!(r.distortion(), 1);
                distorted += 1;
            }
        }

        // Expected rate 1/(e+1) ~ 0.269
        assert!(distorted > 90 && distorted < 180, "distorted = {}", distorted);
    }
}
