//! Probabilistic admission gate applied before mapping.

use crate::core::{BridgeError, Result};
use rand::Rng;

/// Admits each record independently with probability `rate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampler {
    rate: f64,
}

impl Sampler {
    /// Create a sampler. `rate` must lie within `0.0..=1.0`.
    pub fn new(rate: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(BridgeError::InvalidSamplingRate(rate));
        }
        Ok(Self { rate })
    }

    /// A sampler that admits everything
    pub fn always() -> Self {
        Self { rate: 1.0 }
    }

    /// Admission probability
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Decide whether the next record is processed.
    pub fn admit(&self) -> bool {
        self.admit_with(&mut rand::thread_rng())
    }

    /// Same as [`admit`](Self::admit) with a caller-supplied source of randomness.
    pub fn admit_with<R: Rng>(&self, rng: &mut R) -> bool {
        if self.rate >= 1.0 {
            return true;
        }
        if self.rate <= 0.0 {
            return false;
        }
        rng.gen::<f64>() < self.rate
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::always()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rate_bounds() {
        assert!(Sampler::new(0.0).is_ok());
        assert!(Sampler::new(1.0).is_ok());
        assert!(matches!(Sampler::new(1.5), Err(BridgeError::InvalidSamplingRate(_))));
        assert!(Sampler::new(-0.1).is_err());
        assert!(Sampler::new(f64::NAN).is_err());
    }

    #[test]
    fn test_extremes() {
        let all = Sampler::new(1.0).unwrap();
        let none = Sampler::new(0.0).unwrap();
        for _ in 0..1000 {
            assert!(all.admit());
            assert!(!none.admit());
        }
    }

    #[test]
    fn test_partial_rate() {
        let sampler = Sampler::new(0.25).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let admitted = (0..10_000).filter(|_| sampler.admit_with(&mut rng)).count();
        assert!((2_000..3_000).contains(&admitted), "admitted {admitted}");
    }
}
