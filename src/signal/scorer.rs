//! Pluggable probability scorers

use super::Features;
use crate::config::ScorerConfig;

/// Maps a feature vector to the probability that price moves up.
///
/// Scorers are built once at startup and shared read-only across tasks.
pub trait Scorer: Send + Sync {
    /// Probability of the "up" class, in `[0, 1]`
    fn probability(&self, features: &Features) -> f64;

    /// Whether the scorer has been loaded and can be queried
    fn is_ready(&self) -> bool {
        true
    }
}

/// Logistic model over `[momentum, ma_spread]`
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticScorer {
    weights: [f64; 2],
    bias: f64,
}

impl LogisticScorer {
    pub fn new(weights: [f64; 2], bias: f64) -> Self {
        Self { weights, bias }
    }

    pub fn from_config(config: &ScorerConfig) -> Self {
        Self::new([config.momentum_weight, config.trend_weight], config.bias)
    }
}

impl Scorer for LogisticScorer {
    fn probability(&self, features: &Features) -> f64 {
        let z = features
            .as_array()
            .iter()
            .zip(self.weights.iter())
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.bias;
        let p = 1.0 / (1.0 + (-z).exp());
        if p.is_nan() {
            0.5
        } else {
            p
        }
    }
}

/// Scorer that always returns the same probability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedScorer(pub f64);

impl Scorer for FixedScorer {
    fn probability(&self, _features: &Features) -> f64 {
        self.0
    }
}
