//! Window scoring and take-profit/stop-loss placement

use super::{Evaluation, Features, Levels, Scorer, Signal};
use crate::config::SignalConfig;
use std::sync::Arc;

/// Take-profit multiples of the volatility step
const TP_MULTIPLES: [f64; 3] = [1.5, 3.0, 5.0];
/// Stop-loss multiple of the volatility step
const SL_MULTIPLE: f64 = 2.0;

/// Pure mapping from a price window to signal, confidence and levels
#[derive(Clone)]
pub struct SignalEngine {
    scorer: Option<Arc<dyn Scorer>>,
    min_samples: usize,
    buy_threshold: f64,
    sell_threshold: f64,
}

impl SignalEngine {
    /// Create an engine around an initialized scorer
    pub fn new(scorer: Arc<dyn Scorer>, config: &SignalConfig) -> Self {
        Self {
            scorer: Some(scorer),
            min_samples: config.min_samples,
            buy_threshold: config.buy_threshold,
            sell_threshold: config.sell_threshold,
        }
    }

    /// Create an engine with no scorer; every evaluation holds
    pub fn without_scorer(config: &SignalConfig) -> Self {
        Self {
            scorer: None,
            min_samples: config.min_samples,
            buy_threshold: config.buy_threshold,
            sell_threshold: config.sell_threshold,
        }
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Score a window ordered oldest to newest.
    ///
    /// Windows shorter than `min_samples`, or a missing/unready scorer, give
    /// the idle `HOLD` evaluation with confidence 50.
    pub fn evaluate(&self, window: &[f64]) -> Evaluation {
        if window.len() < self.min_samples {
            return Evaluation::hold();
        }
        let Some(scorer) = self.scorer.as_deref().filter(|s| s.is_ready()) else {
            return Evaluation::hold();
        };
        let Some(features) = Features::from_window(window) else {
            return Evaluation::hold();
        };

        let prob = scorer.probability(&features);
        if !prob.is_finite() {
            tracing::debug!(?features, "Scorer returned a non-finite probability");
            return Evaluation::hold();
        }
        let prob = prob.clamp(0.0, 1.0);

        let signal = if prob > self.buy_threshold {
            Signal::Buy
        } else if prob < self.sell_threshold {
            Signal::Sell
        } else {
            Signal::Hold
        };

        let confidence = ((prob - 0.5).abs() * 200.0).min(100.0);
        let levels = match (signal, window.last()) {
            (Signal::Hold, _) | (_, None) => None,
            (_, Some(&price)) => self.levels(window, price, signal, confidence),
        };

        Evaluation {
            signal,
            direction: signal.direction(),
            confidence: round_to(confidence, 1),
            levels,
        }
    }

    fn levels(&self, window: &[f64], price: f64, signal: Signal, confidence: f64) -> Option<Levels> {
        if window.len() < self.min_samples {
            return None;
        }
        let volatility = super::features::mean_abs_change(window)?;
        compute_levels(price, signal, volatility, confidence)
    }
}

impl std::fmt::Debug for SignalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalEngine")
            .field("scorer", &self.scorer.is_some())
            .field("min_samples", &self.min_samples)
            .field("buy_threshold", &self.buy_threshold)
            .field("sell_threshold", &self.sell_threshold)
            .finish()
    }
}

/// Place take-profit and stop-loss levels around `price`.
///
/// The step is `volatility * confidence / 50`; SELL mirrors BUY around the
/// price. HOLD has no levels.
pub fn compute_levels(
    price: f64,
    signal: Signal,
    volatility: f64,
    confidence: f64,
) -> Option<Levels> {
    let sign = match signal {
        Signal::Buy => 1.0,
        Signal::Sell => -1.0,
        Signal::Hold => return None,
    };
    let multiplier = confidence / 50.0;
    let offset = |k: f64| volatility * k * multiplier;

    Some(Levels {
        tp1: round_to(price + sign * offset(TP_MULTIPLES[0]), 2),
        tp2: round_to(price + sign * offset(TP_MULTIPLES[1]), 2),
        tp3: round_to(price + sign * offset(TP_MULTIPLES[2]), 2),
        sl: round_to(price - sign * offset(SL_MULTIPLE), 2),
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
