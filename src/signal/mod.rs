//! Signal generation module
//!
//! Scores the rolling price window and places take-profit/stop-loss levels

mod engine;
mod features;
mod scorer;
mod types;

pub use engine::{compute_levels, SignalEngine};
pub use features::{mean_abs_change, simple_returns, Features};
pub use scorer::{FixedScorer, LogisticScorer, Scorer};
pub use types::{Direction, Evaluation, Levels, Signal, Update};
