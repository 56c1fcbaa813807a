//! Signal types

use serde::{Deserialize, Serialize};

/// Trading signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// Expected price direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Hold,
}

impl Signal {
    /// Direction implied by the signal
    pub fn direction(self) -> Direction {
        match self {
            Signal::Buy => Direction::Up,
            Signal::Sell => Direction::Down,
            Signal::Hold => Direction::Hold,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// Take-profit and stop-loss levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    pub sl: f64,
}

/// Result of scoring one price window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub signal: Signal,
    pub direction: Direction,
    /// Confidence in percent, 0-100, one decimal
    pub confidence: f64,
    pub levels: Option<Levels>,
}

impl Evaluation {
    /// Idle result used while the window is too short or no scorer is ready
    pub fn hold() -> Self {
        Self {
            signal: Signal::Hold,
            direction: Direction::Hold,
            confidence: 50.0,
            levels: None,
        }
    }
}

/// Update fanned out to subscribers, one per incoming price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub price: f64,
    pub signal: Signal,
    pub direction: Direction,
    pub confidence: f64,
    pub levels: Option<Levels>,
}

impl Update {
    pub fn new(price: f64, evaluation: Evaluation) -> Self {
        Self {
            price,
            signal: evaluation.signal,
            direction: evaluation.direction,
            confidence: evaluation.confidence,
            levels: evaluation.levels,
        }
    }
}
