//! Feature extraction from a price window

/// Number of trailing samples used for momentum and the short average
const SHORT_WINDOW: usize = 5;

/// Feature vector fed to a scorer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Features {
    /// Mean of the most recent simple returns
    pub momentum: f64,
    /// Short moving average minus long moving average
    pub ma_spread: f64,
}

impl Features {
    /// Compute features over a window ordered oldest to newest.
    ///
    /// Returns `None` for an empty window.
    pub fn from_window(window: &[f64]) -> Option<Self> {
        let long_ma = mean(window)?;
        let short_ma = mean(tail(window, SHORT_WINDOW))?;

        let returns = simple_returns(window);
        let momentum = mean(tail(&returns, SHORT_WINDOW)).unwrap_or(0.0);

        Some(Self {
            momentum,
            ma_spread: short_ma - long_ma,
        })
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.momentum, self.ma_spread]
    }
}

/// `(p[i] - p[i-1]) / p[i-1]` for each consecutive pair
pub fn simple_returns(window: &[f64]) -> Vec<f64> {
    window
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect()
}

/// Mean absolute first difference of the window
pub fn mean_abs_change(window: &[f64]) -> Option<f64> {
    let diffs: Vec<f64> = window
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .collect();
    mean(&diffs)
}

fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
