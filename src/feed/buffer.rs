//! Fixed-capacity rolling price window

use super::PriceSample;
use std::collections::VecDeque;

/// Default number of samples kept in the window
pub const DEFAULT_CAPACITY: usize = 30;

/// FIFO window of the most recent price samples, oldest first
#[derive(Debug, Clone)]
pub struct PriceBuffer {
    capacity: usize,
    samples: VecDeque<PriceSample>,
}

impl PriceBuffer {
    /// Create an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, evicting the oldest one first when full
    pub fn push(&mut self, sample: PriceSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Prices in insertion order
    pub fn prices(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.price).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceSample> {
        self.samples.iter()
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<&PriceSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PriceBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
