//! Bounded signal histories used to damp single-frame noise.
//!
//! A [`SignalHistory`] keeps at most `capacity` samples and evicts the oldest
//! first. Scalar histories expose a running mean (the eye-aspect-ratio
//! smoother); point histories serve as the fingertip trajectory buffer for
//! shape gestures.

use crate::landmarks::PixelPoint;
use std::collections::VecDeque;

/// Fixed-capacity history of one signal
#[derive(Debug, Clone)]
pub struct SignalHistory<T> {
    capacity: usize,
    samples: VecDeque<T>,
}

impl<T: Copy> SignalHistory<T> {
    /// Create an empty history
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "History capacity must be greater than 0");
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, evicting the oldest beyond capacity
    pub fn push(&mut self, value: T) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// Samples oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }

    #[must_use]
    pub fn first(&self) -> Option<T> {
        self.samples.front().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.samples.back().copied()
    }

    /// Sample at `index`, oldest first
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.samples.get(index).copied()
    }
}

impl SignalHistory<f64> {
    /// Arithmetic mean of the current contents
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    /// Push a sample and return the updated mean
    pub fn push_mean(&mut self, value: f64) -> f64 {
        self.push(value);
        self.mean().unwrap_or(value)
    }
}

/// Fingertip positions in frame pixels, oldest first
pub type Trajectory = SignalHistory<PixelPoint>;

impl Trajectory {
    /// Net displacement of the two halves split at the midpoint
    ///
    /// The first half is `[0, mid)` and the second `[mid, len)`, with
    /// `mid = len / 2`. Returns `None` with fewer than two samples.
    #[must_use]
    pub fn half_displacements(&self) -> Option<((f64, f64), (f64, f64))> {
        let len = self.len();
        if len < 2 {
            return None;
        }
        let mid = len / 2;

        let first_start = self.get(0)?;
        let first_end = self.get(mid - 1)?;
        let second_start = self.get(mid)?;
        let second_end = self.get(len - 1)?;

        Some((
            (first_end.x - first_start.x, first_end.y - first_start.y),
            (second_end.x - second_start.x, second_end.y - second_start.y),
        ))
    }
}
