//! Fixed-capacity FIFO windows used for running averages

use crate::tracking::types::Vector;
use std::collections::VecDeque;

/// Sliding window over the most recent samples.
///
/// Holds at most `capacity` items; pushing past capacity evicts the oldest.
/// A capacity of zero is treated as one.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> SlidingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append `item`, returning the evicted oldest item if the window was full
    pub fn push(&mut self, item: T) -> Option<T> {
        self.items.push_back(item);
        if self.items.len() > self.capacity {
            self.items.pop_front()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Items oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl SlidingWindow<Vector> {
    /// Component-wise mean, `None` when empty
    pub fn mean(&self) -> Option<Vector> {
        if self.items.is_empty() {
            return None;
        }
        let sum = self.items.iter().fold(Vector::ZERO, |acc, v| acc + *v);
        Some(sum / self.items.len() as f64)
    }
}

impl SlidingWindow<f64> {
    pub fn mean(&self) -> Option<f64> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.items.iter().sum::<f64>() / self.items.len() as f64)
    }
}
