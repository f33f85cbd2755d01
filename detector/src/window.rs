use std::collections::VecDeque;

pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// Bounded FIFO of trade notional values with an O(1) running mean.
///
/// The window is owned by exactly one pipeline and mutated only from the
/// ingestion path, so it needs no locking. The running sum is maintained
/// incrementally (add the new value, subtract the evicted one) instead of
/// rescanning the buffer on every push.
///
/// While the buffer is still filling, no mean is reported: classification is
/// meaningless until a full window of history exists.
#[derive(Debug)]
pub struct WindowStatistics {
    values: VecDeque<f64>,
    sum: f64,
    capacity: usize,
}

impl WindowStatistics {
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be non-zero");
        Self {
            values: VecDeque::with_capacity(capacity),
            sum: 0.0,
            capacity,
        }
    }

    /// Append a value, evicting the oldest one if the window is at capacity.
    ///
    /// Returns the current mean once the window has filled, `None` during
    /// warm-up.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.values.len() == self.capacity {
            if let Some(evicted) = self.values.pop_front() {
                self.sum -= evicted;
            }
        }

        self.values.push_back(value);
        self.sum += value;

        self.mean()
    }

    /// Mean of the resident values, available only once the window is full.
    pub fn mean(&self) -> Option<f64> {
        if self.is_full() {
            Some(self.sum / self.capacity as f64)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
