/// Fixed-capacity FIFO of raw prices backed by a ring buffer for O(1) push.
/// The oldest entry is evicted once the window is full.
#[derive(Debug, Clone)]
pub struct PriceWindow {
    capacity: usize,
    buffer: Vec<f64>,
    head: usize,
    count: usize,
}

impl PriceWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be > 0");
        Self {
            capacity,
            buffer: vec![0.0; capacity],
            head: 0,
            count: 0,
        }
    }

    /// Append a price, evicting the oldest one if the window is full.
    pub fn push(&mut self, value: f64) {
        self.buffer[self.head] = value;
        self.head = (self.head + 1) % self.capacity;
        if self.count < self.capacity {
            self.count += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed price.
    pub fn latest(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        let idx = (self.head + self.capacity - 1) % self.capacity;
        Some(self.buffer[idx])
    }

    /// Prices oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let start = (self.head + self.capacity - self.count) % self.capacity;
        (0..self.count).map(move |i| self.buffer[(start + i) % self.capacity])
    }

    /// Mean and population standard deviation, `None` when empty.
    ///
    /// Accumulated as offsets from the oldest entry, so a window of identical
    /// prices yields a standard deviation of exactly 0.
    pub fn mean_std(&self) -> Option<(f64, f64)> {
        let (shift, mean_offset, std) = self.offset_stats()?;
        Some((shift + mean_offset, std))
    }

    /// Offset of the latest price from the mean, paired with the standard
    /// deviation. Exactly `(0.0, 0.0)` for a flat window.
    pub fn deviation(&self) -> Option<(f64, f64)> {
        let (shift, mean_offset, std) = self.offset_stats()?;
        let latest = self.latest()? - shift;
        Some((latest - mean_offset, std))
    }

    fn offset_stats(&self) -> Option<(f64, f64, f64)> {
        let shift = self.iter().next()?;
        let n = self.count as f64;
        let mean_offset = self.iter().map(|v| v - shift).sum::<f64>() / n;
        let variance = self
            .iter()
            .map(|v| (v - shift - mean_offset).powi(2))
            .sum::<f64>()
            / n;
        Some((shift, mean_offset, variance.sqrt()))
    }
}
