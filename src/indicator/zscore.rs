use std::collections::HashMap;

use super::window::PriceWindow;

/// Distance of the latest sample from the window mean, in population standard
/// deviations. Returns 0 below `min_samples` entries or for a flat window.
pub fn z_score(window: &PriceWindow, min_samples: usize) -> f64 {
    if window.len() < min_samples {
        return 0.0;
    }
    let Some((offset, std)) = window.deviation() else {
        return 0.0;
    };
    if std == 0.0 || !std.is_finite() {
        return 0.0;
    }
    offset / std
}

/// Per-symbol rolling price windows.
#[derive(Debug, Clone)]
pub struct RollingStatsEngine {
    capacity: usize,
    min_samples: usize,
    windows: HashMap<String, PriceWindow>,
}

impl RollingStatsEngine {
    pub fn new(capacity: usize, min_samples: usize) -> Self {
        assert!(capacity > 0, "window capacity must be > 0");
        Self {
            capacity,
            min_samples,
            windows: HashMap::new(),
        }
    }

    /// Append `price` to the symbol's window. Must precede `z_score` within a tick.
    pub fn record(&mut self, symbol: &str, price: f64) {
        let capacity = self.capacity;
        self.windows
            .entry(symbol.to_string())
            .or_insert_with(|| PriceWindow::new(capacity))
            .push(price);
    }

    pub fn z_score(&self, symbol: &str) -> f64 {
        self.windows
            .get(symbol)
            .map(|w| z_score(w, self.min_samples))
            .unwrap_or(0.0)
    }

    pub fn window_len(&self, symbol: &str) -> usize {
        self.windows.get(symbol).map(PriceWindow::len).unwrap_or(0)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
