use crate::config::SymbolConfig;

/// Live state of one simulated instrument. Created once at startup and
/// mutated in place every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub id: String,
    pub price: f64,
    volatility: f64,
}

impl Symbol {
    pub fn new(id: impl Into<String>, price: f64, volatility: f64) -> Self {
        Self {
            id: id.into(),
            price,
            volatility,
        }
    }

    /// Fixed at configuration time.
    pub fn volatility(&self) -> f64 {
        self.volatility
    }
}

impl From<&SymbolConfig> for Symbol {
    fn from(cfg: &SymbolConfig) -> Self {
        Self::new(cfg.id.trim(), cfg.initial_price, cfg.volatility)
    }
}
