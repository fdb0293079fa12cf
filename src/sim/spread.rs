/// Fixed spread policy.
///
/// The base symbol is measured against `anchor * ratio`; every other symbol,
/// the anchor included, is measured against the base price. Swapping anchor
/// and base changes every output.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadCalculator {
    anchor: String,
    base: String,
    ratio: f64,
}

impl SpreadCalculator {
    pub fn new(anchor: impl Into<String>, base: impl Into<String>, ratio: f64) -> Self {
        Self {
            anchor: anchor.into(),
            base: base.into(),
            ratio,
        }
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Spreads for one tick's joint price set, in input order.
    /// Returns `None` when the anchor or base price is missing.
    pub fn compute(&self, prices: &[(&str, f64)]) -> Option<Vec<f64>> {
        let anchor_price = Self::lookup(prices, &self.anchor)?;
        let base_price = Self::lookup(prices, &self.base)?;
        Some(
            prices
                .iter()
                .map(|(symbol, price)| {
                    if *symbol == self.base {
                        price - anchor_price * self.ratio
                    } else {
                        price - base_price
                    }
                })
                .collect(),
        )
    }

    fn lookup(prices: &[(&str, f64)], symbol: &str) -> Option<f64> {
        prices.iter().find(|(s, _)| *s == symbol).map(|(_, p)| *p)
    }
}
