use chrono::{DateTime, Utc};

use super::price::{DeltaSource, PriceSimulator};
use super::spread::SpreadCalculator;
use crate::config::Config;
use crate::indicator::RollingStatsEngine;
use crate::model::{Symbol, TickBatch, TickUpdate};

/// Last finite derived values per symbol, substituted when a tick produces a
/// non-finite result.
#[derive(Debug, Clone, Copy, Default)]
struct LastValid {
    percent: f64,
    z_score: f64,
    spread: f64,
}

/// Owns all per-symbol simulation state and turns one timer firing into one
/// `TickBatch`. Ticks are strictly sequential.
#[derive(Debug)]
pub struct TickAggregator<D> {
    symbols: Vec<Symbol>,
    simulator: PriceSimulator<D>,
    stats: RollingStatsEngine,
    spread: SpreadCalculator,
    last_valid: Vec<LastValid>,
    seq: u64,
}

impl<D: DeltaSource> TickAggregator<D> {
    pub fn new(
        symbols: Vec<Symbol>,
        simulator: PriceSimulator<D>,
        stats: RollingStatsEngine,
        spread: SpreadCalculator,
    ) -> Self {
        let last_valid = vec![LastValid::default(); symbols.len()];
        Self {
            symbols,
            simulator,
            stats,
            spread,
            last_valid,
            seq: 0,
        }
    }

    /// Build from a validated config.
    pub fn from_config(config: &Config, source: D) -> Self {
        let symbols = config.symbols.iter().map(Symbol::from).collect();
        let (anchor, base) = config.spread_roles();
        Self::new(
            symbols,
            PriceSimulator::new(source),
            RollingStatsEngine::new(
                config.simulation.window_capacity,
                config.simulation.zscore_min_samples,
            ),
            SpreadCalculator::new(anchor, base, config.spread.ratio),
        )
    }

    /// Run one tick stamped with `now`.
    ///
    /// All prices move and are recorded first; z-scores and spreads are then
    /// derived from the fully updated price set.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickBatch {
        self.seq += 1;

        let mut changes = Vec::with_capacity(self.symbols.len());
        for sym in &mut self.symbols {
            let change = self.simulator.step(sym);
            self.stats.record(&sym.id, sym.price);
            changes.push(change);
        }

        let prices: Vec<(&str, f64)> = self
            .symbols
            .iter()
            .map(|s| (s.id.as_str(), s.price))
            .collect();
        let spreads = self.spread.compute(&prices);
        if spreads.is_none() {
            tracing::error!(
                anchor = %self.spread.anchor(),
                base = %self.spread.base(),
                seq = self.seq,
                "Spread reference price missing"
            );
        }

        let mut updates = Vec::with_capacity(self.symbols.len());
        for (idx, sym) in self.symbols.iter().enumerate() {
            let last = &mut self.last_valid[idx];
            let change = changes[idx];
            let percent_raw = change / sym.price * 100.0;
            let z_raw = self.stats.z_score(&sym.id);
            let spread_raw = spreads.as_ref().map(|s| s[idx]).unwrap_or(f64::NAN);

            let percent = guard(percent_raw, &mut last.percent, "percent", &sym.id);
            let z_score = guard(z_raw, &mut last.z_score, "z_score", &sym.id);
            let spread = guard(spread_raw, &mut last.spread, "spread", &sym.id);

            updates.push(TickUpdate {
                symbol: sym.id.clone(),
                price: sym.price,
                change,
                percent,
                timestamp: now,
                z_score,
                spread,
            });
        }

        TickBatch {
            seq: self.seq,
            timestamp: now,
            updates,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn stats(&self) -> &RollingStatsEngine {
        &self.stats
    }

    pub fn spread(&self) -> &SpreadCalculator {
        &self.spread
    }

    /// Number of ticks produced so far.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

fn guard(value: f64, previous: &mut f64, field: &'static str, symbol: &str) -> f64 {
    if value.is_finite() {
        *previous = value;
        value
    } else {
        tracing::error!(
            symbol = %symbol,
            field,
            fallback = *previous,
            "Non-finite tick value, reusing previous"
        );
        *previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::price::ScriptedDeltas;

    fn aggregator(deltas: Vec<f64>) -> TickAggregator<ScriptedDeltas> {
        TickAggregator::new(
            vec![
                Symbol::new("BTC/USD", 42000.0, 35.0),
                Symbol::new("ETH/USD", 2250.0, 8.0),
            ],
            PriceSimulator::new(ScriptedDeltas::new(deltas)),
            RollingStatsEngine::new(30, 5),
            SpreadCalculator::new("BTC/USD", "ETH/USD", 0.05),
        )
    }

    #[test]
    fn batch_follows_configured_order_with_shared_timestamp() {
        let mut agg = aggregator(vec![10.0, -2.0]);
        let now = Utc::now();
        let batch = agg.tick(now);
        assert_eq!(batch.seq, 1);
        let ids: Vec<&str> = batch.updates.iter().map(|u| u.symbol.as_str()).collect();
        assert_eq!(ids, vec!["BTC/USD", "ETH/USD"]);
        assert!(batch.updates.iter().all(|u| u.timestamp == now));
    }

    #[test]
    fn spread_uses_post_move_prices() {
        let mut agg = aggregator(vec![20.0, 10.0]);
        let batch = agg.tick(Utc::now());
        // ETH 2260 - BTC 42020 * 0.05
        let eth = batch.get("ETH/USD").unwrap();
        assert!((eth.spread - (2260.0 - 2101.0)).abs() < 1e-9);
        let btc = batch.get("BTC/USD").unwrap();
        assert!((btc.spread - (42020.0 - 2260.0)).abs() < 1e-9);
    }

    #[test]
    fn percent_is_relative_to_new_price() {
        let mut agg = aggregator(vec![0.0, 50.0]);
        let batch = agg.tick(Utc::now());
        let eth = batch.get("ETH/USD").unwrap();
        assert!((eth.percent - 50.0 / 2300.0 * 100.0).abs() < 1e-12);
    }

    #[test]
    fn missing_reference_falls_back_to_previous_spread() {
        let mut agg = TickAggregator::new(
            vec![Symbol::new("SOL/USD", 98.0, 1.2)],
            PriceSimulator::new(ScriptedDeltas::new([1.0])),
            RollingStatsEngine::new(30, 5),
            SpreadCalculator::new("BTC/USD", "ETH/USD", 0.05),
        );
        let batch = agg.tick(Utc::now());
        assert_eq!(batch.updates[0].spread, 0.0);
        assert!((batch.updates[0].price - 99.0).abs() < f64::EPSILON);
    }
}
