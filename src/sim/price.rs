use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::Symbol;

/// Source of per-tick price changes.
pub trait DeltaSource: Send {
    /// Signed change for a symbol with the given volatility.
    fn next_delta(&mut self, volatility: f64) -> f64;
}

/// Uniform draw from `[-volatility / 2, volatility / 2]`.
#[derive(Debug, Clone)]
pub struct UniformDelta {
    rng: StdRng,
}

impl UniformDelta {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DeltaSource for UniformDelta {
    fn next_delta(&mut self, volatility: f64) -> f64 {
        let half = volatility / 2.0;
        if half <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-half..=half)
    }
}

/// Replays a fixed sequence of deltas, ignoring volatility. Yields 0 once exhausted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDeltas {
    deltas: VecDeque<f64>,
}

impl ScriptedDeltas {
    pub fn new(deltas: impl IntoIterator<Item = f64>) -> Self {
        Self {
            deltas: deltas.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.deltas.len()
    }
}

impl DeltaSource for ScriptedDeltas {
    fn next_delta(&mut self, _volatility: f64) -> f64 {
        self.deltas.pop_front().unwrap_or(0.0)
    }
}

/// Bounded random walk. Keeps every price finite and strictly positive.
#[derive(Debug, Clone)]
pub struct PriceSimulator<D> {
    source: D,
}

impl<D: DeltaSource> PriceSimulator<D> {
    pub fn new(source: D) -> Self {
        Self { source }
    }

    /// Advance `symbol.price` by one draw and return the applied change.
    /// A draw that would leave the price non-positive or non-finite is
    /// rejected: the price stays put and the returned change is 0.
    pub fn step(&mut self, symbol: &mut Symbol) -> f64 {
        let delta = self.source.next_delta(symbol.volatility());
        let next = symbol.price + delta;
        if !delta.is_finite() || !next.is_finite() || next <= 0.0 {
            tracing::warn!(
                symbol = %symbol.id,
                price = symbol.price,
                delta,
                "Rejected price excursion"
            );
            return 0.0;
        }
        symbol.price = next;
        delta
    }

    pub fn source(&self) -> &D {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_delta_stays_within_half_volatility() {
        let mut src = UniformDelta::seeded(42);
        for _ in 0..10_000 {
            let d = src.next_delta(35.0);
            assert!((-17.5..=17.5).contains(&d), "delta out of range: {}", d);
        }
    }

    #[test]
    fn zero_volatility_never_moves() {
        let mut src = UniformDelta::seeded(1);
        assert_eq!(src.next_delta(0.0), 0.0);
    }

    #[test]
    fn seeded_sources_repeat() {
        let mut a = UniformDelta::seeded(9);
        let mut b = UniformDelta::seeded(9);
        for _ in 0..100 {
            assert_eq!(a.next_delta(8.0), b.next_delta(8.0));
        }
    }

    #[test]
    fn step_applies_delta_in_place() {
        let mut sim = PriceSimulator::new(ScriptedDeltas::new([1.5, -0.5]));
        let mut sym = Symbol::new("SOL/USD", 98.0, 1.2);
        assert!((sim.step(&mut sym) - 1.5).abs() < f64::EPSILON);
        assert!((sym.price - 99.5).abs() < f64::EPSILON);
        assert!((sim.step(&mut sym) + 0.5).abs() < f64::EPSILON);
        assert!((sym.price - 99.0).abs() < f64::EPSILON);
        assert_eq!(sim.step(&mut sym), 0.0);
        assert_eq!(sim.source().remaining(), 0);
    }

    #[test]
    fn step_rejects_non_positive_price() {
        let mut sim = PriceSimulator::new(ScriptedDeltas::new([-5.0, -1.0]));
        let mut sym = Symbol::new("DOGE/USD", 3.0, 10.0);
        assert_eq!(sim.step(&mut sym), 0.0);
        assert!((sym.price - 3.0).abs() < f64::EPSILON);
        assert!((sim.step(&mut sym) + 1.0).abs() < f64::EPSILON);
        assert!((sym.price - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn step_rejects_non_finite_delta() {
        let mut sim = PriceSimulator::new(ScriptedDeltas::new([f64::NAN]));
        let mut sym = Symbol::new("ETH/USD", 2250.0, 8.0);
        assert_eq!(sim.step(&mut sym), 0.0);
        assert!((sym.price - 2250.0).abs() < f64::EPSILON);
    }
}
