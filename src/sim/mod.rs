pub mod aggregator;
pub mod history;
pub mod price;
pub mod spread;

pub use aggregator::TickAggregator;
pub use history::HistoryStore;
pub use price::{DeltaSource, PriceSimulator, ScriptedDeltas, UniformDelta};
pub use spread::SpreadCalculator;
