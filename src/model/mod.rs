pub mod symbol;
pub mod tick;

pub use symbol::Symbol;
pub use tick::{TickBatch, TickUpdate};
