pub mod window;
pub mod zscore;

pub use window::PriceWindow;
pub use zscore::{z_score, RollingStatsEngine};
