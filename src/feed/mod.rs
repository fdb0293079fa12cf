pub mod event;
pub mod gateway;
pub mod ticker;

pub use event::FeedEvent;
pub use gateway::{BroadcastGateway, Subscription};
pub use ticker::{run_ticker, tick_once};
