pub mod config;
pub mod error;
pub mod export;
pub mod feed;
pub mod indicator;
pub mod logging;
pub mod model;
pub mod server;
pub mod sim;
