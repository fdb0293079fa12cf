//! HTTP and WebSocket transport for the market feed.
//!
//! - `GET /ws` - `market-history` once, then `market-update` per tick
//! - `GET /api/history` - retained tick batches
//! - `GET /api/symbols` - configured symbols and spread roles
//! - `GET /api/export?symbol=..&format=csv|json` - one symbol's retained history
//! - `GET /health` - liveness

pub mod api;
pub mod ws;

use std::sync::Arc;

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::Config;
use crate::feed::BroadcastGateway;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub gateway: Arc<BroadcastGateway>,
    pub symbols: Arc<Vec<String>>,
    pub anchor: Arc<str>,
    pub base: Arc<str>,
    pub ratio: f64,
}

impl ServerState {
    pub fn new(gateway: Arc<BroadcastGateway>, config: &Config) -> Self {
        let (anchor, base) = config.spread_roles();
        Self {
            gateway,
            symbols: Arc::new(config.symbol_ids()),
            anchor: anchor.into(),
            base: base.into(),
            ratio: config.spread.ratio,
        }
    }

    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }
}

pub fn create_app(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/ws", get(ws::ws_handler))
        .route("/api/history", get(api::history))
        .route("/api/symbols", get(api::symbols))
        .route("/api/export", get(api::export_history))
        .with_state(state)
}

/// Serve until `shutdown` flips to true or its sender is dropped.
pub async fn serve(
    listener: TcpListener,
    state: ServerState,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await?;
    Ok(())
}
