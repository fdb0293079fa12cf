use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::watch;

use market_sim::config::Config;
use market_sim::feed::{run_ticker, BroadcastGateway};
use market_sim::logging::init_tracing;
use market_sim::server::{self, ServerState};
use market_sim::sim::{TickAggregator, UniformDelta};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging);

    let (anchor, base) = config.spread_roles();
    tracing::info!(
        symbols = ?config.symbol_ids(),
        anchor = %anchor,
        base = %base,
        ratio = config.spread.ratio,
        tick_ms = config.simulation.tick_interval_ms,
        window = config.simulation.window_capacity,
        history = config.simulation.history_capacity,
        bind = %config.server.bind_addr,
        "Starting market-sim"
    );

    let source = match config.simulation.seed {
        Some(seed) => UniformDelta::seeded(seed),
        None => UniformDelta::from_entropy(),
    };
    let aggregator = TickAggregator::from_config(&config, source);
    let gateway = Arc::new(BroadcastGateway::new(
        config.simulation.history_capacity,
        config.server.broadcast_buffer,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let ticker = tokio::spawn(run_ticker(
        aggregator,
        Arc::clone(&gateway),
        config.simulation.tick_interval(),
        shutdown_rx.clone(),
    ));

    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    let state = ServerState::new(gateway, &config);
    let http = tokio::spawn(server::serve(listener, state, shutdown_rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);

    if let Err(e) = ticker.await {
        tracing::error!(error = %e, "Ticker task failed");
    }
    match http.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server failed"),
        Err(e) => tracing::error!(error = %e, "HTTP server task failed"),
    }
    Ok(())
}
