use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::gateway::BroadcastGateway;
use crate::sim::{DeltaSource, TickAggregator};

/// Produce one batch and hand it to the gateway. Returns the batch sequence number.
pub fn tick_once<D: DeltaSource>(
    aggregator: &mut TickAggregator<D>,
    gateway: &BroadcastGateway,
    now: DateTime<Utc>,
) -> u64 {
    let batch = aggregator.tick(now);
    let seq = batch.seq;
    let consumers = gateway.publish(batch);
    tracing::trace!(seq, consumers, "Published tick");
    seq
}

/// Drive the simulation on a fixed period until `shutdown` flips to true or
/// its sender is dropped. The first tick fires one period after start.
pub async fn run_ticker<D: DeltaSource>(
    mut aggregator: TickAggregator<D>,
    gateway: Arc<BroadcastGateway>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(period_ms = period.as_millis() as u64, "Ticker started");
    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => {
                tick_once(&mut aggregator, &gateway, Utc::now());
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    tracing::info!(ticks = aggregator.seq(), "Ticker stopped");
}
