use std::sync::Arc;

use serde::Serialize;

use crate::model::TickBatch;

/// Outbound envelope: `{"event": "...", "data": ...}`.
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum FeedEvent<'a> {
    #[serde(rename = "market-update")]
    MarketUpdate(&'a TickBatch),
    #[serde(rename = "market-history")]
    MarketHistory(&'a [Arc<TickBatch>]),
}

impl FeedEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MarketUpdate(_) => "market-update",
            Self::MarketHistory(_) => "market-history",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TickUpdate;
    use chrono::Utc;

    fn batch(seq: u64) -> TickBatch {
        let now = Utc::now();
        TickBatch {
            seq,
            timestamp: now,
            updates: vec![TickUpdate {
                symbol: "BTC/USD".to_string(),
                price: 42000.0,
                change: 1.0,
                percent: 0.0024,
                timestamp: now,
                z_score: 0.0,
                spread: 39750.0,
            }],
        }
    }

    #[test]
    fn update_envelope() {
        let b = batch(1);
        let event = FeedEvent::MarketUpdate(&b);
        assert_eq!(event.name(), "market-update");
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(value["event"], "market-update");
        assert_eq!(value["data"][0]["symbol"], "BTC/USD");
        assert_eq!(value["data"][0]["zScore"], "0.000");
    }

    #[test]
    fn history_envelope_is_nested_arrays() {
        let history = vec![Arc::new(batch(1)), Arc::new(batch(2))];
        let event = FeedEvent::MarketHistory(&history);
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(value["event"], "market-history");
        assert_eq!(value["data"].as_array().unwrap().len(), 2);
        assert_eq!(value["data"][1][0]["price"], "42000.00");
    }

    #[test]
    fn empty_history_is_empty_array() {
        let event = FeedEvent::MarketHistory(&[]);
        assert_eq!(
            event.to_json().unwrap(),
            r#"{"event":"market-history","data":[]}"#
        );
    }
}
