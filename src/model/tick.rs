use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

pub const PRICE_DECIMALS: usize = 2;
pub const ZSCORE_DECIMALS: usize = 3;

/// One symbol's derived result for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickUpdate {
    pub symbol: String,
    #[serde(serialize_with = "fixed_price")]
    pub price: f64,
    #[serde(serialize_with = "fixed_price")]
    pub change: f64,
    #[serde(serialize_with = "fixed_price")]
    pub percent: f64,
    #[serde(serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    #[serde(serialize_with = "fixed_zscore")]
    pub z_score: f64,
    #[serde(serialize_with = "fixed_price")]
    pub spread: f64,
}

/// All symbols' updates for one tick, in configured symbol order.
/// Serializes as a bare array of updates.
#[derive(Debug, Clone, PartialEq)]
pub struct TickBatch {
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub updates: Vec<TickUpdate>,
}

impl TickBatch {
    pub fn get(&self, symbol: &str) -> Option<&TickUpdate> {
        self.updates.iter().find(|u| u.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

impl Serialize for TickBatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.updates)
    }
}

/// Fixed-precision decimal string, the wire format for every numeric field.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn fixed_price<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_fixed(*value, PRICE_DECIMALS))
}

fn fixed_zscore<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_fixed(*value, ZSCORE_DECIMALS))
}

fn iso_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(ts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_update() -> TickUpdate {
        TickUpdate {
            symbol: "ETH/USD".to_string(),
            price: 2251.456,
            change: 1.456,
            percent: 0.06467,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            z_score: -1.23456,
            spread: 150.0,
        }
    }

    #[test]
    fn update_serializes_fixed_precision_strings() {
        let json = serde_json::to_value(sample_update()).unwrap();
        assert_eq!(json["symbol"], "ETH/USD");
        assert_eq!(json["price"], "2251.46");
        assert_eq!(json["change"], "1.46");
        assert_eq!(json["percent"], "0.06");
        assert_eq!(json["timestamp"], "2024-01-02T03:04:05.000Z");
        assert_eq!(json["zScore"], "-1.235");
        assert_eq!(json["spread"], "150.00");
    }

    #[test]
    fn batch_serializes_as_array() {
        let update = sample_update();
        let batch = TickBatch {
            seq: 1,
            timestamp: update.timestamp,
            updates: vec![update],
        };
        let json = serde_json::to_value(&batch).unwrap();
        assert!(json.is_array());
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert!(batch.get("ETH/USD").is_some());
        assert!(batch.get("BTC/USD").is_none());
    }
}
