use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;

use crate::model::tick::{format_fixed, format_timestamp, PRICE_DECIMALS, ZSCORE_DECIMALS};
use crate::model::{TickBatch, TickUpdate};

pub const CSV_HEADER: &str = "Timestamp,Symbol,Price,Change,Percent,ZScore,Spread";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unsupported export format '{}'", other)),
        }
    }
}

/// Every retained update of `symbol`, oldest first.
pub fn symbol_series<'a>(history: &'a [Arc<TickBatch>], symbol: &str) -> Vec<&'a TickUpdate> {
    history.iter().filter_map(|batch| batch.get(symbol)).collect()
}

pub fn to_csv(rows: &[&TickUpdate]) -> String {
    let mut out = String::with_capacity(64 * (rows.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for row in rows {
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{}",
            format_timestamp(&row.timestamp),
            row.symbol,
            format_fixed(row.price, PRICE_DECIMALS),
            format_fixed(row.change, PRICE_DECIMALS),
            format_fixed(row.percent, PRICE_DECIMALS),
            format_fixed(row.z_score, ZSCORE_DECIMALS),
            format_fixed(row.spread, PRICE_DECIMALS),
        );
    }
    out
}

pub fn to_json(rows: &[&TickUpdate]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}

/// Download file name, e.g. `BTC-USD_export.csv`.
pub fn file_name(symbol: &str, format: ExportFormat) -> String {
    format!("{}_export.{}", symbol.replace('/', "-"), format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn history() -> Vec<Arc<TickBatch>> {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        (1..=2)
            .map(|seq| {
                Arc::new(TickBatch {
                    seq,
                    timestamp: ts,
                    updates: vec![
                        TickUpdate {
                            symbol: "BTC/USD".to_string(),
                            price: 42000.0 + seq as f64,
                            change: 1.0,
                            percent: 0.002,
                            timestamp: ts,
                            z_score: 0.5,
                            spread: 39750.0,
                        },
                        TickUpdate {
                            symbol: "ETH/USD".to_string(),
                            price: 2250.0,
                            change: -0.25,
                            percent: -0.011,
                            timestamp: ts,
                            z_score: -1.0,
                            spread: 150.0,
                        },
                    ],
                })
            })
            .collect()
    }

    #[test]
    fn csv_has_header_and_one_row_per_tick() {
        let h = history();
        let rows = symbol_series(&h, "ETH/USD");
        let csv = to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "2024-05-01T12:00:00.000Z,ETH/USD,2250.00,-0.25,-0.01,-1.000,150.00"
        );
    }

    #[test]
    fn json_rows_keep_order() {
        let h = history();
        let rows = symbol_series(&h, "BTC/USD");
        let value: serde_json::Value = serde_json::from_str(&to_json(&rows).unwrap()).unwrap();
        assert_eq!(value[0]["price"], "42001.00");
        assert_eq!(value[1]["price"], "42002.00");
    }

    #[test]
    fn format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!(file_name("BTC/USD", ExportFormat::Json), "BTC-USD_export.json");
    }
}
