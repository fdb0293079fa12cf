use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Startup configuration problems. Any of these prevents the ticker from starting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no symbols configured")]
    NoSymbols,

    #[error("at least two symbols are required for spread computation, got {0}")]
    TooFewSymbols(usize),

    #[error("symbol at position {0} has an empty id")]
    EmptySymbolId(usize),

    #[error("duplicate symbol id '{0}'")]
    DuplicateSymbol(String),

    #[error("symbol '{symbol}': initial price must be finite and > 0, got {price}")]
    InvalidPrice { symbol: String, price: f64 },

    #[error("symbol '{symbol}': volatility must be finite and >= 0, got {volatility}")]
    InvalidVolatility { symbol: String, volatility: f64 },

    #[error("{0} must be > 0")]
    ZeroSetting(&'static str),

    #[error("{setting} must be at most {max}, got {value}")]
    SettingTooLarge {
        setting: &'static str,
        value: usize,
        max: usize,
    },

    #[error("zscore_min_samples ({min}) must be between 1 and window_capacity ({capacity})")]
    InvalidMinSamples { min: usize, capacity: usize },

    #[error("spread {role} symbol '{symbol}' is not configured")]
    UnknownSpreadSymbol { role: &'static str, symbol: String },

    #[error("spread anchor and base must differ, both are '{0}'")]
    AnchorIsBase(String),

    #[error("spread ratio must be finite, got {0}")]
    InvalidRatio(f64),
}

/// HTTP-facing error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = axum::Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
