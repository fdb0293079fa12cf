use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::ServerState;
use crate::error::{AppError, AppResult};
use crate::export::{self, ExportFormat};
use crate::model::TickBatch;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ticks: usize,
    pub consumers: usize,
}

/// `GET /health`
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ticks: state.gateway.history_len(),
        consumers: state.gateway.consumer_count(),
    })
}

/// `GET /api/history`
pub async fn history(State(state): State<ServerState>) -> Json<Vec<Arc<TickBatch>>> {
    Json(state.gateway.history())
}

#[derive(Debug, Serialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<String>,
    pub anchor: String,
    pub base: String,
    pub ratio: f64,
}

/// `GET /api/symbols`
pub async fn symbols(State(state): State<ServerState>) -> Json<SymbolsResponse> {
    Json(SymbolsResponse {
        symbols: state.symbols.as_ref().clone(),
        anchor: state.anchor.to_string(),
        base: state.base.to_string(),
        ratio: state.ratio,
    })
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub symbol: String,
    pub format: Option<String>,
}

/// `GET /api/export?symbol=BTC/USD&format=csv`
pub async fn export_history(
    State(state): State<ServerState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let format = match query.format.as_deref() {
        Some(raw) => raw.parse::<ExportFormat>().map_err(AppError::BadRequest)?,
        None => ExportFormat::default(),
    };
    if !state.has_symbol(&query.symbol) {
        return Err(AppError::NotFound(format!("symbol {}", query.symbol)));
    }

    let history = state.gateway.history();
    let rows = export::symbol_series(&history, &query.symbol);
    if rows.is_empty() {
        return Err(AppError::NotFound(format!("no data for {}", query.symbol)));
    }

    let body = match format {
        ExportFormat::Csv => export::to_csv(&rows),
        ExportFormat::Json => {
            export::to_json(&rows).map_err(|e| AppError::Internal(e.to_string()))?
        }
    };
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::file_name(&query.symbol, format)
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
