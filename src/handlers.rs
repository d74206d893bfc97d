//! API handlers for the oracle server

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::models::{ApiResponse, RegistryView};
use crate::services::diagnostic_sink::{DiagnosticSink, SinkSnapshot};
use crate::services::oracle_registry::OracleRegistry;

pub async fn root() -> &'static str {
    "FlightSurety Oracle Server"
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// The dapp's info endpoint. The payload is what the dapp expects word for
/// word; do not wrap it.
pub async fn dapp_info() -> Json<Value> {
    Json(json!({
        "message": "An API for use with your Dapp!"
    }))
}

/// Registered oracles with their ledger-assigned index sets.
pub async fn list_oracles(
    State(registry): State<Arc<OracleRegistry>>,
) -> Json<ApiResponse<RegistryView>> {
    Json(ApiResponse::ok(RegistryView {
        count: registry.len(),
        oracles: registry.oracles().to_vec(),
    }))
}

/// Counter snapshot from the diagnostic sink.
pub async fn get_stats(State(sink): State<Arc<DiagnosticSink>>) -> Json<ApiResponse<SinkSnapshot>> {
    Json(ApiResponse::ok(sink.snapshot()))
}
