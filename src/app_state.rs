//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::services::diagnostic_sink::DiagnosticSink;
use crate::services::oracle_registry::OracleRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<OracleRegistry>,
    pub sink: Arc<DiagnosticSink>,
}

impl AppState {
    pub fn new(registry: Arc<OracleRegistry>, sink: Arc<DiagnosticSink>) -> Self {
        Self { registry, sink }
    }
}

impl FromRef<AppState> for Arc<OracleRegistry> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.registry.clone()
    }
}

impl FromRef<AppState> for Arc<DiagnosticSink> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sink.clone()
    }
}
