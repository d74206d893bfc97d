//! Consumption loop for the ledger event channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::models::ContractEvent;
use crate::services::diagnostic_sink::DiagnosticSink;
use crate::services::response_dispatcher::ResponseDispatcher;

/// Hands every decoded ledger event to the sink and fans status requests
/// out to the dispatcher.
pub struct EventListener {
    dispatcher: Arc<ResponseDispatcher>,
    sink: Arc<DiagnosticSink>,
}

impl EventListener {
    pub fn new(dispatcher: Arc<ResponseDispatcher>, sink: Arc<DiagnosticSink>) -> Self {
        EventListener { dispatcher, sink }
    }

    /// Consumes the channel until every sender is gone. Each status request
    /// spawns its own dispatch task, keeping a slow ledger round-trip from
    /// holding up the next delivery. Duplicate deliveries simply run
    /// duplicate cycles; the listener and registry hold no per-request
    /// state for a duplicate to corrupt.
    pub async fn run(self, mut events: mpsc::Receiver<ContractEvent>) {
        info!("event listener started");

        while let Some(event) = events.recv().await {
            self.sink.record_event(&event);

            if let ContractEvent::OracleRequest(request) = event {
                let dispatcher = Arc::clone(&self.dispatcher);
                tokio::spawn(async move {
                    dispatcher.handle_status_request(&request).await;
                });
            }
        }

        info!("event channel closed, listener stopping");
    }
}
