//! WebSocket log subscription feeding the event listener channel.

use ethers_core::types::Address;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::LedgerError;
use crate::ledger::abi::EventDecoder;
use crate::ledger::rpc::rpc_error;
use crate::models::{ContractEvent, RawLog};

/// Connects to the node's WebSocket endpoint, subscribes to logs from the
/// given contracts and pushes each decoded event onto `events`.
///
/// Runs until the transport closes or fails; there is no reconnect here.
/// A dead subscription ends the process, and restarting is the supervisor's
/// job. Returns `Ok` when the stream ends cleanly or the receiving side is
/// gone, `Err` on transport failure or a rejected subscribe call.
pub async fn pump_logs(
    ws_url: &str,
    contracts: &[Address],
    events: mpsc::Sender<ContractEvent>,
) -> Result<(), LedgerError> {
    let (mut socket, _) = connect_async(ws_url).await?;

    let addresses: Vec<String> = contracts.iter().map(|a| format!("{a:#x}")).collect();
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_subscribe",
        "params": ["logs", { "address": addresses }],
    });
    socket.send(Message::Text(request.to_string())).await?;

    let decoder = EventDecoder::new();

    while let Some(message) = socket.next().await {
        match message? {
            Message::Text(text) => {
                let Ok(frame) = serde_json::from_str::<Value>(&text) else {
                    warn!(payload = %text, "discarding unparseable subscription frame");
                    continue;
                };

                if let Some(log) = notification_log(&frame) {
                    let event = decoder.decode(log);
                    if events.send(event).await.is_err() {
                        // Receiver gone; nothing left to deliver to.
                        return Ok(());
                    }
                } else if let Some(error) = frame.get("error").filter(|e| !e.is_null()) {
                    return Err(rpc_error(error));
                } else if let Some(subscription) = frame.get("result").and_then(Value::as_str) {
                    info!(subscription, "ledger log subscription established");
                } else {
                    debug!(frame = %text, "ignoring unexpected subscription frame");
                }
            }
            Message::Ping(payload) => socket.send(Message::Pong(payload)).await?,
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!("ledger log stream ended");
    Ok(())
}

/// Extracts the raw log from an `eth_subscription` notification frame.
/// Anything else (the subscribe ack, errors, stray frames) yields `None`.
fn notification_log(frame: &Value) -> Option<RawLog> {
    if frame.get("method").and_then(Value::as_str) != Some("eth_subscription") {
        return None;
    }
    let result = frame.pointer("/params/result")?;
    serde_json::from_value(result.clone()).ok()
}
