//! JSON-RPC implementation of [`LedgerClient`] against a development node
//! with unlocked accounts (Ganache-style).

use async_trait::async_trait;
use ethers_core::types::{Address, Bytes, H256, U256};
use reqwest::Client;
use serde_json::{json, Value};

use crate::error::LedgerError;
use crate::ledger::{abi, LedgerClient};

/// Gas limit attached to every write, matching what the dapp's own
/// transactions use.
const WRITE_GAS_LIMIT: u64 = 1_000_000;

pub struct JsonRpcLedger {
    http: Client,
    rpc_url: String,
    app_address: Address,
}

impl JsonRpcLedger {
    pub fn new(rpc_url: String, app_address: Address) -> Self {
        Self {
            http: Client::new(),
            rpc_url,
            app_address,
        }
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let response = self
            .http
            .post(&self.rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": "flightsurety-oracle",
                "method": method,
                "params": params,
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            return Err(rpc_error(error));
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| LedgerError::Response("response carries neither result nor error".into()))
    }

    async fn eth_call(&self, from: Option<Address>, data: Bytes) -> Result<Vec<u8>, LedgerError> {
        let params = json!([call_params(self.app_address, from, &data), "latest"]);
        let result = self.rpc_call("eth_call", params).await?;
        decode_hex_value(&result)
    }

    async fn send_transaction(
        &self,
        from: Address,
        value: Option<U256>,
        data: Bytes,
    ) -> Result<H256, LedgerError> {
        let params = json!([transaction_params(from, self.app_address, value, &data)]);
        let result = self.rpc_call("eth_sendTransaction", params).await?;
        parse_tx_hash(&result)
    }
}

#[async_trait]
impl LedgerClient for JsonRpcLedger {
    async fn accounts(&self) -> Result<Vec<Address>, LedgerError> {
        let result = self.rpc_call("eth_accounts", json!([])).await?;
        let entries = result
            .as_array()
            .ok_or_else(|| LedgerError::Response(format!("expected account array, got {result}")))?;
        entries.iter().map(parse_address).collect()
    }

    async fn registration_fee(&self) -> Result<U256, LedgerError> {
        let output = self.eth_call(None, abi::registration_fee_call()).await?;
        abi::decode_uint256(&output)
    }

    async fn my_indexes(&self, oracle: Address) -> Result<[u8; 3], LedgerError> {
        let output = self.eth_call(Some(oracle), abi::my_indexes_call()).await?;
        abi::decode_index_triple(&output)
    }

    async fn register_oracle(&self, oracle: Address, fee: U256) -> Result<H256, LedgerError> {
        self.send_transaction(oracle, Some(fee), abi::register_oracle_call())
            .await
    }

    async fn submit_oracle_response(
        &self,
        oracle: Address,
        index: u8,
        airline: Address,
        flight: &str,
        timestamp: U256,
        status_code: u8,
    ) -> Result<H256, LedgerError> {
        let data = abi::submit_oracle_response_call(index, airline, flight, timestamp, status_code);
        self.send_transaction(oracle, None, data).await
    }
}

/// Maps a JSON-RPC error object to [`LedgerError::Rpc`], keeping the node's
/// revert message intact.
pub(crate) fn rpc_error(error: &Value) -> LedgerError {
    let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown rpc error")
        .to_string();
    LedgerError::Rpc { code, message }
}

fn call_params(to: Address, from: Option<Address>, data: &Bytes) -> Value {
    let mut call = json!({
        "to": format!("{to:#x}"),
        "data": format!("0x{}", hex::encode(data)),
    });
    if let Some(from) = from {
        call["from"] = json!(format!("{from:#x}"));
    }
    call
}

fn transaction_params(from: Address, to: Address, value: Option<U256>, data: &Bytes) -> Value {
    let mut tx = json!({
        "from": format!("{from:#x}"),
        "to": format!("{to:#x}"),
        "gas": format!("{WRITE_GAS_LIMIT:#x}"),
        "data": format!("0x{}", hex::encode(data)),
    });
    if let Some(value) = value {
        tx["value"] = json!(format!("{value:#x}"));
    }
    tx
}

fn decode_hex_value(value: &Value) -> Result<Vec<u8>, LedgerError> {
    let text = value
        .as_str()
        .ok_or_else(|| LedgerError::Response(format!("expected hex string, got {value}")))?;
    hex::decode(text.trim_start_matches("0x"))
        .map_err(|err| LedgerError::Response(format!("invalid hex payload {text:?}: {err}")))
}

fn parse_tx_hash(value: &Value) -> Result<H256, LedgerError> {
    let text = value
        .as_str()
        .ok_or_else(|| LedgerError::Response(format!("expected transaction hash, got {value}")))?;
    text.parse()
        .map_err(|err| LedgerError::Response(format!("invalid transaction hash {text:?}: {err}")))
}

fn parse_address(value: &Value) -> Result<Address, LedgerError> {
    let text = value
        .as_str()
        .ok_or_else(|| LedgerError::Response(format!("expected address string, got {value}")))?;
    text.parse()
        .map_err(|err| LedgerError::Response(format!("invalid account address {text:?}: {err}")))
}
