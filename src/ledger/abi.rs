//! ABI plumbing for the two FlightSurety contracts: call data for the oracle
//! protocol functions and decoding of subscribed logs into typed events.
//!
//! The contracts are external collaborators; their function and event
//! signatures are declared here and nowhere else.

use std::collections::HashMap;

use ethers_core::abi::{decode, encode, ParamType, Token};
use ethers_core::types::{Address, Bytes, H256, U256};
use ethers_core::utils::keccak256;

use crate::error::LedgerError;
use crate::models::{
    ContractEvent, EventKind, FlightStatusReport, OracleRegistration, RawLog, StatusRequest,
};

const REGISTRATION_FEE_SIG: &str = "REGISTRATION_FEE()";
const REGISTER_ORACLE_SIG: &str = "registerOracle()";
const MY_INDEXES_SIG: &str = "getMyIndexes()";
const SUBMIT_RESPONSE_SIG: &str = "submitOracleResponse(uint8,address,string,uint256,uint8)";

/// Solidity signature of each subscribed event.
fn event_signature(kind: EventKind) -> &'static str {
    match kind {
        EventKind::OracleRequest => "OracleRequest(uint8,address,string,uint256)",
        EventKind::OracleReport => "OracleReport(address,string,uint256,uint8)",
        EventKind::FlightStatusInfo => "FlightStatusInfo(address,string,uint256,uint8)",
        EventKind::OracleRegistered => "OracleRegistered(address,uint8[3])",
        EventKind::AirlineRegistration => "AirlineRegistration(address,string)",
        EventKind::AirlineFunding => "AirlineFunding(address,uint256)",
        EventKind::FlightRegistration => "FlightRegistration(address,string,uint256)",
        EventKind::PassengerInsurance => "PassengerInsurance(address,bytes32,uint256)",
        EventKind::ProcessFlightStatus => "ProcessFlightStatus(bytes32,uint8)",
        EventKind::PassengerCredited => "PassengerCredited(address,uint256)",
        EventKind::PassengerPaid => "PassengerPaid(address,uint256)",
        EventKind::AirlineModifyName => "AirlineModifyName(address,string)",
    }
}

/// First log topic of an event, `keccak256` of its signature.
pub fn event_topic(kind: EventKind) -> H256 {
    H256::from(keccak256(event_signature(kind)))
}

fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature);
    [hash[0], hash[1], hash[2], hash[3]]
}

fn encode_call(signature: &str, tokens: &[Token]) -> Bytes {
    let mut data = selector(signature).to_vec();
    data.extend(encode(tokens));
    Bytes::from(data)
}

pub fn registration_fee_call() -> Bytes {
    encode_call(REGISTRATION_FEE_SIG, &[])
}

pub fn register_oracle_call() -> Bytes {
    encode_call(REGISTER_ORACLE_SIG, &[])
}

pub fn my_indexes_call() -> Bytes {
    encode_call(MY_INDEXES_SIG, &[])
}

pub fn submit_oracle_response_call(
    index: u8,
    airline: Address,
    flight: &str,
    timestamp: U256,
    status_code: u8,
) -> Bytes {
    encode_call(
        SUBMIT_RESPONSE_SIG,
        &[
            Token::Uint(U256::from(index)),
            Token::Address(airline),
            Token::String(flight.to_owned()),
            Token::Uint(timestamp),
            Token::Uint(U256::from(status_code)),
        ],
    )
}

/// Decodes the single `uint256` returned by `REGISTRATION_FEE()`.
pub fn decode_uint256(output: &[u8]) -> Result<U256, LedgerError> {
    let tokens = decode_output(output, &[ParamType::Uint(256)])?;
    token_uint(&tokens[0])
}

/// Decodes the `uint8[3]` returned by `getMyIndexes()`.
pub fn decode_index_triple(output: &[u8]) -> Result<[u8; 3], LedgerError> {
    let tokens = decode_output(
        output,
        &[ParamType::FixedArray(Box::new(ParamType::Uint(8)), 3)],
    )?;
    index_triple(&tokens[0])
}

fn decode_output(output: &[u8], types: &[ParamType]) -> Result<Vec<Token>, LedgerError> {
    decode(types, output).map_err(|err| LedgerError::Decode(err.to_string()))
}

fn token_uint(token: &Token) -> Result<U256, LedgerError> {
    match token {
        Token::Uint(value) => Ok(*value),
        other => Err(LedgerError::Decode(format!("expected uint, got {other}"))),
    }
}

fn token_u8(token: &Token) -> Result<u8, LedgerError> {
    let value = token_uint(token)?;
    if value > U256::from(u8::MAX) {
        return Err(LedgerError::Decode(format!("uint8 out of range: {value}")));
    }
    Ok(value.low_u64() as u8)
}

fn token_address(token: &Token) -> Result<Address, LedgerError> {
    match token {
        Token::Address(value) => Ok(*value),
        other => Err(LedgerError::Decode(format!("expected address, got {other}"))),
    }
}

fn token_string(token: &Token) -> Result<String, LedgerError> {
    match token {
        Token::String(value) => Ok(value.clone()),
        other => Err(LedgerError::Decode(format!("expected string, got {other}"))),
    }
}

fn index_triple(token: &Token) -> Result<[u8; 3], LedgerError> {
    match token {
        Token::FixedArray(items) if items.len() == 3 => Ok([
            token_u8(&items[0])?,
            token_u8(&items[1])?,
            token_u8(&items[2])?,
        ]),
        other => Err(LedgerError::Decode(format!(
            "expected uint8[3], got {other}"
        ))),
    }
}

/// Maps raw subscription logs to typed [`ContractEvent`]s by topic.
pub struct EventDecoder {
    by_topic: HashMap<H256, EventKind>,
}

impl EventDecoder {
    pub fn new() -> Self {
        let by_topic = EventKind::ALL
            .into_iter()
            .map(|kind| (event_topic(kind), kind))
            .collect();
        EventDecoder { by_topic }
    }

    /// Never fails: logs with unknown topics become `Unrecognized`, and a
    /// known stream whose payload does not decode is still recorded under
    /// its kind with the raw log attached.
    pub fn decode(&self, log: RawLog) -> ContractEvent {
        let Some(kind) = log.topics.first().and_then(|t| self.by_topic.get(t)) else {
            return ContractEvent::Unrecognized(log);
        };

        match kind {
            EventKind::OracleRequest => match decode_status_request(&log.data) {
                Ok(request) => ContractEvent::OracleRequest(request),
                Err(_) => ContractEvent::Lifecycle {
                    kind: EventKind::OracleRequest,
                    log,
                },
            },
            EventKind::OracleReport => match decode_status_report(&log.data) {
                Ok(report) => ContractEvent::OracleReport(report),
                Err(_) => ContractEvent::Lifecycle {
                    kind: EventKind::OracleReport,
                    log,
                },
            },
            EventKind::FlightStatusInfo => match decode_status_report(&log.data) {
                Ok(report) => ContractEvent::FlightStatusInfo(report),
                Err(_) => ContractEvent::Lifecycle {
                    kind: EventKind::FlightStatusInfo,
                    log,
                },
            },
            EventKind::OracleRegistered => match decode_oracle_registration(&log.data) {
                Ok(registration) => ContractEvent::OracleRegistered(registration),
                Err(_) => ContractEvent::Lifecycle {
                    kind: EventKind::OracleRegistered,
                    log,
                },
            },
            lifecycle => ContractEvent::Lifecycle {
                kind: *lifecycle,
                log,
            },
        }
    }
}

impl Default for EventDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_status_request(data: &[u8]) -> Result<StatusRequest, LedgerError> {
    let tokens = decode_output(
        data,
        &[
            ParamType::Uint(8),
            ParamType::Address,
            ParamType::String,
            ParamType::Uint(256),
        ],
    )?;
    Ok(StatusRequest {
        index: token_u8(&tokens[0])?,
        airline: token_address(&tokens[1])?,
        flight: token_string(&tokens[2])?,
        timestamp: token_uint(&tokens[3])?,
    })
}

fn decode_status_report(data: &[u8]) -> Result<FlightStatusReport, LedgerError> {
    let tokens = decode_output(
        data,
        &[
            ParamType::Address,
            ParamType::String,
            ParamType::Uint(256),
            ParamType::Uint(8),
        ],
    )?;
    Ok(FlightStatusReport {
        airline: token_address(&tokens[0])?,
        flight: token_string(&tokens[1])?,
        timestamp: token_uint(&tokens[2])?,
        status_code: token_u8(&tokens[3])?,
    })
}

fn decode_oracle_registration(data: &[u8]) -> Result<OracleRegistration, LedgerError> {
    let tokens = decode_output(
        data,
        &[
            ParamType::Address,
            ParamType::FixedArray(Box::new(ParamType::Uint(8)), 3),
        ],
    )?;
    Ok(OracleRegistration {
        oracle: token_address(&tokens[0])?,
        indexes: index_triple(&tokens[1])?,
    })
}
