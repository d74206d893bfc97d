//! Data models for the oracle server.

use ethers_core::types::{Address, Bytes, H256, U256};
use serde::{Deserialize, Serialize};

/// Flight status codes understood by the ledger's payout logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlightStatus {
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    /// Every status code the contract understands.
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    /// The four delay categories, the default draw pool for simulated answers.
    pub const LATE: [FlightStatus; 4] = [
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    /// On-chain numeric code.
    pub const fn code(self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        FlightStatus::ALL.into_iter().find(|s| s.code() == code)
    }
}

/// A registered oracle identity together with the index set the ledger
/// assigned to it. The index set is opaque to the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Oracle {
    pub address: Address,
    pub indexes: [u8; 3],
}

impl Oracle {
    pub fn holds_index(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Payload of an `OracleRequest` event: the ledger is asking for the status
/// of one flight, targeting oracles that hold `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRequest {
    pub index: u8,
    pub airline: Address,
    pub flight: String,
    pub timestamp: U256,
}

/// Payload shared by `OracleReport` and `FlightStatusInfo` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightStatusReport {
    pub airline: Address,
    pub flight: String,
    pub timestamp: U256,
    pub status_code: u8,
}

/// Payload of an `OracleRegistered` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRegistration {
    pub oracle: Address,
    pub indexes: [u8; 3],
}

/// An undecoded log as delivered by `eth_subscribe`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub topics: Vec<H256>,
    #[serde(default)]
    pub data: Bytes,
}

/// Every event stream the server watches. Only `OracleRequest` drives
/// dispatch; the rest are recorded for visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    OracleRequest,
    OracleReport,
    FlightStatusInfo,
    OracleRegistered,
    AirlineRegistration,
    AirlineFunding,
    FlightRegistration,
    PassengerInsurance,
    ProcessFlightStatus,
    PassengerCredited,
    PassengerPaid,
    AirlineModifyName,
}

impl EventKind {
    /// All twelve subscribed streams, app contract first.
    pub const ALL: [EventKind; 12] = [
        EventKind::OracleRequest,
        EventKind::OracleReport,
        EventKind::FlightStatusInfo,
        EventKind::OracleRegistered,
        EventKind::AirlineRegistration,
        EventKind::AirlineFunding,
        EventKind::FlightRegistration,
        EventKind::PassengerInsurance,
        EventKind::ProcessFlightStatus,
        EventKind::PassengerCredited,
        EventKind::PassengerPaid,
        EventKind::AirlineModifyName,
    ];
}

/// A typed event message crossing the listener channel.
#[derive(Debug, Clone)]
pub enum ContractEvent {
    OracleRequest(StatusRequest),
    OracleReport(FlightStatusReport),
    FlightStatusInfo(FlightStatusReport),
    OracleRegistered(OracleRegistration),
    /// Insurance lifecycle event from the data contract, kept raw.
    Lifecycle { kind: EventKind, log: RawLog },
    /// A log whose topic matched no known event signature.
    Unrecognized(RawLog),
}

/// Outcome of one candidate response submission.
#[derive(Debug)]
pub struct SubmissionRecord {
    pub oracle: Address,
    pub index: u8,
    pub status: FlightStatus,
    pub outcome: Result<H256, crate::error::LedgerError>,
}

impl SubmissionRecord {
    pub fn accepted(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Aggregate of one dispatch cycle. There is no failed variant: a cycle that
/// saw every submission rejected still completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub airline: Address,
    pub flight: String,
    pub timestamp: U256,
    pub attempted: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl CycleSummary {
    pub fn from_records(request: &StatusRequest, records: &[SubmissionRecord]) -> Self {
        let accepted = records.iter().filter(|r| r.accepted()).count();
        CycleSummary {
            airline: request.airline,
            flight: request.flight.clone(),
            timestamp: request.timestamp,
            attempted: records.len(),
            accepted,
            rejected: records.len() - accepted,
        }
    }
}

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// `/api/oracles` view of the registry.
#[derive(Debug, Serialize)]
pub struct RegistryView {
    pub count: usize,
    pub oracles: Vec<Oracle>,
}
