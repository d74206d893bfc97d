//! Structured recording of every event and submission outcome.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{info, warn};

use crate::models::{ContractEvent, CycleSummary, SubmissionRecord};

/// Side-effect-only sink: a `tracing` emit plus counter increments per
/// record. Has no failure modes of its own, so callers never branch on it,
/// and the counters feed the stats endpoint.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    events_seen: AtomicU64,
    requests_received: AtomicU64,
    submissions_attempted: AtomicU64,
    submissions_accepted: AtomicU64,
    submissions_rejected: AtomicU64,
    cycles_completed: AtomicU64,
}

/// Point-in-time counter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SinkSnapshot {
    pub events_seen: u64,
    pub requests_received: u64,
    pub submissions_attempted: u64,
    pub submissions_accepted: u64,
    pub submissions_rejected: u64,
    pub cycles_completed: u64,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one delivered ledger event, whatever its shape. Payloads
    /// that failed to decode arrive as raw logs and are recorded as such.
    pub fn record_event(&self, event: &ContractEvent) {
        self.events_seen.fetch_add(1, Ordering::Relaxed);

        match event {
            ContractEvent::OracleRequest(request) => {
                self.requests_received.fetch_add(1, Ordering::Relaxed);
                info!(
                    index = request.index,
                    airline = ?request.airline,
                    flight = %request.flight,
                    timestamp = %request.timestamp,
                    "oracle request received"
                );
            }
            ContractEvent::OracleReport(report) => {
                info!(
                    airline = ?report.airline,
                    flight = %report.flight,
                    status = report.status_code,
                    "oracle report"
                );
            }
            ContractEvent::FlightStatusInfo(report) => {
                info!(
                    airline = ?report.airline,
                    flight = %report.flight,
                    status = report.status_code,
                    "flight status finalized"
                );
            }
            ContractEvent::OracleRegistered(registration) => {
                info!(
                    oracle = ?registration.oracle,
                    indexes = ?registration.indexes,
                    "oracle registered on ledger"
                );
            }
            ContractEvent::Lifecycle { kind, log } => {
                info!(
                    kind = ?kind,
                    contract = ?log.address,
                    data = %log.data,
                    "contract lifecycle event"
                );
            }
            ContractEvent::Unrecognized(log) => {
                warn!(
                    contract = ?log.address,
                    topic = ?log.topics.first(),
                    "unrecognized ledger event"
                );
            }
        }
    }

    /// Records one candidate submission's outcome.
    pub fn record_submission(&self, record: &SubmissionRecord) {
        self.submissions_attempted.fetch_add(1, Ordering::Relaxed);
        match &record.outcome {
            Ok(tx_hash) => {
                self.submissions_accepted.fetch_add(1, Ordering::Relaxed);
                info!(
                    oracle = ?record.oracle,
                    index = record.index,
                    status = record.status.code(),
                    tx = ?tx_hash,
                    "oracle response accepted"
                );
            }
            Err(err) => {
                self.submissions_rejected.fetch_add(1, Ordering::Relaxed);
                warn!(
                    oracle = ?record.oracle,
                    index = record.index,
                    status = record.status.code(),
                    error = %err,
                    "oracle response rejected"
                );
            }
        }
    }

    /// Records the aggregate of one finished dispatch cycle.
    pub fn record_cycle(&self, summary: &CycleSummary) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
        info!(
            flight = %summary.flight,
            airline = ?summary.airline,
            attempted = summary.attempted,
            accepted = summary.accepted,
            rejected = summary.rejected,
            "dispatch cycle completed"
        );
    }

    pub fn snapshot(&self) -> SinkSnapshot {
        SinkSnapshot {
            events_seen: self.events_seen.load(Ordering::Relaxed),
            requests_received: self.requests_received.load(Ordering::Relaxed),
            submissions_attempted: self.submissions_attempted.load(Ordering::Relaxed),
            submissions_accepted: self.submissions_accepted.load(Ordering::Relaxed),
            submissions_rejected: self.submissions_rejected.load(Ordering::Relaxed),
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
        }
    }
}
