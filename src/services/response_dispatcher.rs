//! Submission fan-out for flight status requests.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::debug;

use crate::config::ResponsePolicy;
use crate::ledger::LedgerClient;
use crate::models::{CycleSummary, Oracle, StatusRequest, SubmissionRecord};
use crate::services::diagnostic_sink::DiagnosticSink;
use crate::services::oracle_registry::OracleRegistry;
use crate::services::status_source::StatusSource;

/// Answers a status request with one candidate response per (oracle, index)
/// pair the policy selects. The dispatcher holds only shared read-only
/// state, so any number of cycles can run concurrently.
pub struct ResponseDispatcher {
    ledger: Arc<dyn LedgerClient>,
    registry: Arc<OracleRegistry>,
    status_source: Arc<dyn StatusSource>,
    policy: ResponsePolicy,
    sink: Arc<DiagnosticSink>,
}

impl ResponseDispatcher {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        registry: Arc<OracleRegistry>,
        status_source: Arc<dyn StatusSource>,
        policy: ResponsePolicy,
        sink: Arc<DiagnosticSink>,
    ) -> Self {
        Self {
            ledger,
            registry,
            status_source,
            policy,
            sink,
        }
    }

    /// Runs one dispatch cycle. Every selected submission is attempted and
    /// its outcome recorded; rejections are expected (wrong index, request
    /// already closed) and never cut the cycle short. The cycle itself
    /// cannot fail, it only completes with fewer acceptances.
    pub async fn handle_status_request(&self, request: &StatusRequest) -> CycleSummary {
        debug!(
            index = request.index,
            flight = %request.flight,
            oracles = self.registry.len(),
            "dispatching status request"
        );

        let per_oracle = self
            .registry
            .oracles()
            .iter()
            .map(|oracle| self.submit_for_oracle(oracle, request));
        let records: Vec<SubmissionRecord> =
            join_all(per_oracle).await.into_iter().flatten().collect();

        let summary = CycleSummary::from_records(request, &records);
        self.sink.record_cycle(&summary);
        summary
    }

    /// One oracle's share of the cycle. The status code is drawn once per
    /// oracle, and its submissions go out strictly in order: they leave the
    /// same account, so interleaving them would race nonces. Different
    /// oracles' calls still overlap freely through `join_all`.
    async fn submit_for_oracle(
        &self,
        oracle: &Oracle,
        request: &StatusRequest,
    ) -> Vec<SubmissionRecord> {
        let status = self.status_source.draw();
        let indexes = self.candidate_indexes(oracle, request);

        let mut records = Vec::with_capacity(indexes.len());
        for index in indexes {
            let outcome = self
                .ledger
                .submit_oracle_response(
                    oracle.address,
                    index,
                    request.airline,
                    &request.flight,
                    request.timestamp,
                    status.code(),
                )
                .await;

            let record = SubmissionRecord {
                oracle: oracle.address,
                index,
                status,
                outcome,
            };
            self.sink.record_submission(&record);
            records.push(record);
        }
        records
    }

    fn candidate_indexes(&self, oracle: &Oracle, request: &StatusRequest) -> Vec<u8> {
        match self.policy {
            ResponsePolicy::AllIndexes => oracle.indexes.to_vec(),
            ResponsePolicy::MatchingIndex => oracle
                .indexes
                .iter()
                .copied()
                .filter(|&index| index == request.index)
                .collect(),
        }
    }
}
