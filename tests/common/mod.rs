//! Shared test doubles for the integration suites.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ethers_core::types::{Address, H256, U256};

use flightsurety_oracle::error::LedgerError;
use flightsurety_oracle::ledger::LedgerClient;
use flightsurety_oracle::models::StatusRequest;

/// One response submission exactly as the scripted ledger received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSubmission {
    pub oracle: Address,
    pub index: u8,
    pub airline: Address,
    pub flight: String,
    pub timestamp: U256,
    pub status_code: u8,
}

/// In-memory stand-in for a ledger node, scripted per test. Every write is
/// recorded before the scripted outcome is applied, so tests can assert on
/// attempts as well as acceptances.
pub struct ScriptedLedger {
    pub accounts: Vec<Address>,
    pub fee: U256,
    pub indexes: HashMap<Address, [u8; 3]>,
    pub fail_registration_of: Option<Address>,
    pub reject_submissions: bool,
    pub fee_reads: AtomicU64,
    pub registrations: Mutex<Vec<(Address, U256)>>,
    pub submissions: Mutex<Vec<RecordedSubmission>>,
}

impl ScriptedLedger {
    /// A ledger with `count` unlocked accounts, each pre-assigned a
    /// deterministic index triple.
    pub fn with_accounts(count: usize) -> Self {
        let accounts: Vec<Address> = (0..count)
            .map(|i| Address::repeat_byte(i as u8 + 1))
            .collect();
        let indexes = accounts
            .iter()
            .enumerate()
            .map(|(i, &addr)| {
                let base = (i % 8) as u8;
                (addr, [base, base + 1, base + 2])
            })
            .collect();
        ScriptedLedger {
            accounts,
            fee: U256::exp10(18),
            indexes,
            fail_registration_of: None,
            reject_submissions: false,
            fee_reads: AtomicU64::new(0),
            registrations: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    fn revert() -> LedgerError {
        LedgerError::Rpc {
            code: -32000,
            message: "VM Exception while processing transaction: revert".into(),
        }
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn accounts(&self) -> Result<Vec<Address>, LedgerError> {
        Ok(self.accounts.clone())
    }

    async fn registration_fee(&self) -> Result<U256, LedgerError> {
        self.fee_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.fee)
    }

    async fn my_indexes(&self, oracle: Address) -> Result<[u8; 3], LedgerError> {
        self.indexes.get(&oracle).copied().ok_or_else(Self::revert)
    }

    async fn register_oracle(&self, oracle: Address, fee: U256) -> Result<H256, LedgerError> {
        if self.fail_registration_of == Some(oracle) {
            return Err(Self::revert());
        }
        self.registrations.lock().unwrap().push((oracle, fee));
        Ok(H256::repeat_byte(0x42))
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
        self.submissions.lock().unwrap().push(RecordedSubmission {
            oracle,
            index,
            airline,
            flight: flight.to_string(),
            timestamp,
            status_code,
        });
        if self.reject_submissions {
            return Err(Self::revert());
        }
        Ok(H256::repeat_byte(0x24))
    }
}

/// A status request for the dapp's demo flight.
pub fn status_request(index: u8) -> StatusRequest {
    StatusRequest {
        index,
        airline: Address::repeat_byte(0xaa),
        flight: "ND1309".into(),
        timestamp: U256::from(1_554_214_600u64),
    }
}

/// Polls `check` until it passes or roughly one second elapses.
pub async fn wait_until(check: impl Fn() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within one second");
}
