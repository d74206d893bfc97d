//! The oracle registry and its one-time bootstrap.

use tracing::{debug, info};

use crate::error::{BootstrapError, RegistrationError};
use crate::ledger::LedgerClient;
use crate::models::Oracle;
use crate::services::account_pool::AccountPool;

/// The set of oracles this server controls. [`OracleRegistry::bootstrap`]
/// is the only constructor and the type has no mutation API, so a failed
/// bootstrap can never leave a partially registered value behind and the
/// registry is safely shared without locks once built.
pub struct OracleRegistry {
    oracles: Vec<Oracle>,
}

impl OracleRegistry {
    /// Registers up to `target_count` pool identities as oracles and stores
    /// each one's ledger-assigned index triple. All or nothing: the first
    /// failed registration or index lookup aborts the whole run with the
    /// identity that failed.
    ///
    /// Registrations run strictly in sequence. They all flow through the
    /// same node connection, and overlapping transactions from the same
    /// accounts would race nonces.
    pub async fn bootstrap(
        ledger: &dyn LedgerClient,
        pool: &AccountPool,
        target_count: usize,
    ) -> Result<Self, BootstrapError> {
        let fee = ledger.registration_fee().await.map_err(BootstrapError::Fee)?;
        let count = target_count.min(pool.len());
        info!(count, fee = %fee, "registering oracle pool");

        let mut oracles: Vec<Oracle> = Vec::with_capacity(count);
        for &identity in pool.identities().iter().take(count) {
            // Re-registering an identity reverts on chain; a pool slot that
            // repeats an earlier one is already covered.
            if oracles.iter().any(|oracle| oracle.address == identity) {
                debug!(?identity, "identity already registered, skipping");
                continue;
            }

            ledger
                .register_oracle(identity, fee)
                .await
                .map_err(|source| RegistrationError { identity, source })?;
            let indexes = ledger
                .my_indexes(identity)
                .await
                .map_err(|source| RegistrationError { identity, source })?;

            debug!(?identity, ?indexes, "oracle registered");
            oracles.push(Oracle {
                address: identity,
                indexes,
            });
        }

        info!(oracles = oracles.len(), "oracle registry ready");
        Ok(OracleRegistry { oracles })
    }

    pub fn oracles(&self) -> &[Oracle] {
        &self.oracles
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use ethers_core::types::{Address, H256, U256};

    use crate::error::LedgerError;

    struct ScriptedChain {
        fee: U256,
        indexes: HashMap<Address, [u8; 3]>,
        fail_registration_of: Option<Address>,
        fee_reads: AtomicU64,
        registrations: Mutex<Vec<(Address, U256)>>,
    }

    impl ScriptedChain {
        fn for_accounts(accounts: &[Address]) -> Self {
            let indexes = accounts
                .iter()
                .enumerate()
                .map(|(i, &addr)| {
                    let base = (i % 8) as u8;
                    (addr, [base, base + 1, base + 2])
                })
                .collect();
            ScriptedChain {
                fee: U256::exp10(18),
                indexes,
                fail_registration_of: None,
                fee_reads: AtomicU64::new(0),
                registrations: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LedgerClient for ScriptedChain {
        async fn accounts(&self) -> Result<Vec<Address>, LedgerError> {
            Ok(self.indexes.keys().copied().collect())
        }

        async fn registration_fee(&self) -> Result<U256, LedgerError> {
            self.fee_reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.fee)
        }

        async fn my_indexes(&self, oracle: Address) -> Result<[u8; 3], LedgerError> {
            self.indexes
                .get(&oracle)
                .copied()
                .ok_or_else(|| LedgerError::Rpc {
                    code: -32000,
                    message: "revert Not registered as an oracle".into(),
                })
        }

        async fn register_oracle(&self, oracle: Address, fee: U256) -> Result<H256, LedgerError> {
            if self.fail_registration_of == Some(oracle) {
                return Err(LedgerError::Rpc {
                    code: -32000,
                    message: "VM Exception while processing transaction: revert".into(),
                });
            }
            self.registrations.lock().unwrap().push((oracle, fee));
            Ok(H256::repeat_byte(0x42))
        }

        async fn submit_oracle_response(
            &self,
            _oracle: Address,
            _index: u8,
            _airline: Address,
            _flight: &str,
            _timestamp: U256,
            _status_code: u8,
        ) -> Result<H256, LedgerError> {
            unimplemented!("not used during bootstrap")
        }
    }

    fn accounts(count: usize) -> Vec<Address> {
        (0..count)
            .map(|i| Address::repeat_byte(i as u8 + 1))
            .collect()
    }

    #[tokio::test]
    async fn bootstrap_registers_exactly_target_count() {
        let pool_accounts = accounts(20);
        let chain = ScriptedChain::for_accounts(&pool_accounts);
        let pool = AccountPool::from(pool_accounts);

        let registry = OracleRegistry::bootstrap(&chain, &pool, 12).await.unwrap();

        assert_eq!(registry.len(), 12);
        for oracle in registry.oracles() {
            assert_eq!(oracle.indexes, chain.indexes[&oracle.address]);
        }
    }

    #[tokio::test]
    async fn bootstrap_is_capped_by_pool_size() {
        let pool_accounts = accounts(4);
        let chain = ScriptedChain::for_accounts(&pool_accounts);
        let pool = AccountPool::from(pool_accounts);

        let registry = OracleRegistry::bootstrap(&chain, &pool, 20).await.unwrap();

        assert_eq!(registry.len(), 4);
        assert_eq!(chain.registrations.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn every_registration_attaches_the_fee_read_once() {
        let pool_accounts = accounts(6);
        let chain = ScriptedChain::for_accounts(&pool_accounts);
        let pool = AccountPool::from(pool_accounts);

        OracleRegistry::bootstrap(&chain, &pool, 6).await.unwrap();

        assert_eq!(chain.fee_reads.load(Ordering::SeqCst), 1);
        let registrations = chain.registrations.lock().unwrap();
        assert!(registrations.iter().all(|(_, fee)| *fee == chain.fee));
    }

    #[tokio::test]
    async fn a_reverted_registration_aborts_the_whole_bootstrap() {
        let pool_accounts = accounts(20);
        let failing = pool_accounts[4];
        let mut chain = ScriptedChain::for_accounts(&pool_accounts);
        chain.fail_registration_of = Some(failing);
        let pool = AccountPool::from(pool_accounts);

        let result = OracleRegistry::bootstrap(&chain, &pool, 20).await;

        match result {
            Err(BootstrapError::Registration(err)) => assert_eq!(err.identity, failing),
            Err(other) => panic!("expected registration error, got {other}"),
            Ok(registry) => panic!("bootstrap produced {} oracles", registry.len()),
        }
        // The loop stopped at the failure; identities after the fifth were
        // never touched.
        assert_eq!(chain.registrations.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn a_failed_fee_read_is_fatal() {
        struct NoFee;

        #[async_trait]
        impl LedgerClient for NoFee {
            async fn accounts(&self) -> Result<Vec<Address>, LedgerError> {
                Ok(Vec::new())
            }

            async fn registration_fee(&self) -> Result<U256, LedgerError> {
                Err(LedgerError::Response("no fee".into()))
            }

            async fn my_indexes(&self, _oracle: Address) -> Result<[u8; 3], LedgerError> {
                unreachable!()
            }

            async fn register_oracle(
                &self,
                _oracle: Address,
                _fee: U256,
            ) -> Result<H256, LedgerError> {
                unreachable!()
            }

            async fn submit_oracle_response(
                &self,
                _oracle: Address,
                _index: u8,
                _airline: Address,
                _flight: &str,
                _timestamp: U256,
                _status_code: u8,
            ) -> Result<H256, LedgerError> {
                unreachable!()
            }
        }

        let pool = AccountPool::from(accounts(3));
        assert!(matches!(
            OracleRegistry::bootstrap(&NoFee, &pool, 3).await,
            Err(BootstrapError::Fee(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_pool_entries_are_registered_once() {
        let unique = accounts(3);
        let chain = ScriptedChain::for_accounts(&unique);
        let mut with_duplicate = unique.clone();
        with_duplicate.push(unique[0]);
        let pool = AccountPool::from(with_duplicate);

        let registry = OracleRegistry::bootstrap(&chain, &pool, 4).await.unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(chain.registrations.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn zero_target_registers_nothing() {
        let pool_accounts = accounts(5);
        let chain = ScriptedChain::for_accounts(&pool_accounts);
        let pool = AccountPool::from(pool_accounts);

        let registry = OracleRegistry::bootstrap(&chain, &pool, 0).await.unwrap();

        assert!(registry.is_empty());
        assert!(chain.registrations.lock().unwrap().is_empty());
    }
}
