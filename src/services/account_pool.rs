//! The ordered pool of signer identities available to the simulator.

use ethers_core::types::Address;

use crate::error::LedgerError;
use crate::ledger::LedgerClient;

/// Immutable, ordered list of the node's unlocked accounts. Pure data
/// supplier: the registry takes the leading slice at bootstrap and this
/// type never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPool {
    identities: Vec<Address>,
}

impl AccountPool {
    /// Enumerates the node's accounts once. Fails when the node cannot be
    /// reached or answers with something other than addresses.
    pub async fn load(ledger: &dyn LedgerClient) -> Result<Self, LedgerError> {
        let identities = ledger.accounts().await?;
        Ok(AccountPool { identities })
    }

    pub fn identities(&self) -> &[Address] {
        &self.identities
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl From<Vec<Address>> for AccountPool {
    fn from(identities: Vec<Address>) -> Self {
        AccountPool { identities }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ethers_core::types::{H256, U256};

    struct AccountsOnly(Vec<Address>);

    #[async_trait]
    impl LedgerClient for AccountsOnly {
        async fn accounts(&self) -> Result<Vec<Address>, LedgerError> {
            Ok(self.0.clone())
        }

        async fn registration_fee(&self) -> Result<U256, LedgerError> {
            unimplemented!("not used by the pool")
        }

        async fn my_indexes(&self, _oracle: Address) -> Result<[u8; 3], LedgerError> {
            unimplemented!("not used by the pool")
        }

        async fn register_oracle(&self, _oracle: Address, _fee: U256) -> Result<H256, LedgerError> {
            unimplemented!("not used by the pool")
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
            unimplemented!("not used by the pool")
        }
    }

    #[tokio::test]
    async fn load_preserves_node_account_order() {
        let accounts = vec![
            Address::repeat_byte(0x0a),
            Address::repeat_byte(0x0b),
            Address::repeat_byte(0x0c),
        ];
        let pool = AccountPool::load(&AccountsOnly(accounts.clone()))
            .await
            .unwrap();
        assert_eq!(pool.identities(), accounts.as_slice());
        assert_eq!(pool.len(), 3);
        assert!(!pool.is_empty());
    }

    #[tokio::test]
    async fn empty_node_yields_empty_pool() {
        let pool = AccountPool::load(&AccountsOnly(Vec::new())).await.unwrap();
        assert!(pool.is_empty());
    }
}
