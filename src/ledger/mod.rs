//! The ledger boundary: everything the server asks of the FlightSurety
//! contracts, behind one trait so tests can script the chain.

pub mod abi;
pub mod rpc;
pub mod subscription;

use async_trait::async_trait;
use ethers_core::types::{Address, H256, U256};

use crate::error::LedgerError;

pub use rpc::JsonRpcLedger;

/// Read and write access to the App contract through an unlocked-account
/// node. Each write is a plain `eth_sendTransaction`; the node signs with
/// the account it holds, and a revert surfaces as [`LedgerError::Rpc`].
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// The node's unlocked account list, in node order.
    async fn accounts(&self) -> Result<Vec<Address>, LedgerError>;

    /// `REGISTRATION_FEE()` view call.
    async fn registration_fee(&self) -> Result<U256, LedgerError>;

    /// `getMyIndexes()` view call made as `oracle`.
    async fn my_indexes(&self, oracle: Address) -> Result<[u8; 3], LedgerError>;

    /// `registerOracle()` transaction from `oracle` carrying `fee` as value.
    async fn register_oracle(&self, oracle: Address, fee: U256) -> Result<H256, LedgerError>;

    /// `submitOracleResponse(...)` transaction from `oracle`. The contract
    /// decides acceptance; a mismatching index or an already closed request
    /// reverts and the revert is this call's error.
    async fn submit_oracle_response(
        &self,
        oracle: Address,
        index: u8,
        airline: Address,
        flight: &str,
        timestamp: U256,
        status_code: u8,
    ) -> Result<H256, LedgerError>;
}
