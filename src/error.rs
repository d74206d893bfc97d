//! Error taxonomy for the oracle server.

use ethers_core::types::Address;
use thiserror::Error;

/// Failures crossing the ledger boundary.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger node could not be reached over HTTP.
    #[error("ledger connection failed: {0}")]
    Connection(#[from] reqwest::Error),

    /// The WebSocket subscription transport failed.
    #[error("ledger subscription failed: {0}")]
    Subscription(#[from] tokio_tungstenite::tungstenite::Error),

    /// The node returned a JSON-RPC error object. Transaction reverts
    /// surface here with the node's revert message.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered, but not with the shape we expected.
    #[error("malformed rpc response: {0}")]
    Response(String),

    /// Returned bytes did not decode as the advertised ABI type.
    #[error("abi decode failed: {0}")]
    Decode(String),
}

/// A single registration transaction failed during bootstrap.
///
/// Bootstrap is all-or-nothing, so this always aborts the whole run and
/// names the identity that could not be registered.
#[derive(Debug, Error)]
#[error("failed to register oracle {identity:?}: {source}")]
pub struct RegistrationError {
    pub identity: Address,
    #[source]
    pub source: LedgerError,
}

/// Why the one-time registry bootstrap did not produce a registry.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to read oracle registration fee: {0}")]
    Fee(#[source] LedgerError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// Invalid or missing configuration, fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },
}
