//! Runtime configuration, read once from the environment at startup.

use std::env;

use ethers_core::types::Address;

use crate::error::ConfigError;

const DEFAULT_RPC_URL: &str = "http://localhost:8545";
const DEFAULT_ORACLE_COUNT: usize = 20;
const DEFAULT_PORT: u16 = 3001;

/// Which of an oracle's three indexes get a response submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsePolicy {
    /// Submit for all three indexes and let the ledger reject mismatches.
    AllIndexes,
    /// Submit only for indexes equal to the request's triggering index.
    MatchingIndex,
}

/// Which status codes the simulated oracles draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Only the four delay codes.
    LateOnly,
    /// Uniform over all six contract status codes.
    Any,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP JSON-RPC endpoint of the ledger node.
    pub rpc_url: String,
    /// WebSocket endpoint for log subscriptions. Defaults to the RPC URL
    /// with its `http` scheme swapped for `ws`.
    pub ws_url: String,
    /// FlightSuretyApp contract address.
    pub app_address: Address,
    /// FlightSuretyData contract address.
    pub data_address: Address,
    /// How many pool accounts to register as oracles.
    pub oracle_count: usize,
    pub response_policy: ResponsePolicy,
    pub status_policy: StatusPolicy,
    /// Port for the liveness/info API.
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let rpc_url = get("ETH_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let ws_url = get("ETH_WS_URL").unwrap_or_else(|| rpc_url.replacen("http", "ws", 1));

        let app_address = parse_address("APP_CONTRACT_ADDRESS", get("APP_CONTRACT_ADDRESS"))?;
        let data_address = parse_address("DATA_CONTRACT_ADDRESS", get("DATA_CONTRACT_ADDRESS"))?;

        let oracle_count = match get("ORACLE_COUNT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar {
                var: "ORACLE_COUNT",
                value: raw,
                reason: "expected a non-negative integer".into(),
            })?,
            None => DEFAULT_ORACLE_COUNT,
        };

        let response_policy = match get("RESPONSE_POLICY").as_deref() {
            None | Some("all-indexes") => ResponsePolicy::AllIndexes,
            Some("matching-index") => ResponsePolicy::MatchingIndex,
            Some(other) => {
                return Err(ConfigError::InvalidVar {
                    var: "RESPONSE_POLICY",
                    value: other.to_string(),
                    reason: "expected \"all-indexes\" or \"matching-index\"".into(),
                })
            }
        };

        let status_policy = match get("STATUS_POLICY").as_deref() {
            None | Some("late-only") => StatusPolicy::LateOnly,
            Some("any") => StatusPolicy::Any,
            Some(other) => {
                return Err(ConfigError::InvalidVar {
                    var: "STATUS_POLICY",
                    value: other.to_string(),
                    reason: "expected \"late-only\" or \"any\"".into(),
                })
            }
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar {
                var: "PORT",
                value: raw,
                reason: "expected a port number".into(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(AppConfig {
            rpc_url,
            ws_url,
            app_address,
            data_address,
            oracle_count,
            response_policy,
            status_policy,
            port,
        })
    }
}

fn parse_address(var: &'static str, value: Option<String>) -> Result<Address, ConfigError> {
    let value = value.ok_or(ConfigError::MissingVar(var))?;
    value
        .trim()
        .parse()
        .map_err(|err| ConfigError::InvalidVar {
            var,
            value,
            reason: format!("{err}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        vars.insert(
            "APP_CONTRACT_ADDRESS",
            "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
        );
        vars.insert(
            "DATA_CONTRACT_ADDRESS",
            "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512".to_string(),
        );
        vars
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_apply_when_only_addresses_are_set() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(config.ws_url, "ws://localhost:8545");
        assert_eq!(config.oracle_count, 20);
        assert_eq!(config.response_policy, ResponsePolicy::AllIndexes);
        assert_eq!(config.status_policy, StatusPolicy::LateOnly);
        assert_eq!(config.port, 3001);
    }

    #[test]
    fn ws_url_is_derived_from_custom_rpc_url() {
        let mut vars = base_vars();
        vars.insert("ETH_RPC_URL", "https://ganache.example:7545".to_string());
        let config = load(&vars).unwrap();
        assert_eq!(config.ws_url, "wss://ganache.example:7545");
    }

    #[test]
    fn explicit_ws_url_wins_over_derivation() {
        let mut vars = base_vars();
        vars.insert("ETH_WS_URL", "ws://other:9944".to_string());
        let config = load(&vars).unwrap();
        assert_eq!(config.ws_url, "ws://other:9944");
    }

    #[test]
    fn missing_contract_address_is_rejected() {
        let mut vars = base_vars();
        vars.remove("APP_CONTRACT_ADDRESS");
        match load(&vars) {
            Err(ConfigError::MissingVar(var)) => assert_eq!(var, "APP_CONTRACT_ADDRESS"),
            other => panic!("expected MissingVar, got {other:?}"),
        }
    }

    #[test]
    fn malformed_contract_address_is_rejected() {
        let mut vars = base_vars();
        vars.insert("DATA_CONTRACT_ADDRESS", "not-an-address".to_string());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::InvalidVar {
                var: "DATA_CONTRACT_ADDRESS",
                ..
            })
        ));
    }

    #[test]
    fn policies_parse_their_alternate_values() {
        let mut vars = base_vars();
        vars.insert("RESPONSE_POLICY", "matching-index".to_string());
        vars.insert("STATUS_POLICY", "any".to_string());
        let config = load(&vars).unwrap();
        assert_eq!(config.response_policy, ResponsePolicy::MatchingIndex);
        assert_eq!(config.status_policy, StatusPolicy::Any);
    }

    #[test]
    fn unknown_policy_value_is_rejected() {
        let mut vars = base_vars();
        vars.insert("RESPONSE_POLICY", "both".to_string());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::InvalidVar {
                var: "RESPONSE_POLICY",
                ..
            })
        ));
    }

    #[test]
    fn oracle_count_zero_is_allowed() {
        let mut vars = base_vars();
        vars.insert("ORACLE_COUNT", "0".to_string());
        assert_eq!(load(&vars).unwrap().oracle_count, 0);
    }
}
