//! Runtime configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use secrecy::SecretString;

use crate::api::RateLimitConfig;
use crate::domain::ConfigError;
use crate::infra::{
    DEFAULT_SUBGRAPH_URL, ENS_REGISTRY_ADDRESS, LogFormat, RpcClientConfig, SubgraphConfig,
};

/// Infura project ID used when neither `ETH_RPC_URL` nor `INFURA_PROJECT_ID`
/// is set. Not a secret; it only identifies the rate-limit bucket.
pub const DEFAULT_INFURA_PROJECT_ID: &str = "5980b17eb5314e3ebf564089fd4c9fce";

/// Domain looked up when none is given on the command line.
pub const DEFAULT_DOMAIN: &str = "brantly.eth";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Mainnet Infura endpoint for a project ID.
#[must_use]
pub fn infura_url(project_id: &str) -> String {
    format!("https://mainnet.infura.io/v3/{project_id}")
}

/// Command line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub subgraph_url: Option<String>,
    pub bind_addr: Option<SocketAddr>,
}

impl Overrides {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            "ETH_RPC_URL" => self.rpc_url.clone(),
            "ENS_SUBGRAPH_URL" => self.subgraph_url.clone(),
            "BIND_ADDR" => self.bind_addr.map(|addr| addr.to_string()),
            _ => None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub registry: Address,
    pub subgraph_url: String,
    pub subgraph_api_key: Option<SecretString>,
    pub request_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    pub rate_limit: RateLimitConfig,
}

impl Config {
    /// Read configuration from process environment variables, with
    /// `overrides` replacing the variables they cover.
    pub fn from_env(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| overrides.get(key).or_else(|| std::env::var(key).ok()))
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rpc_url = match get("ETH_RPC_URL") {
            Some(url) => url,
            None => infura_url(
                get("INFURA_PROJECT_ID")
                    .as_deref()
                    .unwrap_or(DEFAULT_INFURA_PROJECT_ID),
            ),
        };

        let registry =
            parse_or("ENS_REGISTRY_ADDRESS", get("ENS_REGISTRY_ADDRESS"), ENS_REGISTRY_ADDRESS)?;
        let timeout_secs: u64 = parse_or(
            "REQUEST_TIMEOUT_SECS",
            get("REQUEST_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "REQUEST_TIMEOUT_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let bind_addr = match get("BIND_ADDR") {
            Some(v) => parse_value("BIND_ADDR", &v)?,
            None => parse_value("BIND_ADDR", DEFAULT_BIND_ADDR)?,
        };

        let log_format = match get("LOG_FORMAT") {
            Some(v) => v.parse()?,
            None => LogFormat::default(),
        };

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            general_rps: parse_nonzero(
                "RATE_LIMIT_RPS",
                get("RATE_LIMIT_RPS"),
                defaults.general_rps,
            )?,
            general_burst: parse_nonzero(
                "RATE_LIMIT_BURST",
                get("RATE_LIMIT_BURST"),
                defaults.general_burst,
            )?,
            ..defaults
        };

        Ok(Self {
            rpc_url,
            registry,
            subgraph_url: get("ENS_SUBGRAPH_URL")
                .unwrap_or_else(|| DEFAULT_SUBGRAPH_URL.to_string()),
            subgraph_api_key: get("ENS_SUBGRAPH_API_KEY").map(SecretString::from),
            request_timeout: Duration::from_secs(timeout_secs),
            bind_addr,
            log_format,
            rate_limit,
        })
    }

    /// Settings for the ENS JSON-RPC client.
    #[must_use]
    pub fn rpc_client_config(&self) -> RpcClientConfig {
        RpcClientConfig {
            timeout: self.request_timeout,
            connect_timeout: CONNECT_TIMEOUT.min(self.request_timeout),
            registry: self.registry,
        }
    }

    /// Settings for the subgraph client.
    #[must_use]
    pub fn subgraph_config(&self) -> SubgraphConfig {
        SubgraphConfig {
            timeout: self.request_timeout,
            connect_timeout: CONNECT_TIMEOUT.min(self.request_timeout),
            api_key: self.subgraph_api_key.clone(),
        }
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map_or(Ok(default), |v| parse_value(key, &v))
}

fn parse_nonzero(key: &str, raw: Option<String>, default: u32) -> Result<u32, ConfigError> {
    let value = parse_or(key, raw, default)?;
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
