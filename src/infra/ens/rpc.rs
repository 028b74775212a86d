//! ENS resolution over Ethereum JSON-RPC.
//!
//! Resolution is two `eth_call`s: the registry maps the domain's namehash to
//! a resolver contract, and the resolver maps it to an address.

use alloy_primitives::{Address, Bytes, address};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::abi::{addr_call, decode_addr, decode_resolver, resolver_call};
use super::namehash::domain_node;
use crate::domain::{AppError, Domain, NameResolver, ResolutionError};

/// ENS registry deployment on Ethereum mainnet.
pub const ENS_REGISTRY_ADDRESS: Address = address!("00000000000C2E074eC69A0bFb2997BA6C7d2e1e");

/// Configuration for the RPC client
#[derive(Debug, Clone)]
pub struct RpcClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub registry: Address,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            registry: ENS_REGISTRY_ADDRESS,
        }
    }
}

/// ENS resolver backed by an Ethereum JSON-RPC endpoint
pub struct RpcEnsResolver {
    http_client: Client,
    rpc_url: String,
    config: RpcClientConfig,
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<T: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: String,
    params: T,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
struct CallRequest {
    to: Address,
    data: Bytes,
}

impl RpcEnsResolver {
    /// Create a new resolver with custom configuration
    pub fn new(rpc_url: &str, config: RpcClientConfig) -> Result<Self, AppError> {
        reqwest::Url::parse(rpc_url).map_err(|e| {
            ResolutionError::Connection(format!("invalid RPC URL '{rpc_url}': {e}"))
        })?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ResolutionError::Connection(e.to_string()))?;
        info!(registry = %config.registry, "Created ENS resolver client");
        Ok(Self {
            http_client,
            rpc_url: rpc_url.to_string(),
            config,
        })
    }

    /// Create a new resolver with default configuration
    pub fn with_defaults(rpc_url: &str) -> Result<Self, AppError> {
        Self::new(rpc_url, RpcClientConfig::default())
    }

    /// Registry contract queried for resolvers
    #[must_use]
    pub fn registry(&self) -> Address {
        self.config.registry
    }

    /// Execute a single RPC call
    #[instrument(skip(self, params))]
    async fn rpc_call<P: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, ResolutionError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: method.to_string(),
            params,
        };

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::Rpc(format!("HTTP {status}")));
        }

        let rpc_response: JsonRpcResponse<R> = response.json().await?;

        if let Some(error) = rpc_response.error {
            return Err(ResolutionError::Rpc(format!(
                "{}: {}",
                error.code, error.message
            )));
        }

        rpc_response
            .result
            .ok_or_else(|| ResolutionError::Rpc("Empty response".to_string()))
    }

    /// `eth_call` against the latest block
    async fn eth_call(&self, to: Address, data: Vec<u8>) -> Result<Bytes, ResolutionError> {
        let call = CallRequest {
            to,
            data: Bytes::from(data),
        };
        let result: Bytes = self.rpc_call("eth_call", (call, "latest")).await?;
        debug!(to = %to, len = result.len(), "eth_call returned");
        Ok(result)
    }

    /// Resolver contract the registry holds for a domain, if any.
    #[instrument(skip(self, domain), fields(domain = %domain))]
    pub async fn resolver_of(&self, domain: &Domain) -> Result<Option<Address>, ResolutionError> {
        let data = self
            .eth_call(self.config.registry, resolver_call(domain_node(domain)))
            .await?;
        decode_resolver(&data)
    }
}

#[async_trait]
impl NameResolver for RpcEnsResolver {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        let block: String = self.rpc_call("eth_blockNumber", Vec::<()>::new()).await?;
        debug!(block = %block, "RPC endpoint reachable");
        Ok(())
    }

    #[instrument(skip(self, domain), fields(domain = %domain))]
    async fn resolve_address(&self, domain: &Domain) -> Result<Address, AppError> {
        let resolver = self
            .resolver_of(domain)
            .await?
            .ok_or_else(|| ResolutionError::NoResolver(domain.to_string()))?;
        debug!(resolver = %resolver, "Found resolver");

        let node = domain_node(domain);
        let data = self.eth_call(resolver, addr_call(node)).await?;
        let address = decode_addr(&data)?
            .ok_or_else(|| ResolutionError::NoAddress(domain.to_string()))?;

        info!(address = %address, "Resolved domain");
        Ok(address)
    }
}
