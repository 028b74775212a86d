//! GraphQL client for the ENS subgraph.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::domain::{AppError, CoinType, CoinTypeIndex, Domain, IndexerError};

/// Public ENS subgraph endpoint.
pub const DEFAULT_SUBGRAPH_URL: &str = "https://api.thegraph.com/subgraphs/name/ensdomains/ens";

/// The domain is bound through `$name`, never spliced into the document.
pub const COIN_TYPES_QUERY: &str = "query DomainCoinTypes($name: String!) { domains(where: { name: $name }, first: 1) { resolver { coinTypes } } }";

const META_QUERY: &str = "{ _meta { block { number } } }";

/// Configuration for the subgraph client
#[derive(Debug, Clone)]
pub struct SubgraphConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Sent as a bearer token when set
    pub api_key: Option<SecretString>,
}

impl Default for SubgraphConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            api_key: None,
        }
    }
}

/// Coin type index backed by the ENS subgraph
pub struct SubgraphClient {
    http_client: Client,
    endpoint: String,
    config: SubgraphConfig,
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a, V: Serialize> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<V>,
}

#[derive(Debug, Serialize)]
struct NameVariables<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DomainsData {
    domains: Vec<DomainEntry>,
}

#[derive(Debug, Deserialize)]
struct DomainEntry {
    resolver: Option<ResolverEntry>,
}

#[derive(Debug, Deserialize)]
struct ResolverEntry {
    #[serde(rename = "coinTypes")]
    coin_types: Option<Vec<CoinType>>,
}

#[derive(Debug, Deserialize)]
struct MetaData {
    #[serde(rename = "_meta")]
    meta: MetaEntry,
}

#[derive(Debug, Deserialize)]
struct MetaEntry {
    block: MetaBlock,
}

#[derive(Debug, Deserialize)]
struct MetaBlock {
    number: u64,
}

impl SubgraphClient {
    /// Create a new subgraph client with custom configuration
    pub fn new(endpoint: &str, config: SubgraphConfig) -> Result<Self, AppError> {
        reqwest::Url::parse(endpoint).map_err(|e| {
            IndexerError::Transport(format!("invalid subgraph URL '{endpoint}': {e}"))
        })?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| IndexerError::Transport(e.to_string()))?;
        info!(
            endpoint = %endpoint,
            authenticated = config.api_key.is_some(),
            "Created subgraph client"
        );
        Ok(Self {
            http_client,
            endpoint: endpoint.to_string(),
            config,
        })
    }

    /// Create a new subgraph client with default configuration
    pub fn with_defaults(endpoint: &str) -> Result<Self, AppError> {
        Self::new(endpoint, SubgraphConfig::default())
    }

    /// POST a GraphQL document and decode its `data`
    #[instrument(skip(self, variables))]
    async fn run_query<V: Serialize, T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<V>,
    ) -> Result<T, IndexerError> {
        let body = GraphqlRequest { query, variables };

        let mut request = self.http_client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(IndexerError::RateLimited);
        }
        if !status.is_success() {
            warn!(status = %status, "Subgraph returned error status");
            return Err(IndexerError::Unavailable(status.as_u16()));
        }

        let graphql_response: GraphqlResponse<T> = response.json().await?;

        if !graphql_response.errors.is_empty() {
            let messages: Vec<String> = graphql_response
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect();
            return Err(IndexerError::Query(messages.join("; ")));
        }

        graphql_response
            .data
            .ok_or_else(|| IndexerError::Malformed("response has no data".to_string()))
    }
}

/// Coin types of the first record; an empty record list is a named error.
fn first_record_coin_types(
    domain: &Domain,
    data: DomainsData,
) -> Result<Vec<CoinType>, IndexerError> {
    let first = data
        .domains
        .into_iter()
        .next()
        .ok_or_else(|| IndexerError::DomainNotIndexed(domain.to_string()))?;

    Ok(first
        .resolver
        .and_then(|resolver| resolver.coin_types)
        .unwrap_or_default())
}

#[async_trait]
impl CoinTypeIndex for SubgraphClient {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        let data: MetaData = self.run_query::<(), _>(META_QUERY, None).await?;
        debug!(block = data.meta.block.number, "Subgraph reachable");
        Ok(())
    }

    #[instrument(skip(self, domain), fields(domain = %domain))]
    async fn coin_types(&self, domain: &Domain) -> Result<Vec<CoinType>, AppError> {
        let variables = NameVariables {
            name: domain.as_str(),
        };
        let data: DomainsData = self
            .run_query(COIN_TYPES_QUERY, Some(variables))
            .await?;

        let coin_types = first_record_coin_types(domain, data)?;
        info!(count = coin_types.len(), "Fetched coin types");
        Ok(coin_types)
    }
}
