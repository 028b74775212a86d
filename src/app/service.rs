//! Application service layer.
//!
//! This module contains the lookup logic that orchestrates the name resolver
//! and the coin type index through their trait abstractions.

use std::sync::Arc;
use std::time::Instant;

use alloy_primitives::Address;
use tracing::{info, instrument, warn};

use crate::domain::{
    AppError, CoinType, CoinTypeIndex, Domain, DomainRecord, HealthResponse, HealthStatus,
    NameResolver,
};
use crate::infra::observability::record_lookup;

/// Application service combining address resolution and coin type listing.
///
/// # Example
///
/// ```ignore
/// let resolver = Arc::new(RpcEnsResolver::with_defaults(&rpc_url)?);
/// let index = Arc::new(SubgraphClient::with_defaults(DEFAULT_SUBGRAPH_URL)?);
/// let service = LookupService::new(resolver, index);
///
/// let record = service.lookup(&Domain::parse("brantly.eth")?).await?;
/// ```
pub struct LookupService {
    resolver: Arc<dyn NameResolver>,
    index: Arc<dyn CoinTypeIndex>,
}

impl LookupService {
    /// Creates a new `LookupService` instance.
    ///
    /// # Arguments
    ///
    /// * `resolver` - Resolves domains to addresses.
    /// * `index` - Lists coin types configured on a domain's resolver.
    #[must_use]
    pub fn new(resolver: Arc<dyn NameResolver>, index: Arc<dyn CoinTypeIndex>) -> Self {
        Self { resolver, index }
    }

    /// Resolves the address registered for a domain.
    #[instrument(skip(self, domain), fields(domain = %domain))]
    pub async fn resolve_address(&self, domain: &Domain) -> Result<Address, AppError> {
        let started = Instant::now();
        let result = self.resolver.resolve_address(domain).await;
        record_lookup("address", started, result.as_ref().err());

        if let Err(e) = &result {
            warn!(error = %e, "Address resolution failed");
        }
        result
    }

    /// Lists the coin types configured on a domain's resolver.
    #[instrument(skip(self, domain), fields(domain = %domain))]
    pub async fn coin_types(&self, domain: &Domain) -> Result<Vec<CoinType>, AppError> {
        let started = Instant::now();
        let result = self.index.coin_types(domain).await;
        record_lookup("coin_types", started, result.as_ref().err());

        if let Err(e) = &result {
            warn!(error = %e, "Coin type query failed");
        }
        result
    }

    /// Resolves the address and lists the coin types of a domain.
    ///
    /// Both remote calls are issued concurrently; the first failure aborts
    /// the lookup.
    ///
    /// # Errors
    ///
    /// Returns an `AppError` if either the resolution or the coin type query
    /// fails, including when the domain is absent from the index.
    #[instrument(skip(self, domain), fields(domain = %domain))]
    pub async fn lookup(&self, domain: &Domain) -> Result<DomainRecord, AppError> {
        let (address, coin_types) =
            tokio::try_join!(self.resolve_address(domain), self.coin_types(domain))?;

        info!(address = %address, coins = coin_types.len(), "Lookup complete");
        Ok(DomainRecord::new(domain, &address, coin_types))
    }

    /// Performs a health check on both upstreams concurrently.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> HealthResponse {
        let (resolver, index) =
            tokio::join!(self.resolver.health_check(), self.index.health_check());

        let resolver_health = match resolver {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = ?e, "Resolver health check failed");
                HealthStatus::Unhealthy
            }
        };

        let indexer_health = match index {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = ?e, "Indexer health check failed");
                HealthStatus::Unhealthy
            }
        };

        HealthResponse::new(resolver_health, indexer_health)
    }
}
