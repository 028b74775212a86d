//! Domain traits defining contracts for external systems.

use alloy_primitives::Address;
use async_trait::async_trait;

use super::error::AppError;
use super::types::{CoinType, Domain};

/// Resolves naming service domains to account addresses.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Check ledger RPC connectivity
    async fn health_check(&self) -> Result<(), AppError>;

    /// Resolve the address record currently registered for a domain
    async fn resolve_address(&self, domain: &Domain) -> Result<Address, AppError>;
}

/// Lists the coin types configured on a domain's resolver via an indexing service.
#[async_trait]
pub trait CoinTypeIndex: Send + Sync {
    /// Check indexing service connectivity
    async fn health_check(&self) -> Result<(), AppError>;

    /// Coin types of the first indexed record matching the domain, in indexer order
    async fn coin_types(&self, domain: &Domain) -> Result<Vec<CoinType>, AppError>;
}
