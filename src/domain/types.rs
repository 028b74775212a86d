use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::error::ValidationError;

/// A coin type identifier as reported by the indexer (SLIP-44 number as text).
pub type CoinType = String;

/// Longest accepted domain, in UTF-8 bytes.
pub const MAX_DOMAIN_BYTES: usize = 255;

/// A naming service domain such as `brantly.eth`.
///
/// Only emptiness and byte length are checked; the name is not normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(transparent)]
pub struct Domain {
    #[validate(length(min = 1, message = "domain must not be empty"))]
    name: String,
}

impl Domain {
    /// Validates and wraps a domain name.
    pub fn parse(name: impl Into<String>) -> Result<Self, ValidationError> {
        let domain = Self { name: name.into() };
        domain.validate().map_err(|e| ValidationError::InvalidField {
            field: "domain".to_string(),
            message: e.to_string(),
        })?;
        // validator counts chars, the limit is on bytes
        if domain.name.len() > MAX_DOMAIN_BYTES {
            return Err(ValidationError::InvalidField {
                field: "domain".to_string(),
                message: format!(
                    "domain is {} bytes, at most {MAX_DOMAIN_BYTES} allowed",
                    domain.name.len()
                ),
            });
        }
        Ok(domain)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl FromStr for Domain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders an address as EIP-55 checksummed hex.
#[must_use]
pub fn checksummed(address: &Address) -> String {
    address.to_checksum(None)
}

/// Renders coin types as `[60 0 2]`, preserving order.
#[must_use]
pub fn format_coin_list(coin_types: &[CoinType]) -> String {
    format!("[{}]", coin_types.join(" "))
}

/// Combined result of resolving a domain and listing its coin types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct DomainRecord {
    pub domain: String,
    /// EIP-55 checksummed address.
    pub address: String,
    pub coin_types: Vec<CoinType>,
}

impl DomainRecord {
    #[must_use]
    pub fn new(domain: &Domain, address: &Address, coin_types: Vec<CoinType>) -> Self {
        Self {
            domain: domain.to_string(),
            address: checksummed(address),
            coin_types,
        }
    }

    /// `Address of <domain> is <address>`
    #[must_use]
    pub fn address_line(&self) -> String {
        format!("Address of {} is {}", self.domain, self.address)
    }

    /// `Coins held: [<coin> ...]`
    #[must_use]
    pub fn coins_line(&self) -> String {
        format!("Coins held: {}", format_coin_list(&self.coin_types))
    }
}

/// Response payload for address lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct AddressResponse {
    pub domain: String,
    pub address: String,
}

impl AddressResponse {
    #[must_use]
    pub fn new(domain: &Domain, address: &Address) -> Self {
        Self {
            domain: domain.to_string(),
            address: checksummed(address),
        }
    }
}

/// Response payload for coin type listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct CoinTypesResponse {
    pub domain: String,
    pub coin_types: Vec<CoinType>,
}

/// Health check status for services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check response for the application.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub resolver: HealthStatus,
    pub indexer: HealthStatus,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn new(resolver: HealthStatus, indexer: HealthStatus) -> Self {
        let status = match (&resolver, &indexer) {
            (HealthStatus::Healthy, HealthStatus::Healthy) => HealthStatus::Healthy,
            (HealthStatus::Unhealthy, _) | (_, HealthStatus::Unhealthy) => HealthStatus::Unhealthy,
            _ => HealthStatus::Degraded,
        };

        Self {
            status,
            resolver,
            indexer,
            timestamp: Utc::now(),
        }
    }
}

/// Error body returned by the HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub r#type: String,
    pub message: String,
}

/// Error body returned when a client exceeds its request quota.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RateLimitResponse {
    pub error: ErrorDetail,
    pub retry_after: u64,
}
