//! Domain layer containing core types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AppError, ConfigError, IndexerError, ResolutionError, ValidationError};
pub use traits::{CoinTypeIndex, NameResolver};
pub use types::{
    AddressResponse, CoinType, CoinTypesResponse, Domain, DomainRecord, ErrorDetail,
    ErrorResponse, HealthResponse, HealthStatus, MAX_DOMAIN_BYTES, RateLimitResponse,
    checksummed, format_coin_list,
};
