//! Application error types with proper error chaining.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("RPC call failed: {0}")]
    Rpc(String),
    #[error("Timeout waiting for RPC response: {0}")]
    Timeout(String),
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),
    #[error("No resolver registered for {0}")]
    NoResolver(String),
    #[error("No address record set for {0}")]
    NoAddress(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexerError {
    #[error("Indexer request failed: {0}")]
    Transport(String),
    #[error("Indexer unavailable: HTTP {0}")]
    Unavailable(u16),
    #[error("Indexer rate limited the request")]
    RateLimited,
    #[error("Timeout waiting for indexer: {0}")]
    Timeout(String),
    #[error("Malformed indexer response: {0}")]
    Malformed(String),
    #[error("Indexer query failed: {0}")]
    Query(String),
    #[error("Domain not indexed: {0}")]
    DomainNotIndexed(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Indexer(#[from] IndexerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when the failure means the domain has no such record, as opposed
    /// to an upstream or transport problem.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::Resolution(ResolutionError::NoResolver(_) | ResolutionError::NoAddress(_))
                | AppError::Indexer(IndexerError::DomainNotIndexed(_))
        )
    }
}

impl From<reqwest::Error> for ResolutionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ResolutionError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_builder() || err.is_request() {
            ResolutionError::Connection(err.to_string())
        } else if err.is_decode() {
            ResolutionError::Rpc(format!("undecodable body: {err}"))
        } else {
            ResolutionError::Rpc(err.to_string())
        }
    }
}

impl From<reqwest::Error> for IndexerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IndexerError::Timeout(err.to_string())
        } else if err.is_decode() {
            IndexerError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            IndexerError::Unavailable(status.as_u16())
        } else {
            IndexerError::Transport(err.to_string())
        }
    }
}
