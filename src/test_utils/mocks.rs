//! Mock implementations for testing.
//!
//! These mocks provide in-memory implementations of domain traits
//! that can be configured to simulate various scenarios including
//! success, failure, and edge cases.

use alloy_primitives::Address;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

use crate::domain::{
    AppError, CoinType, CoinTypeIndex, Domain, IndexerError, NameResolver, ResolutionError,
};

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// If true, operations will fail.
    pub should_fail: bool,
    /// Custom error message for failures.
    pub error_message: Option<String>,
    /// Simulated latency in milliseconds.
    pub latency_ms: Option<u64>,
    /// Rendezvous every lookup must pass before answering.
    pub barrier: Option<Arc<Barrier>>,
}

impl MockConfig {
    /// Creates a config that always succeeds.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Creates a config that always fails.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Adds simulated latency.
    #[must_use]
    pub fn with_latency(mut self, ms: u64) -> Self {
        self.latency_ms = Some(ms);
        self
    }

    /// Makes lookups wait on a shared barrier.
    #[must_use]
    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    async fn delay(&self) {
        if let Some(ms) = self.latency_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
    }
}

/// Mock name resolver for testing.
///
/// Domains registered with [`MockNameResolver::with_address`] resolve;
/// domains registered with [`MockNameResolver::with_resolver_only`] have a
/// resolver but no address; anything else has no resolver.
///
/// # Example
///
/// ```
/// use alloy_primitives::Address;
/// use ens_coin_lookup::test_utils::{MockNameResolver, mocks::MockConfig};
///
/// let mock = MockNameResolver::new().with_address("brantly.eth", Address::repeat_byte(1));
///
/// let failing_mock = MockNameResolver::with_config(MockConfig::failure("RPC error"));
/// ```
pub struct MockNameResolver {
    records: Arc<Mutex<HashMap<String, Option<Address>>>>,
    config: MockConfig,
    call_count: AtomicU64,
    is_healthy: AtomicBool,
}

impl MockNameResolver {
    /// Creates a new mock with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a new mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            config,
            call_count: AtomicU64::new(0),
            is_healthy: AtomicBool::new(true),
        }
    }

    /// Creates a mock that always fails with a connection error.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Registers a domain resolving to `address`.
    #[must_use]
    pub fn with_address(self, domain: &str, address: Address) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert(domain.to_string(), Some(address));
        self
    }

    /// Registers a domain whose resolver has no address record.
    #[must_use]
    pub fn with_resolver_only(self, domain: &str) -> Self {
        self.records.lock().unwrap().insert(domain.to_string(), None);
        self
    }

    /// Gets the number of times any method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Sets the health status.
    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    fn increment_call_count(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }

    fn check_should_fail(&self) -> Result<(), AppError> {
        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock resolver error".to_string());
            return Err(AppError::Resolution(ResolutionError::Connection(msg)));
        }
        Ok(())
    }
}

impl Default for MockNameResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NameResolver for MockNameResolver {
    async fn health_check(&self) -> Result<(), AppError> {
        self.increment_call_count();

        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(AppError::Resolution(ResolutionError::Connection(
                "Mock resolver unhealthy".to_string(),
            )));
        }

        self.check_should_fail()
    }

    async fn resolve_address(&self, domain: &Domain) -> Result<Address, AppError> {
        self.increment_call_count();
        self.config.delay().await;
        self.check_should_fail()?;

        let records = self.records.lock().unwrap();
        match records.get(domain.as_str()) {
            Some(Some(address)) => Ok(*address),
            Some(None) => Err(ResolutionError::NoAddress(domain.to_string()).into()),
            None => Err(ResolutionError::NoResolver(domain.to_string()).into()),
        }
    }
}

/// Mock coin type index for testing.
///
/// Domains registered with [`MockCoinTypeIndex::with_coin_types`] are
/// indexed; anything else is reported as not indexed.
pub struct MockCoinTypeIndex {
    records: Arc<Mutex<HashMap<String, Vec<CoinType>>>>,
    queries: Arc<Mutex<Vec<String>>>,
    config: MockConfig,
    call_count: AtomicU64,
    is_healthy: AtomicBool,
}

impl MockCoinTypeIndex {
    /// Creates a new mock with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a new mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
            config,
            call_count: AtomicU64::new(0),
            is_healthy: AtomicBool::new(true),
        }
    }

    /// Creates a mock that always fails with a transport error.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Registers the coin types indexed for a domain.
    #[must_use]
    pub fn with_coin_types(self, domain: &str, coin_types: &[&str]) -> Self {
        self.records.lock().unwrap().insert(
            domain.to_string(),
            coin_types.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    /// Gets every domain queried so far, in order.
    pub fn get_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    /// Gets the number of times any method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Sets the health status.
    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    fn increment_call_count(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }

    fn check_should_fail(&self) -> Result<(), AppError> {
        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock indexer error".to_string());
            return Err(AppError::Indexer(IndexerError::Transport(msg)));
        }
        Ok(())
    }
}

impl Default for MockCoinTypeIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoinTypeIndex for MockCoinTypeIndex {
    async fn health_check(&self) -> Result<(), AppError> {
        self.increment_call_count();

        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(AppError::Indexer(IndexerError::Unavailable(503)));
        }

        self.check_should_fail()
    }

    async fn coin_types(&self, domain: &Domain) -> Result<Vec<CoinType>, AppError> {
        self.increment_call_count();
        self.queries.lock().unwrap().push(domain.to_string());
        self.config.delay().await;
        self.check_should_fail()?;

        let records = self.records.lock().unwrap();
        records
            .get(domain.as_str())
            .cloned()
            .ok_or_else(|| IndexerError::DomainNotIndexed(domain.to_string()).into())
    }
}
