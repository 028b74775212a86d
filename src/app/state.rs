//! Application state management.
//!
//! This module provides the shared application state that is
//! accessible to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::domain::{CoinTypeIndex, NameResolver};
use crate::infra::PrometheusHandle;

use super::service::LookupService;

/// Shared application state for the Axum web server.
///
/// All contained types are wrapped in `Arc` and implement `Send + Sync`,
/// making `AppState` safe to share across async tasks.
///
/// # Example
///
/// ```ignore
/// let resolver = Arc::new(RpcEnsResolver::with_defaults(&rpc_url)?);
/// let index = Arc::new(SubgraphClient::with_defaults(&subgraph_url)?);
/// let state = AppState::new(resolver, index);
///
/// let router = create_router(Arc::new(state));
/// ```
#[derive(Clone)]
pub struct AppState {
    /// The lookup service containing the resolution logic.
    pub service: Arc<LookupService>,

    /// Prometheus handle rendered by GET /metrics, when a recorder is installed.
    pub metrics: Option<Arc<PrometheusHandle>>,
}

impl AppState {
    /// Creates a new `AppState`, wiring a `LookupService` to the given clients.
    ///
    /// # Arguments
    ///
    /// * `resolver` - A thread-safe reference to a name resolver implementation.
    /// * `index` - A thread-safe reference to a coin type index implementation.
    #[must_use]
    pub fn new(resolver: Arc<dyn NameResolver>, index: Arc<dyn CoinTypeIndex>) -> Self {
        Self {
            service: Arc::new(LookupService::new(resolver, index)),
            metrics: None,
        }
    }

    /// Attaches a Prometheus handle for the metrics endpoint.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(Arc::new(handle));
        self
    }
}
