//! Infrastructure layer implementations.

pub mod ens;
pub mod observability;
pub mod subgraph;

pub use ens::{ENS_REGISTRY_ADDRESS, RpcClientConfig, RpcEnsResolver};
pub use observability::{LogFormat, PrometheusHandle, init_metrics, init_tracing};
pub use subgraph::{DEFAULT_SUBGRAPH_URL, SubgraphClient, SubgraphConfig};
