//! Ethereum Name Service resolution.

pub mod abi;
pub mod namehash;
pub mod rpc;

pub use namehash::{domain_node, namehash};
pub use rpc::{ENS_REGISTRY_ADDRESS, RpcClientConfig, RpcEnsResolver};
