//! Indexed queries against the ENS subgraph.

pub mod client;

pub use client::{COIN_TYPES_QUERY, DEFAULT_SUBGRAPH_URL, SubgraphClient, SubgraphConfig};
