//! ENS Coin Lookup
//!
//! Resolves an ENS domain to its Ethereum address through the on-chain
//! registry and lists the coin types configured on the domain's resolver
//! through the ENS subgraph.
//!
//! # Architecture Overview
//!
//! This crate is organized into four main layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   API Layer                  │
//! │  HTTP handlers, routing, rate limiting       │
//! ├─────────────────────────────────────────────┤
//! │               Application Layer              │
//! │    Lookup orchestration, health checks       │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │   Traits, types, errors (no I/O)             │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │  JSON-RPC resolver, subgraph client, logs    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Key Features
//!
//! - **Trait-based abstraction**: the resolver and the indexer sit behind `NameResolver` and `CoinTypeIndex`
//! - **Concurrent lookups**: address resolution and coin type listing run side by side
//! - **Parameterized queries**: domain names travel as GraphQL variables, never spliced into the document
//! - **Error handling**: hierarchical error types mapped onto HTTP statuses
//! - **Logging**: structured logging with `tracing`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ens_coin_lookup::app::LookupService;
//! use ens_coin_lookup::domain::Domain;
//! use ens_coin_lookup::infra::{DEFAULT_SUBGRAPH_URL, RpcEnsResolver, SubgraphClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = Arc::new(RpcEnsResolver::with_defaults(&rpc_url)?);
//!     let index = Arc::new(SubgraphClient::with_defaults(DEFAULT_SUBGRAPH_URL)?);
//!     let service = LookupService::new(resolver, index);
//!
//!     let record = service.lookup(&Domain::parse("brantly.eth")?).await?;
//!     println!("{}", record.address_line());
//!     println!("{}", record.coins_line());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod infra;

// Test utilities are available in tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
