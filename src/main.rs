use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::info;

use ens_coin_lookup::api::create_router_with_rate_limit;
use ens_coin_lookup::app::{AppState, LookupService};
use ens_coin_lookup::config::{Config, DEFAULT_DOMAIN, Overrides};
use ens_coin_lookup::domain::Domain;
use ens_coin_lookup::infra::{RpcEnsResolver, SubgraphClient, init_metrics, init_tracing};

/// Resolve an ENS domain and list the coin types its resolver supports.
#[derive(Debug, Parser)]
#[command(name = "ens-coin-lookup", version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Domain to look up when no subcommand is given
    domain: Option<String>,

    /// Ethereum JSON-RPC endpoint (overrides ETH_RPC_URL)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// ENS subgraph endpoint (overrides ENS_SUBGRAPH_URL)
    #[arg(long, global = true)]
    subgraph_url: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the address and coin types of a domain
    Lookup {
        #[arg(default_value = DEFAULT_DOMAIN)]
        domain: String,
    },
    /// Serve the lookup over HTTP
    Serve {
        /// Listen address (overrides BIND_ADDR)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let overrides = Overrides {
        rpc_url: cli.rpc_url,
        subgraph_url: cli.subgraph_url,
        bind_addr: match &cli.command {
            Some(Command::Serve { bind }) => *bind,
            _ => None,
        },
    };
    let config = Config::from_env(&overrides).context("invalid configuration")?;

    init_tracing(config.log_format);

    let resolver = Arc::new(RpcEnsResolver::new(&config.rpc_url, config.rpc_client_config())?);
    let index = Arc::new(SubgraphClient::new(&config.subgraph_url, config.subgraph_config())?);

    match cli.command {
        Some(Command::Serve { .. }) => serve(config, AppState::new(resolver, index)).await,
        Some(Command::Lookup { domain }) => {
            lookup(LookupService::new(resolver, index), &domain).await
        }
        None => {
            let domain = cli.domain.unwrap_or_else(|| DEFAULT_DOMAIN.to_string());
            lookup(LookupService::new(resolver, index), &domain).await
        }
    }
}

async fn lookup(service: LookupService, domain: &str) -> Result<()> {
    let domain = Domain::parse(domain)?;
    let record = service
        .lookup(&domain)
        .await
        .with_context(|| format!("lookup of {domain} failed"))?;

    println!("{}", record.address_line());
    println!("{}", record.coins_line());
    Ok(())
}

async fn serve(config: Config, state: AppState) -> Result<()> {
    let metrics = init_metrics()?;
    let state = Arc::new(state.with_metrics(metrics));
    let router =
        create_router_with_rate_limit(state, config.rate_limit.clone(), config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, rpc_url = %config.rpc_url, "Server starting");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
