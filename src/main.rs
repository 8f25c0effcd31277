//! # unraid-mcp
//!
//! MCP (Model Context Protocol) server that exposes the Unraid GraphQL API
//! to an AI agent as a small set of action-based tools. Runs as a stdio
//! JSON-RPC server, launched by the agent host.
//!
//! ## Architecture
//!
//! ```text
//! main.rs          - entry point, config loading, MCP server launch
//! config.rs        - JSON file / env-var configuration loading
//! registry/        - (tool, action) → fixed GraphQL document + variable schema
//! validate.rs      - parameter checking and variable marshalling
//! gate.rs          - destructive-action gate (capability flag AND confirm)
//! capabilities.rs  - per-tool destructive flags, reloaded on config change
//! transport.rs     - HTTP POST to the GraphQL endpoint (reqwest)
//! client.rs        - per-class timeouts, query-only retry
//! normalize.rs     - GraphQL envelope → data, warnings or classified error
//! dispatch.rs      - the invoke pipeline
//! error.rs         - failure taxonomy
//! mcp.rs           - MCP JSON-RPC protocol handler (stdio)
//! tools.rs         - MCP tool schemas and call routing
//! ```
//!
//! ## Tools
//!
//! `unraid_info`, `unraid_array`, `unraid_storage`, `unraid_docker`,
//! `unraid_vm`, `unraid_notifications`, `unraid_rclone`, `unraid_keys`,
//! `unraid_users`, `unraid_health`. Each takes an `action` plus that
//! action's parameters.

mod capabilities;
mod client;
mod config;
mod dispatch;
mod error;
mod gate;
mod mcp;
mod normalize;
mod registry;
mod tools;
mod transport;
mod validate;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use capabilities::CapabilityStore;
use client::GraphqlClient;
use config::Cli;
use dispatch::Dispatcher;
use transport::HttpTransport;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let resolved = match config::load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("unraid-mcp: configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&resolved.log_level);
    for warning in &resolved.warnings {
        tracing::warn!("{}", warning);
    }

    let transport = match HttpTransport::new(
        resolved.endpoint.clone(),
        &resolved.api_key,
        &resolved.tls,
    ) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let capabilities = match &resolved.source {
        Some(path) => CapabilityStore::watching(resolved.capabilities.clone(), path.clone()),
        None => CapabilityStore::fixed(resolved.capabilities.clone()),
    };

    let enabled: Vec<&str> = resolved
        .capabilities
        .enabled()
        .map(|t| t.as_str())
        .collect();
    tracing::info!(
        endpoint = transport.endpoint(),
        destructive_enabled = ?enabled,
        timeout_default_secs = resolved.timeouts.default.as_secs(),
        timeout_extended_secs = resolved.timeouts.extended.as_secs(),
        timeout_fast_secs = resolved.timeouts.fast.as_secs(),
        max_retries = resolved.retry.max_retries,
        "unraid-mcp starting"
    );

    let client = GraphqlClient::new(Arc::new(transport), resolved.timeouts, resolved.retry);
    let dispatcher = Dispatcher::new(client, Arc::new(capabilities));

    mcp::run_stdio(Arc::new(dispatcher)).await;
}

/// Logs go to stderr; stdout carries the protocol. `RUST_LOG` wins over the
/// configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
