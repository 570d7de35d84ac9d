//! MyMovieRate API gateway.
//!
//! Single public entry point of the platform. Every request is classified
//! against an ordered route table and forwarded to one upstream service.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 API GATEWAY                  │
//!  Client Request     │  ┌────────┐   ┌─────────┐   ┌─────────────┐  │
//!  ───────────────────┼─▶│  http  │──▶│ routing │──▶│  forwarder  │──┼──▶ auth  :4001
//!                     │  │ server │   │  table  │   │ (deadline)  │  │    film  :4002
//!                     │  └────────┘   └─────────┘   └─────────────┘  │    actor :4003
//!  Client Response    │       ▲                            │         │    user  :4004
//!  ◀──────────────────┼───────┴────────── relay ◀──────────┘         │    review:4005
//!                     │                                              │    bot   :4006
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use mymovierate_gateway::config::load_config;
use mymovierate_gateway::lifecycle::startup;
use mymovierate_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "mymovierate-gateway")]
#[command(about = "API gateway for the MyMovieRate services", long_about = None)]
struct Cli {
    /// TOML configuration file; environment variables override it.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        connect_timeout_secs = config.timeouts.connect_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
