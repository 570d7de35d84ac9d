use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use mymovierate_gateway::config::load_config;
use mymovierate_gateway::routing::router::Target;
use mymovierate_gateway::routing::{gateway_router, RouteDecision};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator CLI for the MyMovieRate API gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show where the gateway would send a request path
    Resolve {
        /// Request target, e.g. `/films/5/acteurs/9?x=1`
        path: String,
    },
    /// List the route table in evaluation order
    Routes,
    /// Query the health endpoint of a running gateway
    Health {
        #[arg(short, long, default_value = "http://localhost:4000")]
        url: String,
    },
    /// Load and validate a configuration file (environment overrides apply)
    CheckConfig { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { path } => match gateway_router().resolve(&path) {
            Ok(RouteDecision::Local(endpoint)) => {
                println!("{} → answered by the gateway ({:?})", path, endpoint);
            }
            Ok(RouteDecision::Forward(forward)) => {
                println!(
                    "{} → {} upstream as {} (route `{}`)",
                    path, forward.upstream, forward.path_and_query, forward.route
                );
            }
            Err(e) => {
                eprintln!("{} → {}", path, e);
                std::process::exit(1);
            }
        },
        Commands::Routes => {
            for (i, rule) in gateway_router().rules().iter().enumerate() {
                let target = match rule.target() {
                    Target::Local(endpoint) => format!("local {:?}", endpoint),
                    Target::Upstream(upstream) => upstream.to_string(),
                    Target::ByShape { branches, default } => {
                        let mut parts: Vec<String> = branches
                            .iter()
                            .map(|b| format!("{} → {}", b.name, b.upstream))
                            .collect();
                        parts.push(format!("default → {}", default));
                        parts.join("; ")
                    }
                };
                println!(
                    "{:>2}. {:<14} {:<14} {} ({:?})",
                    i + 1,
                    rule.name(),
                    rule.prefix(),
                    target,
                    rule.rewrite()
                );
            }
        }
        Commands::Health { url } => {
            let res = reqwest::Client::new()
                .get(format!("{}/health", url.trim_end_matches('/')))
                .send()
                .await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: gateway returned status {}", status);
                if let Ok(text) = res.text().await {
                    eprintln!("Response: {}", text);
                }
                std::process::exit(1);
            }
            let json: Value = res.json().await?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::CheckConfig { file } => {
            let config = load_config(Some(&file))?;
            println!("{} is valid", file.display());
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
