use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

mod api;
mod config;
mod logging;
mod node;

use config::NodeConfig;
use node::AgoraNode;

#[derive(Parser)]
#[command(name = "agora")]
#[command(about = "Agora - Agent Task Marketplace Node", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the marketplace node
    Start {
        /// Host for the HTTP API
        #[arg(long)]
        host: Option<String>,

        /// Port for the HTTP API
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write a default configuration file
    Init {
        /// Output path for the configuration
        #[arg(short, long, default_value = "agora.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = load_config(cli.config.as_deref())?;
            config.apply_env_overrides();
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = port {
                config.api.port = port;
            }

            logging::init_logging(&config.logging, cli.verbose)?;
            run_node(config).await
        }
        Commands::Init { output } => {
            let config = NodeConfig::default();
            config
                .save_to_file(&output)
                .with_context(|| format!("Failed to write config to {}", output.display()))?;
            println!("Wrote default configuration to {}", output.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<NodeConfig> {
    match path {
        Some(path) => NodeConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(NodeConfig::default()),
    }
}

async fn run_node(config: NodeConfig) -> Result<()> {
    let host = config.api.host.clone();
    let port = config.api.port;

    let node = AgoraNode::new(config)?;
    let api_handle = api::start_api_server(node, host, port);

    info!("Node running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    info!("🛑 Shutting down");

    api_handle.abort();
    Ok(())
}
