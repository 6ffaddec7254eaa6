//! evt-edge CLI: runs and inspects the request edge.
//!
//! ```bash
//! evt-edge serve --config evt-edge.toml --port 3000
//! evt-edge check-config
//! evt-edge routes
//! ```
//!
//! See `evt-edge --help` for all available commands and options.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "evt-edge", about = "Request edge for the event-planning platform", version)]
struct Cli {
    /// Config file (defaults to ./evt-edge.toml when present)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the edge server
    Serve {
        /// Override the listening port
        #[arg(long, short)]
        port: Option<u16>,

        /// Override the listening address
        #[arg(long)]
        host: Option<String>,
    },
    /// Load and validate the configuration, then exit
    CheckConfig,
    /// Print the proxy and access tables in effect
    Routes,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port, host } => {
            commands::serve::run(cli.config.as_deref(), port, host).await
        }
        Commands::CheckConfig => commands::check::run(cli.config.as_deref()),
        Commands::Routes => commands::routes::run(cli.config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
