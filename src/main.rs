//! relaychain CLI.
//!
//! - `relaychain check` - Validate a config and build every chain
//! - `relaychain route` - Select (and optionally dial) a route for a target

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use relaychain::cli::{self, CheckArgs, RouteArgs};

/// relaychain CLI.
#[derive(Parser)]
#[command(
    name = "relaychain",
    version,
    about = "Multi-hop proxy chain builder and router",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config and build every chain.
    #[command(name = "check")]
    Check(CheckArgs),

    /// Print the route selected for a target.
    #[command(name = "route")]
    Route(RouteArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check(args) => cli::check(args),
        Commands::Route(args) => cli::route(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
