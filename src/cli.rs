//! `relaychain` subcommands.

use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use relaychain_chain::{ChainBuilder, ChainSet, Route};
use relaychain_config::{
    CliOverrides, Config, LoggingConfig, apply_overrides, load_config, unresolved_references,
    validate_config,
};
use relaychain_core::DEFAULT_LOG_LEVEL;
use relaychain_registry::Registry;
use relaychain_selector::SelectContext;
use relaychain_transport::Network;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Arguments of `relaychain check`.
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Config file path (json/jsonc/yaml/toml)
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,

    #[command(flatten)]
    pub overrides: CliOverrides,
}

/// Arguments of `relaychain route`.
#[derive(Parser, Debug, Clone)]
pub struct RouteArgs {
    /// Config file path (json/jsonc/yaml/toml)
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Chain to route through
    #[arg(long)]
    pub chain: String,

    /// Target address (host:port)
    #[arg(long)]
    pub target: String,

    /// Network of the connection (tcp/udp)
    #[arg(long, default_value = "tcp")]
    pub network: Network,

    /// Affinity key for the hash selector
    #[arg(long)]
    pub key: Option<String>,

    /// Also open the connection through the selected route
    #[arg(long)]
    pub dial: bool,

    #[command(flatten)]
    pub overrides: CliOverrides,
}

/// Load, validate and build every chain; log a summary per chain.
pub fn check(args: CheckArgs) -> Result<(), Box<dyn Error>> {
    let (config, registry) = prepare(&args.config, &args.overrides)?;
    let chains = ChainSet::build(&registry, &config.chains)?;

    for name in chains.names() {
        let Some(chain) = chains.get(&name) else {
            continue;
        };
        let nodes: usize = chain.groups().iter().map(|g| g.nodes().len()).sum();
        info!(chain = %name, hops = chain.groups().len(), nodes, "chain ok");
    }
    println!("{}: {} chain(s) ok", args.config.display(), chains.len());
    Ok(())
}

/// Select a route for the target and print it, optionally dialing it.
pub async fn route(args: RouteArgs) -> Result<(), Box<dyn Error>> {
    let (config, registry) = prepare(&args.config, &args.overrides)?;
    let chain = ChainBuilder::new(&registry)
        .build(config.chain(&args.chain))?
        .ok_or_else(|| format!("chain '{}' not found", args.chain))?;

    let ctx = args.key.map(SelectContext::with_key).unwrap_or_default();
    let route = chain.route(&ctx, args.network, &args.target);
    println!("{}", describe(&route, &args.target));

    if args.dial {
        let _stream = route.dial(args.network, &args.target).await?;
        info!(chain = %args.chain, addr = %args.target, "connection established");
        println!("connected");
    }
    Ok(())
}

fn prepare(path: &Path, overrides: &CliOverrides) -> Result<(Config, Registry), Box<dyn Error>> {
    let mut config = load_config(path)?;
    apply_overrides(&mut config, overrides);
    validate_config(&config)?;

    init_tracing(&config.logging);
    for missing in unresolved_references(&config) {
        warn!("{missing}; treated as empty");
    }

    let registry = Registry::builder()
        .with_builtins()
        .load_config(&config)?
        .build();
    Ok((config, registry))
}

fn describe(route: &Route, target: &str) -> String {
    if route.is_empty() {
        return format!("direct -> {target}");
    }
    let mut hops: Vec<&str> = route.nodes().iter().map(|n| n.name()).collect();
    hops.push(target);
    hops.join(" -> ")
}

/// Initialize the tracing subscriber from the logging configuration.
///
/// Supports:
/// - `level`: Base log level (trace, debug, info, warn, error)
/// - `format`: Output format (json, pretty, compact). Default: pretty
/// - `output`: Output target (stdout, stderr). Default: stderr
/// - `filters`: Per-module log level overrides
fn init_tracing(config: &LoggingConfig) {
    let mut filter_str = config
        .level
        .as_deref()
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .to_string();
    for (module, level) in &config.filters {
        filter_str.push(',');
        filter_str.push_str(module);
        filter_str.push('=');
        filter_str.push_str(level);
    }
    let filter =
        EnvFilter::try_new(&filter_str).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let format = config.format.as_deref().unwrap_or("pretty");
    let output = config.output.as_deref().unwrap_or("stderr");

    let result = match (format, output) {
        ("json", "stdout") => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stdout))
            .try_init(),
        ("json", _) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init(),
        ("compact", "stdout") => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(io::stdout))
            .try_init(),
        ("compact", _) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(io::stderr))
            .try_init(),
        (_, "stdout") => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stdout))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr))
            .try_init(),
    };
    // Already installed when several commands run in one process.
    if let Err(e) = result {
        debug!(error = %e, "tracing subscriber already set");
    }
}
