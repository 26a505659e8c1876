#![forbid(unsafe_code)]

//! Blueprint CLI - turn `mordo` chat messages into stored graphs.
//!
//! # Commands
//!
//! - `parse`: Print the Blueprint parsed from a message (nothing is stored)
//! - `save`: Parse, set a title and persist; prints the new id
//! - `list`: Print every stored Blueprint
//! - `check`: Health and storage probe
//! - `serve`: Start the HTTP API

mod api;
mod config;
mod server;

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use bp_parser::{parse_evidence_json, parse_with_options, parse_with_report};
use bp_store::{DocumentStore, StoreBackend, list_blueprints, open_store, save_blueprint};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "blueprint",
    version,
    about = "Blueprint CLI - parse, persist and serve graphs described in chat messages",
    long_about = "Extracts a Mermaid-style `graph` block from a message that starts with\n\
        the sentinel keyword, turns it into nodes and edges, and stores the result."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (defaults to ./blueprint.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend override (memory, file)
    #[arg(long, global = true)]
    store: Option<String>,

    /// Data directory override for the file store
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a message and print the resulting Blueprint as JSON.
    Parse {
        /// Input file path, "-" for stdin, or inline message text.
        #[arg(default_value = "-")]
        input: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Print the scanner report (counts, groups, skipped lines) instead
        #[arg(long)]
        report: bool,
    },

    /// Parse a message, give it a title and store it.
    Save {
        /// Title stored with the Blueprint
        #[arg(short, long)]
        title: String,

        /// Input file path, "-" for stdin, or inline message text.
        #[arg(default_value = "-")]
        input: String,
    },

    /// Print every stored Blueprint as a JSON array.
    List {
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Report service health and storage connectivity.
    Check,

    /// Start the HTTP API.
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(store) = cli.store.as_deref() {
        config.store.backend = StoreBackend::from_name(store)
            .with_context(|| format!("Unknown store backend: {store}"))?;
    }
    if let Some(data_dir) = cli.data_dir {
        config.store.data_dir = data_dir;
    }
    debug!("Effective config: {config:?}");

    match cli.command {
        Command::Parse {
            input,
            pretty,
            report,
        } => cmd_parse(&config, &input, pretty, report),

        Command::Save { title, input } => cmd_save(&config, &title, &input),

        Command::List { pretty } => cmd_list(&config, pretty),

        Command::Check => cmd_check(&config),

        Command::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            cmd_serve(&config)
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| {
            match verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
            .to_string()
        })
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).is_file() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline message text
        Ok(input.to_string())
    }
}

fn open_configured_store(config: &Config) -> Result<Box<dyn DocumentStore>> {
    if config.store.backend == StoreBackend::Memory {
        warn!("Using the memory store; records are lost when the process exits");
    }
    open_store(config.store.backend, &config.store.data_dir).with_context(|| {
        format!(
            "Failed to open {} store at {}",
            config.store.backend.as_str(),
            config.store.data_dir.display()
        )
    })
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(config: &Config, input: &str, pretty: bool, report: bool) -> Result<()> {
    let source = load_input(input)?;
    let start = Instant::now();
    let outcome = parse_with_report(&source, &config.parse_options())?;
    let elapsed = start.elapsed();

    debug!(
        "Parsed: nodes={}, edges={}, skipped={} in {:.3}ms",
        outcome.blueprint.nodes.len(),
        outcome.blueprint.edges.len(),
        outcome.report.skipped.len(),
        elapsed.as_secs_f64() * 1000.0
    );
    if outcome.report.block_line.is_none() {
        warn!("No `graph ` declaration found; the Blueprint is empty");
    }

    let output = if report {
        let evidence: serde_json::Value = serde_json::from_str(&parse_evidence_json(&outcome))?;
        to_json(&evidence, pretty)?
    } else {
        to_json(&outcome.blueprint, pretty)?
    };
    println!("{output}");
    Ok(())
}

// =============================================================================
// Command: save
// =============================================================================

fn cmd_save(config: &Config, title: &str, input: &str) -> Result<()> {
    let source = load_input(input)?;
    let blueprint = parse_with_options(&source, &config.parse_options())?.with_title(title);
    let store = open_configured_store(config)?;
    let id = save_blueprint(store.as_ref(), &blueprint).context("Failed to store blueprint")?;
    println!("{id}");
    Ok(())
}

// =============================================================================
// Command: list
// =============================================================================

fn cmd_list(config: &Config, pretty: bool) -> Result<()> {
    let store = open_configured_store(config)?;
    let blueprints = list_blueprints(store.as_ref()).context("Failed to list blueprints")?;
    info!("Listed {} blueprints", blueprints.len());
    println!("{}", to_json(&blueprints, pretty)?);
    Ok(())
}

// =============================================================================
// Command: check
// =============================================================================

fn cmd_check(config: &Config) -> Result<()> {
    let store = open_configured_store(config)?;
    let probe = api::store_probe(store.as_ref());
    println!("{}", to_json(&probe, true)?);
    Ok(())
}

// =============================================================================
// Command: serve
// =============================================================================

fn cmd_serve(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        bail!("server.port must be non-zero");
    }
    let store = open_configured_store(config)?;
    let options = config.parse_options();
    server::serve(&config.bind_address(), store.as_ref(), &options)
}
