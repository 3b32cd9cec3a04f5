//! Pricewatch CLI - Command line host for the signal engine.
//!
//! Feeds price samples into persisted per-entity engines and prints JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pricewatch_core::{
    ApiResponse, EngineConfig, EngineRegistry, EntityKey, SnapshotStore,
};
use serde::Serialize;
use serde_json::json;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "pricewatch")]
#[command(about = "Pricewatch CLI - EMA/RSI trading signals with paper trading")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.pricewatch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// State file (defaults to ~/.pricewatch/state.json)
    #[arg(long, global = true)]
    state: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed price samples, one `value` or `timestamp,value` per line
    Feed {
        /// Tracked entity key
        #[arg(short, long)]
        entity: String,
        /// Read samples from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Enable paper trading for this entity
        #[arg(long)]
        simulate: bool,
    },
    /// Show the current view of an entity
    Status {
        /// Tracked entity key
        #[arg(short, long)]
        entity: String,
    },
    /// Reset an entity
    Reset {
        /// Tracked entity key
        #[arg(short, long)]
        entity: String,
        /// Only reset paper trading, keep price history
        #[arg(long)]
        simulation_only: bool,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays JSON
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(EngineConfig::default_path);
    let config = match EngineConfig::load_from_path(&config_path) {
        Ok(config) => config,
        Err(e) => return print(&ApiResponse::<()>::err(e.to_string())),
    };

    let store = SnapshotStore::load_or_default(cli.state.unwrap_or_else(SnapshotStore::default_path));

    let output = match cli.command {
        Commands::Feed {
            entity,
            file,
            simulate,
        } => handle_feed(config, store, entity.into(), file, simulate),
        Commands::Status { entity } => handle_status(config, store, entity.into()),
        Commands::Reset {
            entity,
            simulation_only,
        } => handle_reset(config, store, entity.into(), simulation_only),
        Commands::Config => Ok(json!({ "config": config })),
    };

    match output {
        Ok(data) => print(&ApiResponse::ok(data)),
        Err(e) => print(&ApiResponse::<()>::err(format!("{e:#}"))),
    }
}

fn print<T: Serialize>(response: &ApiResponse<T>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

fn open_registry(config: EngineConfig, store: &SnapshotStore) -> anyhow::Result<EngineRegistry> {
    let mut registry = EngineRegistry::new(config)?;
    store.restore_into(&mut registry)?;
    Ok(registry)
}

/// Parse `value` or `timestamp,value`. Blank lines and `#` comments yield `None`.
fn parse_sample(line: &str) -> Option<anyhow::Result<(Option<i64>, f64)>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let parsed = match line.split_once(',') {
        Some((ts, value)) => ts
            .trim()
            .parse::<i64>()
            .context("invalid timestamp")
            .and_then(|ts| {
                value
                    .trim()
                    .parse::<f64>()
                    .map(|v| (Some(ts), v))
                    .context("invalid price")
            }),
        None => line
            .parse::<f64>()
            .map(|v| (None, v))
            .context("invalid price"),
    };
    Some(parsed)
}

fn handle_feed(
    config: EngineConfig,
    mut store: SnapshotStore,
    key: EntityKey,
    file: Option<PathBuf>,
    simulate: bool,
) -> anyhow::Result<serde_json::Value> {
    let mut registry = open_registry(config, &store)?;
    let engine = registry.engine(&key)?;
    if simulate {
        engine.set_simulation_enabled(true);
    }

    let reader: Box<dyn BufRead> = match file {
        Some(path) => Box::new(BufReader::new(
            File::open(&path).with_context(|| format!("cannot open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let (mut accepted, mut rejected) = (0usize, 0usize);
    for line in reader.lines() {
        let Some(sample) = parse_sample(&line?) else {
            continue;
        };

        let ok = match sample {
            Ok((Some(ts), value)) => engine.submit_price(value, ts),
            Ok((None, value)) => engine.submit_price_now(value),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed sample");
                false
            }
        };

        if ok {
            accepted += 1;
        } else {
            rejected += 1;
        }
    }

    let view = engine.view();
    store.capture(&registry);
    store.save()?;

    Ok(json!({
        "entity": key,
        "accepted": accepted,
        "rejected": rejected,
        "view": view,
    }))
}

fn handle_status(
    config: EngineConfig,
    store: SnapshotStore,
    key: EntityKey,
) -> anyhow::Result<serde_json::Value> {
    if store.get(&key).is_none() {
        anyhow::bail!(pricewatch_core::Error::UnknownEntity(key.to_string()));
    }

    let mut registry = open_registry(config, &store)?;
    let view = registry.engine(&key)?.view();

    Ok(json!({
        "entity": key,
        "view": view,
    }))
}

fn handle_reset(
    config: EngineConfig,
    mut store: SnapshotStore,
    key: EntityKey,
    simulation_only: bool,
) -> anyhow::Result<serde_json::Value> {
    let mut registry = open_registry(config, &store)?;
    if registry.get(&key).is_none() {
        anyhow::bail!(pricewatch_core::Error::UnknownEntity(key.to_string()));
    }

    if simulation_only {
        registry.engine(&key)?.reset_simulation();
    } else {
        registry.reset(&key)?;
    }

    store.capture(&registry);
    store.save()?;

    Ok(json!({
        "entity": key,
        "message": if simulation_only { "Paper trading reset" } else { "Entity reset" },
    }))
}
