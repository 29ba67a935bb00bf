//! # Skirmish Simulator
//!
//! Headless runner for the gameplay crate. Loads weapons, agent archetypes
//! and a `[sim]` section from a combat file, runs the scripted fight on a
//! fixed tick and prints a JSON summary to stdout.
//!
//! Usage: `skirmish-sim [path]` where `path` is a combat file or a directory
//! of them (defaults to `assets/combat.toml`). Set `SKIRMISH_LOG_FORMAT=json`
//! for structured logs on stderr.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod scenario;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use skirmish_gameplay::{CombatCatalog, DEFAULT_CONFIG_PATH};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::SimConfig;
use crate::scenario::Scenario;

/// Sim config file looked up inside a config directory.
const SIM_FILE: &str = "sim.toml";

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("skirmish_gameplay=info".parse()?)
        .add_directive("skirmish_sim=info".parse()?);

    let json = std::env::var("SKIRMISH_LOG_FORMAT").is_ok_and(|format| format == "json");
    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
    Ok(())
}

fn load(path: &Path) -> Result<(CombatCatalog, SimConfig)> {
    let mut catalog = CombatCatalog::new();
    let sim_path = if path.is_dir() {
        catalog
            .load_dir(path)
            .with_context(|| format!("loading combat files from {}", path.display()))?;
        path.join(SIM_FILE)
    } else {
        catalog
            .load_file(path)
            .with_context(|| format!("loading combat file {}", path.display()))?;
        path.to_path_buf()
    };

    info!(
        "Catalog: {} weapons, {} agents",
        catalog.weapon_count(),
        catalog.agent_count()
    );
    Ok((catalog, SimConfig::load_from(sim_path)))
}

/// Main entry point.
fn main() -> Result<()> {
    init_tracing()?;

    info!("Skirmish simulator starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (catalog, config) = load(&path)?;

    let scenario = Scenario::build(&catalog, &config)?;
    info!("Spawned {} agents", scenario.spawned());

    let summary = scenario.run();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    info!("Skirmish simulator finished");
    Ok(())
}
