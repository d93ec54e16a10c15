//! main.rs: Regatta Suite rotation tool
//!
//! Reads a TOML regatta file, computes the fleet rotation (`[rotation]`) and/or
//! the team-racing round boats (`[round]`), persists fleet assignments to the
//! JSON rotation store, and prints the result as JSON on stdout.

mod file;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::info;

use rotation_engine::persistence::{load_store, save_store};
use rotation_engine::{assign_sails, FleetRotationCreator, RotationManager};

use file::RegattaFile;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rotation", about = "Regatta Suite sail rotation tool")]
struct Args {
    /// Regatta file path
    #[arg(short, long, default_value = "regatta.toml")]
    config: String,
    /// Rotation store (JSON). Loaded before and saved after computing.
    #[arg(short, long, default_value = "rotations.json")]
    store: String,
    /// Compute and print without saving the store
    #[arg(long)]
    dry_run: bool,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

// ── Main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rotation=info,rotation_engine=info".into()),
        )
        .init();

    let args = Args::parse();

    let text = tokio::fs::read_to_string(&args.config)
        .await
        .with_context(|| format!("cannot read {}", args.config))?;
    let file = RegattaFile::parse(&text)?;
    let regatta = file.regatta.build()?;

    info!(
        "⛵ Rotation tool: {} ({} scoring, {} teams, {} divisions)",
        regatta.id(),
        regatta.scoring(),
        regatta.team_ids().len(),
        regatta.divisions().len()
    );

    let mut store = load_store(&args.store)
        .await
        .with_context(|| format!("cannot load rotation store {}", args.store))?;
    let mut output = serde_json::Map::new();
    output.insert("regatta".into(), json!(regatta.id()));

    if let Some(section) = &file.rotation {
        let config = section.configuration(&regatta);
        let creator = FleetRotationCreator::select(regatta.scoring(), &config)?;
        let mut manager = RotationManager::new(&regatta, &mut store);
        let rows = creator
            .create_rotation(&mut manager, &config)
            .with_context(|| format!("cannot create {creator} rotation"))?;
        info!("Fleet rotation: {rows} assignments");
        output.insert("fleet".into(), report::fleet_report(&regatta, &store));
    }

    if let Some(section) = &file.round {
        let round = section.round()?;
        let sails = assign_sails(&round, &regatta.team_ids(), regatta.divisions(), section.frequency)
            .with_context(|| format!("cannot assign boats for {}", round.name))?;
        info!("Round {}: {} races assigned", round.name, sails.len());
        output.insert("round".into(), report::round_report(&regatta, &sails));
    }

    if args.dry_run {
        info!("Dry run, {} left untouched", args.store);
    } else {
        save_store(&args.store, &store)
            .await
            .with_context(|| format!("cannot save {}", args.store))?;
        info!("Saved rotation store to {}", args.store);
    }

    let output = serde_json::Value::Object(output);
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}
