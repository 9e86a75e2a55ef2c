use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wl_cli::commands::{daily, events, log, places, resolve, summary, task, util};
use wl_cli::store::Store;
use wl_cli::{Cli, Commands, Config, PlacesAction, TaskAction};

/// Load config and open the store, creating the data directory if needed.
fn open_store(config_path: Option<&Path>) -> Result<(Store, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let store = Store::open(&config.data_dir).context("failed to open data directory")?;
    Ok((store, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (store, config) = open_store(cli.config.as_deref())?;
    let offset = config.offset()?;
    let now = Utc::now();
    let mut out = std::io::stdout().lock();

    match command {
        Commands::Log(args) => {
            log::run(&mut out, &store, args, now, offset)?;
        }
        Commands::Delete { id } => events::delete(&mut out, &store, id)?,
        Commands::Events {
            date,
            kind,
            place,
            json,
        } => {
            let filter = events::build_filter(date.as_deref(), kind.as_deref(), place.as_deref())?;
            events::run(&mut out, &store, &filter, *json, offset)?;
        }
        Commands::Places(action) => match action {
            PlacesAction::List { json } => places::list(&mut out, &store, *json)?,
            PlacesAction::Add {
                id,
                name,
                lat,
                lon,
                radius,
                kind,
            } => {
                let new = places::NewPlace {
                    id: id.clone(),
                    name: name.clone(),
                    lat: *lat,
                    lon: *lon,
                    radius: *radius,
                    kind: kind.clone(),
                };
                places::add(&mut out, &store, &new)?;
            }
            PlacesAction::Remove { id } => places::remove(&mut out, &store, id)?,
        },
        Commands::Resolve { lat, lon } => resolve::run(&mut out, &store, *lat, *lon)?,
        Commands::Daily { date, days, json } => {
            let last = util::parse_date(date.as_deref(), now, offset)?;
            let dates = daily::date_range(last, *days)?;
            daily::run(&mut out, &store, &dates, *json, offset)?;
        }
        Commands::Summary { json } => summary::run(&mut out, &store, *json, now, offset)?,
        Commands::Task(action) => match action {
            TaskAction::Complete { id, date } => {
                let date = util::parse_date(date.as_deref(), now, offset)?;
                task::complete(&mut out, &store, date, *id, now, offset)?;
            }
            TaskAction::Reopen { id, date } => {
                let date = util::parse_date(date.as_deref(), now, offset)?;
                task::reopen(&mut out, &store, date, *id)?;
            }
        },
    }

    out.flush()?;
    Ok(())
}
