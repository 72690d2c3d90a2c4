//! motolog CLI - keep a motorcycle maintenance and fuel log on Nostr relays
//!
//! Records are signed with the stored key and published to the configured
//! relays; every command reads the log back from the relays.

mod cli;
mod cli_config;
mod commands;
mod error;
mod keychain;
#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::alerts::run_alerts;
use crate::commands::auth_cmd::run_auth;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::raw::run_raw;
use crate::commands::record::{
    build_inspection, build_odometer, build_quick, build_refuel, build_shop, run_add,
};
use crate::commands::stats::run_stats;
use crate::commands::timeline::run_timeline;
use crate::commands::vehicle::run_vehicle;
use crate::error::CliError;
use crate::keychain::IdentityStore;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "motolog=info".parse::<tracing_subscriber::filter::Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let relays = cli.relays.as_slice();

    match cli.command {
        Commands::Auth { command } => run_auth(command, &IdentityStore::default())?,
        Commands::Config { command } => run_config(command, relays)?,
        Commands::Vehicle { command } => run_vehicle(command, relays).await?,
        Commands::Refuel(args) => {
            let selector = args.common.vehicle.vehicle.clone();
            run_add(relays, selector.as_deref(), |id| build_refuel(id, &args)).await?;
        }
        Commands::Quick(args) => {
            let selector = args.common.vehicle.vehicle.clone();
            run_add(relays, selector.as_deref(), |id| build_quick(id, &args)).await?;
        }
        Commands::Odometer(args) => {
            let selector = args.vehicle.vehicle.clone();
            run_add(relays, selector.as_deref(), |id| build_odometer(id, &args)).await?;
        }
        Commands::Inspection(args) => {
            let selector = args.common.vehicle.vehicle.clone();
            run_add(relays, selector.as_deref(), |id| build_inspection(id, &args)).await?;
        }
        Commands::Shop(args) => {
            let selector = args.common.vehicle.vehicle.clone();
            run_add(relays, selector.as_deref(), |id| build_shop(id, &args)).await?;
        }
        Commands::Timeline {
            vehicle,
            limit,
            all,
            json,
        } => {
            run_timeline(relays, vehicle.vehicle.as_deref(), limit, all, json).await?;
        }
        Commands::Edit(args) => run_edit(relays, &args).await?,
        Commands::Delete { id } => run_delete(relays, &id).await?,
        Commands::Stats { vehicle, json } => {
            run_stats(relays, vehicle.vehicle.as_deref(), json).await?;
        }
        Commands::Alerts { vehicle, json } => {
            run_alerts(relays, vehicle.vehicle.as_deref(), json).await?;
        }
        Commands::Raw { id, json } => run_raw(relays, id.as_deref(), json).await?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
