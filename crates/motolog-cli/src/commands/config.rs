use motolog_core::models::QuickAction;
use motolog_core::preferences::{MaintenanceSettings, MaintenanceThreshold};
use motolog_core::RelayConfig;

use crate::cli::ConfigCommands;
use crate::cli_config::{default_config_path, CliConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, relays: &[String]) -> Result<(), CliError> {
    let config = CliConfig::load().map_err(CliError::Config)?;

    if matches!(command, ConfigCommands::Show) {
        for line in format_config_lines(&config, relays)? {
            println!("{line}");
        }
        return Ok(());
    }

    let config = apply_config_change(config, command)?;
    let path = config.save().map_err(CliError::Config)?;
    println!("Saved {}", path.display());
    Ok(())
}

/// Apply a mutating config command; `Show` leaves the config untouched.
pub fn apply_config_change(
    mut config: CliConfig,
    command: ConfigCommands,
) -> Result<CliConfig, CliError> {
    match command {
        ConfigCommands::Show => {}
        ConfigCommands::Relays { urls } => {
            let relay_config = RelayConfig::with_relays(urls);
            relay_config.validate()?;
            config.relays = relay_config.relays;
        }
        ConfigCommands::ResetRelays => config.relays.clear(),
        ConfigCommands::Threshold {
            action,
            warn,
            danger,
        } => {
            let action = parse_action(&action)?;
            let mut settings = MaintenanceSettings::new(config);
            settings.set_threshold(action, MaintenanceThreshold::new(warn, danger))?;
            config = settings.into_inner();
        }
        ConfigCommands::ResetThresholds => {
            let mut settings = MaintenanceSettings::new(config);
            settings.reset()?;
            config = settings.into_inner();
        }
    }
    Ok(config)
}

pub fn parse_action(value: &str) -> Result<QuickAction, CliError> {
    value.trim().parse::<QuickAction>().map_err(|error| {
        let known = QuickAction::ALL
            .iter()
            .map(|action| action.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        CliError::InvalidInput(format!("{error} (expected one of: {known})"))
    })
}

fn format_config_lines(config: &CliConfig, relays: &[String]) -> Result<Vec<String>, CliError> {
    let mut lines = vec![format!("config: {}", default_config_path().display())];

    let relay_config = config.relay_config(relays);
    lines.push("relays:".to_string());
    lines.extend(relay_config.relays.iter().map(|relay| format!("  {relay}")));
    lines.push(format!(
        "active vehicle: {}",
        config.active_vehicle.as_deref().unwrap_or("-")
    ));

    let thresholds = MaintenanceSettings::new(config.clone()).thresholds()?;
    lines.push("maintenance thresholds (warn/danger days):".to_string());
    lines.extend(thresholds.iter().map(|(action, threshold)| {
        format!(
            "  {:<15} {}/{}",
            action.as_str(),
            threshold.warn_days,
            threshold.danger_days
        )
    }));
    Ok(lines)
}
