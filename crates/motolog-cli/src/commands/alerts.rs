use motolog_core::preferences::{
    maintenance_alerts, AlertLevel, MaintenanceAlert, MaintenanceSettings,
};

use crate::commands::common::{open_context, resolve_vehicle, today, Load};
use crate::error::CliError;

pub async fn run_alerts(
    relays: &[String],
    selector: Option<&str>,
    as_json: bool,
) -> Result<(), CliError> {
    let context = open_context(relays, Load::All).await?;
    let session = &context.session;
    let vehicle = resolve_vehicle(session, selector)?;
    let thresholds = MaintenanceSettings::new(context.config.clone()).thresholds()?;
    let alerts = maintenance_alerts(&session.store.quicks_for(&vehicle.id), &thresholds, today());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&alerts)?);
    } else {
        println!("{}", vehicle.name);
        for line in format_alert_lines(&alerts) {
            println!("{line}");
        }
    }
    Ok(())
}

const fn level_label(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Ok => "ok",
        AlertLevel::Warn => "due",
        AlertLevel::Danger => "OVERDUE",
        AlertLevel::Never => "never",
    }
}

pub fn format_alert_lines(alerts: &[MaintenanceAlert]) -> Vec<String> {
    alerts
        .iter()
        .map(|alert| {
            let since = match (alert.last_date, alert.days_since) {
                (Some(date), Some(days)) => format!("{days} days ago ({date})"),
                _ => "not recorded".to_string(),
            };
            format!(
                "  {:<8} {:<15} {since}",
                level_label(alert.level),
                alert.action.as_str()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use motolog_core::models::QuickAction;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn alert_lines_describe_each_level() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let alerts = vec![
            MaintenanceAlert {
                action: QuickAction::ChainLube,
                last_date: Some(date),
                days_since: Some(20),
                level: AlertLevel::Danger,
            },
            MaintenanceAlert {
                action: QuickAction::Wash,
                last_date: None,
                days_since: None,
                level: AlertLevel::Never,
            },
        ];
        let lines = format_alert_lines(&alerts);
        assert_eq!(
            lines[0],
            "  OVERDUE  chain-lube      20 days ago (2024-01-01)"
        );
        assert_eq!(lines[1], "  never    wash            not recorded");
    }
}
