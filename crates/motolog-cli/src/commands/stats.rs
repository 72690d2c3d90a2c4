use motolog_core::fuel::FuelStats;
use motolog_core::models::Vehicle;
use motolog_core::store::RecordStore;
use serde::Serialize;

use crate::commands::common::{format_optional, open_context, resolve_vehicle, Load};
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsOutput<'a> {
    vehicle_id: &'a str,
    #[serde(flatten)]
    stats: &'a FuelStats,
}

pub async fn run_stats(
    relays: &[String],
    selector: Option<&str>,
    as_json: bool,
) -> Result<(), CliError> {
    let context = open_context(relays, Load::All).await?;
    let session = &context.session;
    let vehicle = resolve_vehicle(session, selector)?;
    let stats = vehicle_stats(&session.store, vehicle);

    if as_json {
        let output = StatsOutput {
            vehicle_id: &vehicle.id,
            stats: &stats,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let odometer = session.store.latest_odometer(&vehicle.id);
        for line in format_stats_lines(vehicle, &stats, odometer) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Fuel figures for one vehicle; only refuel readings feed the estimate.
pub fn vehicle_stats(store: &RecordStore, vehicle: &Vehicle) -> FuelStats {
    FuelStats::compute(&store.refuels_for(&vehicle.id), vehicle.fuel_tank_capacity)
}

pub fn format_stats_lines(
    vehicle: &Vehicle,
    stats: &FuelStats,
    odometer: Option<f64>,
) -> Vec<String> {
    let mut lines = vec![
        vehicle.name.clone(),
        format!("  average:        {}", format_optional(stats.average, "km/L")),
        format!("  latest:         {}", format_optional(stats.latest, "km/L")),
        format!("  best:           {}", format_optional(stats.best, "km/L")),
        format!("  worst:          {}", format_optional(stats.worst, "km/L")),
        format!("  distance:       {}", format_optional(stats.total_distance, "km")),
        format!("  fuel:           {} L", stats.total_fuel),
        format!("  cost:           {}", stats.total_cost),
        format!("  odometer:       {}", format_optional(odometer, "km")),
    ];

    match (&stats.remaining, vehicle.fuel_tank_capacity) {
        (Some(remaining), _) => lines.push(format!(
            "  remaining:      {} L ({}%)",
            remaining.remaining, remaining.percentage
        )),
        (None, None) => lines.push("  remaining:      - (tank capacity unknown)".to_string()),
        (None, Some(_)) => lines.push("  remaining:      -".to_string()),
    }

    if !stats.intervals.is_empty() {
        lines.push("  intervals:".to_string());
        lines.extend(stats.intervals.iter().map(|interval| {
            format!(
                "    {}  {} km  {} L  {} km/L",
                interval.date, interval.distance, interval.fuel_amount, interval.km_per_liter
            )
        }));
    }
    lines
}
