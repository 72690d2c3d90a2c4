use motolog_core::models::{FuelType, Vehicle};
use motolog_core::util::normalize_text_option;
use serde::Serialize;

use crate::cli::{FuelTypeArg, VehicleArgs, VehicleCommands};
use crate::commands::common::{find_vehicle, format_optional, open_context, print_report, Load};
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListItem {
    pub id: String,
    pub active: bool,
    #[serde(flatten)]
    pub vehicle: Vehicle,
}

pub async fn run_vehicle(command: VehicleCommands, relays: &[String]) -> Result<(), CliError> {
    match command {
        VehicleCommands::List { json } => {
            let context = open_context(relays, Load::All).await?;
            let active = context.session.active_vehicle().map(|vehicle| vehicle.id.clone());
            let vehicles = context.session.vehicles();

            if json {
                let items = vehicles
                    .iter()
                    .map(|vehicle| VehicleListItem {
                        id: vehicle.id.clone(),
                        active: active.as_deref() == Some(vehicle.id.as_str()),
                        vehicle: vehicle.clone(),
                    })
                    .collect::<Vec<_>>();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if vehicles.is_empty() {
                println!("No vehicles yet. Add one with `motolog vehicle add <name>`.");
            } else {
                for line in format_vehicle_lines(vehicles, active.as_deref()) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        VehicleCommands::Add(args) => {
            let vehicle = build_vehicle(args)?;
            let mut context = open_context(relays, Load::Newest).await?;
            let id = vehicle.id.clone();
            let report = context
                .service
                .save_vehicle(&mut context.session, vehicle)
                .await?;
            print_report(&id, &report);

            if context.config.active_vehicle.is_none() {
                context.config.active_vehicle = Some(id);
                context.config.save().map_err(CliError::Config)?;
            }
            Ok(())
        }
        VehicleCommands::Use { vehicle } => {
            let mut context = open_context(relays, Load::All).await?;
            let id = find_vehicle(context.session.vehicles(), &vehicle)
                .map(|vehicle| vehicle.id.clone())
                .ok_or_else(|| CliError::VehicleNotFound(vehicle.clone()))?;
            context.config.active_vehicle = Some(id.clone());
            context.config.save().map_err(CliError::Config)?;
            println!("Active vehicle: {id}");
            Ok(())
        }
        VehicleCommands::Delete { vehicle } => {
            let mut context = open_context(relays, Load::All).await?;
            let id = find_vehicle(context.session.vehicles(), &vehicle)
                .map(|vehicle| vehicle.id.clone())
                .ok_or_else(|| CliError::VehicleNotFound(vehicle.clone()))?;
            let report = context
                .service
                .delete_vehicle(&mut context.session, &id)
                .await?;
            print_report(&id, &report);

            if context.config.active_vehicle.as_deref() == Some(id.as_str()) {
                context.config.active_vehicle = None;
                context.config.save().map_err(CliError::Config)?;
            }
            Ok(())
        }
    }
}

const fn fuel_type(arg: FuelTypeArg) -> FuelType {
    match arg {
        FuelTypeArg::Regular => FuelType::Regular,
        FuelTypeArg::Premium => FuelType::Premium,
        FuelTypeArg::Diesel => FuelType::Diesel,
    }
}

pub fn build_vehicle(args: VehicleArgs) -> Result<Vehicle, CliError> {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidInput("vehicle name is required".to_string()));
    }
    for (label, value) in [
        ("displacement", args.displacement),
        ("tank capacity", args.tank),
        ("front tire pressure", args.tire_front),
        ("rear tire pressure", args.tire_rear),
    ] {
        if value.is_some_and(|value| !value.is_finite() || value <= 0.0) {
            return Err(CliError::InvalidInput(format!("{label} must be positive")));
        }
    }

    let mut vehicle = Vehicle::new(name);
    vehicle.maker = normalize_text_option(args.maker);
    vehicle.year = args.year;
    vehicle.displacement = args.displacement;
    vehicle.fuel_tank_capacity = args.tank;
    vehicle.fuel_type = args.fuel_type.map(fuel_type);
    vehicle.recommended_tire_pressure_front = args.tire_front;
    vehicle.recommended_tire_pressure_rear = args.tire_rear;
    Ok(vehicle)
}

pub fn format_vehicle_lines(vehicles: &[Vehicle], active: Option<&str>) -> Vec<String> {
    vehicles
        .iter()
        .map(|vehicle| {
            let marker = if active == Some(vehicle.id.as_str()) { "*" } else { " " };
            let mut line = format!("{marker} {:<16} {}", vehicle.id, vehicle.name);
            if let Some(maker) = &vehicle.maker {
                line.push_str(&format!("  {maker}"));
            }
            if let Some(year) = vehicle.year {
                line.push_str(&format!("  {year}"));
            }
            line.push_str(&format!(
                "  tank {}",
                format_optional(vehicle.fuel_tank_capacity, "L")
            ));
            line
        })
        .collect()
}
