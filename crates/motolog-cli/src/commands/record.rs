//! Commands that add a dated record to a vehicle.

use motolog_core::models::{
    InspectionRecord, InspectionType, IssueStatus, OdometerRecord, QuickRecord, Record,
    RefuelRecord, ShopCategory, ShopRecord,
};
use motolog_core::util::normalize_text_option;

use crate::cli::{
    InspectionArgs, InspectionKind, OdometerArgs, QuickArgs, RefuelArgs, ShopArgs, ShopCategoryArg,
};
use crate::commands::common::{open_context, parse_date, resolve_vehicle, Load};
use crate::commands::config::parse_action;
use crate::error::CliError;

/// Resolve the vehicle, build the record for it and publish it.
pub async fn run_add<F>(relays: &[String], selector: Option<&str>, build: F) -> Result<(), CliError>
where
    F: FnOnce(&str) -> Result<Record, CliError>,
{
    let mut context = open_context(relays, Load::Newest).await?;
    context
        .load_until(|session| resolve_vehicle(session, selector).is_ok())
        .await?;
    let vehicle_id = resolve_vehicle(&context.session, selector)?.id.clone();
    let record = build(&vehicle_id)?;
    context.save(record).await
}

pub fn measurement(label: &str, value: Option<f64>) -> Result<Option<f64>, CliError> {
    match value {
        Some(value) if !value.is_finite() || value < 0.0 => Err(CliError::InvalidInput(format!(
            "{label} must be a non-negative number"
        ))),
        value => Ok(value),
    }
}

pub fn build_refuel(vehicle_id: &str, args: &RefuelArgs) -> Result<Record, CliError> {
    let date = parse_date(args.common.date.as_deref())?;
    let mut record = RefuelRecord::new(vehicle_id, date, args.full);
    record.fuel_amount = measurement("fuel amount", args.fuel)?;
    if record.fuel_amount == Some(0.0) {
        return Err(CliError::InvalidInput("fuel amount must be positive".to_string()));
    }
    record.odometer = measurement("odometer", args.odometer)?;
    record.price_per_liter = measurement("price", args.price)?;
    record.total_cost = measurement("cost", args.cost)?;
    record.station = normalize_text_option(args.station.clone());
    record.notes = normalize_text_option(args.common.notes.clone());
    Ok(Record::Refuel(record))
}

pub fn build_quick(vehicle_id: &str, args: &QuickArgs) -> Result<Record, CliError> {
    let action = parse_action(&args.action)?;
    let date = parse_date(args.common.date.as_deref())?;
    let mut record = QuickRecord::new(vehicle_id, date, action);
    record.odometer = measurement("odometer", args.odometer)?;
    record.notes = normalize_text_option(args.common.notes.clone());
    Ok(Record::Quick(record))
}

pub fn build_odometer(vehicle_id: &str, args: &OdometerArgs) -> Result<Record, CliError> {
    let date = parse_date(args.date.as_deref())?;
    let km = measurement("odometer", Some(args.km))?.unwrap_or_default();
    Ok(Record::Odometer(OdometerRecord::new(vehicle_id, date, km)))
}

pub fn build_inspection(vehicle_id: &str, args: &InspectionArgs) -> Result<Record, CliError> {
    let date = parse_date(args.common.date.as_deref())?;
    let inspection_type = match args.kind {
        InspectionKind::Daily => InspectionType::Daily,
        InspectionKind::Weekly => InspectionType::Weekly,
        InspectionKind::Monthly => InspectionType::Monthly,
    };
    let mut record = InspectionRecord::new(vehicle_id, date, inspection_type);
    record.odometer = measurement("odometer", args.odometer)?;
    for item in args.warnings.iter().filter_map(|item| non_empty(item)) {
        record.push_issue(item, IssueStatus::Warning);
    }
    for item in args.failures.iter().filter_map(|item| non_empty(item)) {
        record.push_issue(item, IssueStatus::Ng);
    }
    record.notes = normalize_text_option(args.common.notes.clone());
    Ok(Record::Inspection(record))
}

pub fn build_shop(vehicle_id: &str, args: &ShopArgs) -> Result<Record, CliError> {
    let date = parse_date(args.common.date.as_deref())?;
    let mut record = ShopRecord::new(vehicle_id, date);
    record.odometer = measurement("odometer", args.odometer)?;
    record.category = args.category.map(shop_category);
    record.shop_name = normalize_text_option(args.shop_name.clone());
    record.work_done = args
        .work_done
        .iter()
        .filter_map(|item| non_empty(item))
        .map(ToString::to_string)
        .collect();
    record.total_cost = measurement("cost", args.cost)?;
    record.next_date = args
        .next_date
        .as_deref()
        .map(|value| parse_date(Some(value)))
        .transpose()?;
    record.next_odometer = measurement("next odometer", args.next_odometer)?;
    record.notes = normalize_text_option(args.common.notes.clone());
    Ok(Record::Shop(record))
}

pub const fn shop_category(category: ShopCategoryArg) -> ShopCategory {
    match category {
        ShopCategoryArg::Regular => ShopCategory::Regular,
        ShopCategoryArg::Repair => ShopCategory::Repair,
        ShopCategoryArg::Shaken => ShopCategory::Shaken,
        ShopCategoryArg::Custom => ShopCategory::Custom,
    }
}

pub fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}
