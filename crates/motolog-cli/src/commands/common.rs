use chrono::{Local, NaiveDate};
use motolog_core::models::{
    vehicle_id_for, InspectionType, Record, ShopCategory, TimelineItem, Vehicle,
};
use motolog_core::relay::NostrRelays;
use motolog_core::services::LogbookService;
use motolog_core::{Delivery, PublishReport, Session};
use serde::Serialize;

use crate::cli_config::CliConfig;
use crate::error::CliError;
use crate::keychain::{resolve_identity, IdentityStore};

/// How much history to pull when a command opens the logbook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Load {
    /// Nothing; the command queries the relays itself
    Nothing,
    /// The newest page
    Newest,
    /// Every page
    All,
}

/// Everything a logbook command works with
pub struct Context {
    pub config: CliConfig,
    pub service: LogbookService<NostrRelays>,
    pub session: Session,
}

impl Context {
    /// Keep paging back until `found` holds or the history runs out.
    pub async fn load_until(&mut self, found: impl Fn(&Session) -> bool) -> Result<(), CliError> {
        while !found(&self.session) && self.session.pagination.has_more {
            let cursor = self.session.pagination.oldest;
            self.service.load_more(&mut self.session).await?;
            if self.session.pagination.oldest == cursor {
                break;
            }
        }
        Ok(())
    }

    /// Publish a record and report how the relays took it
    pub async fn save(&mut self, record: Record) -> Result<(), CliError> {
        let id = record.id().to_string();
        let report = self.service.save_record(&mut self.session, record).await?;
        print_report(&id, &report);
        Ok(())
    }
}

pub async fn open_context(relays: &[String], load: Load) -> Result<Context, CliError> {
    let config = CliConfig::load().map_err(CliError::Config)?;
    let identity = resolve_identity(&IdentityStore::default())?.ok_or(CliError::NotLoggedIn)?;
    let relay_config = config.relay_config(relays);
    let transport = NostrRelays::connect(&relay_config).await?;

    let mut context = Context {
        service: LogbookService::new(transport, relay_config),
        session: identity.into_session(),
        config,
    };
    match load {
        Load::Nothing => return Ok(context),
        Load::Newest => {
            context.service.load_initial(&mut context.session).await?;
        }
        Load::All => {
            context.service.load_all(&mut context.session).await?;
        }
    }

    if let Some(active) = context.config.active_vehicle.clone() {
        context
            .load_until(|session| session.store.vehicle(&active).is_some())
            .await?;
        if context.session.set_active_vehicle(&active).is_err() {
            tracing::warn!("Active vehicle '{active}' was not found on the relays");
        }
    }
    Ok(context)
}

/// Find a vehicle by id, then by name, then by the id its name would get.
pub fn find_vehicle<'a>(vehicles: &'a [Vehicle], query: &str) -> Option<&'a Vehicle> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    vehicles
        .iter()
        .find(|vehicle| vehicle.id == query)
        .or_else(|| {
            vehicles
                .iter()
                .find(|vehicle| vehicle.name.trim().eq_ignore_ascii_case(query))
        })
        .or_else(|| {
            let slug = vehicle_id_for(query);
            vehicles.iter().find(|vehicle| vehicle.id == slug)
        })
}

/// The vehicle named by `--vehicle`, or the session's active one
pub fn resolve_vehicle<'a>(session: &'a Session, selector: Option<&str>) -> Result<&'a Vehicle, CliError> {
    match selector.map(str::trim).filter(|value| !value.is_empty()) {
        Some(query) => find_vehicle(session.vehicles(), query)
            .ok_or_else(|| CliError::VehicleNotFound(query.to_string())),
        None => session.active_vehicle().ok_or(CliError::NoVehicle),
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse `YYYY-MM-DD`; no value means today.
pub fn parse_date(value: Option<&str>) -> Result<NaiveDate, CliError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(today()),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            CliError::InvalidInput(format!("invalid date '{value}', expected YYYY-MM-DD"))
        }),
    }
}

pub fn describe_delivery(delivery: &Delivery) -> String {
    match delivery {
        Delivery::Accepted { relay } => format!("accepted by {relay}"),
        Delivery::Unconfirmed { rejections } => {
            let reasons = rejections
                .iter()
                .map(|rejection| format!("{}: {}", rejection.relay, rejection.reason))
                .collect::<Vec<_>>()
                .join("; ");
            format!("no relay accepted the entry ({reasons})")
        }
        Delivery::DeadlineElapsed => "no relay confirmed before the deadline".to_string(),
    }
}

pub fn print_report(id: &str, report: &PublishReport) {
    println!("{id}");
    if report.delivery.is_accepted() {
        tracing::info!(
            "Entry {} {}",
            report.event_id(),
            describe_delivery(&report.delivery)
        );
    } else {
        eprintln!("Warning: {}", describe_delivery(&report.delivery));
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineListItem {
    pub id: String,
    pub kind: String,
    pub date: NaiveDate,
    pub odometer: Option<f64>,
    pub summary: String,
}

pub fn timeline_to_list_item(item: &TimelineItem) -> TimelineListItem {
    TimelineListItem {
        id: item.id().to_string(),
        kind: item.kind().to_string(),
        date: item.date(),
        odometer: item.odometer(),
        summary: summarize(item),
    }
}

const fn inspection_label(kind: InspectionType) -> &'static str {
    match kind {
        InspectionType::Daily => "daily",
        InspectionType::Weekly => "weekly",
        InspectionType::Monthly => "monthly",
    }
}

const fn shop_label(category: ShopCategory) -> &'static str {
    match category {
        ShopCategory::Regular => "regular",
        ShopCategory::Repair => "repair",
        ShopCategory::Shaken => "shaken",
        ShopCategory::Custom => "custom",
    }
}

/// One-line description of a record
pub fn summarize(item: &TimelineItem) -> String {
    let mut parts = Vec::new();
    let notes = match item {
        TimelineItem::Refuel(r) => {
            if let Some(fuel) = r.fuel_amount {
                parts.push(format!("{fuel} L"));
            }
            if r.is_full_tank {
                parts.push("full".to_string());
            }
            if let Some(cost) = r.total_cost {
                parts.push(format!("cost {cost}"));
            }
            if let Some(station) = &r.station {
                parts.push(station.clone());
            }
            r.notes.as_ref()
        }
        TimelineItem::Quick(r) => {
            parts.push(r.action.to_string());
            r.notes.as_ref()
        }
        TimelineItem::Inspection(r) => {
            parts.push(format!("{} inspection", inspection_label(r.inspection_type)));
            if r.all_ok {
                parts.push("all ok".to_string());
            } else {
                let items = r
                    .issues
                    .iter()
                    .map(|issue| issue.item.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                parts.push(format!("issues: {items}"));
            }
            r.notes.as_ref()
        }
        TimelineItem::Shop(r) => {
            parts.push(r.category.map_or("shop", shop_label).to_string());
            if let Some(name) = &r.shop_name {
                parts.push(name.clone());
            }
            if !r.work_done.is_empty() {
                parts.push(r.work_done.join(", "));
            }
            if let Some(cost) = r.total_cost {
                parts.push(format!("cost {cost}"));
            }
            r.notes.as_ref()
        }
        TimelineItem::Odometer(r) => {
            parts.push(format!("{} km", r.odometer));
            None
        }
    };
    if let Some(notes) = notes {
        parts.push(format!("({notes})"));
    }
    parts.join("  ")
}

pub fn format_timeline_lines(items: &[TimelineItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            let odometer = item
                .odometer()
                .map_or_else(String::new, |km| format!("{km} km"));
            format!(
                "{}  {:<10}  {:<10}  {}  {}",
                item.date(),
                item.kind().label(),
                odometer,
                item.id(),
                summarize(item)
            )
        })
        .collect()
}

pub fn format_optional(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value} {unit}"))
}
