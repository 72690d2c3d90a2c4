use motolog_core::models::{Record, RecordKind};
use motolog_core::util::normalize_text_option;

use crate::cli::EditArgs;
use crate::commands::common::{open_context, parse_date, print_report, Load};
use crate::commands::config::parse_action;
use crate::commands::delete::normalize_record_id;
use crate::commands::record::{measurement, non_empty, shop_category};
use crate::error::CliError;

pub async fn run_edit(relays: &[String], args: &EditArgs) -> Result<(), CliError> {
    let id = normalize_record_id(&args.id)?;
    let mut context = open_context(relays, Load::Newest).await?;
    context
        .load_until(|session| session.store.find_by_id(&id).is_some())
        .await?;
    let Some(item) = context.session.store.find_by_id(&id) else {
        return Err(motolog_core::Error::NotFound(id).into());
    };

    let original = Record::from(item);
    let edited = apply_edit(original.clone(), args)?;
    if edited == original {
        println!("{id}");
        return Ok(());
    }

    let report = context
        .service
        .update_record(&mut context.session, edited)
        .await?;
    print_report(&id, &report);
    Ok(())
}

/// Flags that only make sense for some record kinds
fn check_flags(args: &EditArgs, kind: RecordKind) -> Result<(), CliError> {
    use RecordKind::{Inspection, Odometer, Quick, Refuel, Shop};

    let flags: [(&str, bool, &[RecordKind]); 12] = [
        ("--notes", args.notes.is_some(), &[Refuel, Quick, Inspection, Shop]),
        ("--fuel", args.fuel.is_some(), &[Refuel]),
        ("--full", args.full, &[Refuel]),
        ("--partial", args.partial, &[Refuel]),
        ("--price", args.price.is_some(), &[Refuel]),
        ("--station", args.station.is_some(), &[Refuel]),
        ("--cost", args.cost.is_some(), &[Refuel, Shop]),
        ("--action", args.action.is_some(), &[Quick]),
        ("--category", args.category.is_some(), &[Shop]),
        ("--shop", args.shop_name.is_some(), &[Shop]),
        ("--work", !args.work_done.is_empty(), &[Shop]),
        (
            "--next-date/--next-odometer",
            args.next_date.is_some() || args.next_odometer.is_some(),
            &[Shop],
        ),
    ];
    match flags
        .iter()
        .find(|(_, given, kinds)| *given && !kinds.contains(&kind))
    {
        Some((flag, _, _)) => Err(CliError::InvalidInput(format!(
            "{flag} does not apply to {kind} records"
        ))),
        None => Ok(()),
    }
}

/// Apply the given flags to a record, keeping its identifier.
pub fn apply_edit(record: Record, args: &EditArgs) -> Result<Record, CliError> {
    check_flags(args, record.kind())?;
    let date = args
        .date
        .as_deref()
        .map(|value| parse_date(Some(value)))
        .transpose()?;
    let odometer = measurement("odometer", args.odometer)?;
    let notes = args.notes.clone().map(|notes| normalize_text_option(Some(notes)));

    let edited = match record {
        Record::Vehicle(_) => {
            return Err(CliError::InvalidInput(
                "use `motolog vehicle add` to change a vehicle".to_string(),
            ))
        }
        Record::Refuel(mut r) => {
            r.date = date.unwrap_or(r.date);
            r.odometer = odometer.or(r.odometer);
            r.notes = notes.unwrap_or(r.notes);
            if let Some(fuel) = measurement("fuel amount", args.fuel)? {
                if fuel <= 0.0 {
                    return Err(CliError::InvalidInput("fuel amount must be positive".to_string()));
                }
                r.fuel_amount = Some(fuel);
            }
            if args.full || args.partial {
                r.is_full_tank = args.full;
            }
            r.price_per_liter = measurement("price", args.price)?.or(r.price_per_liter);
            r.total_cost = measurement("cost", args.cost)?.or(r.total_cost);
            if let Some(station) = &args.station {
                r.station = normalize_text_option(Some(station.clone()));
            }
            Record::Refuel(r)
        }
        Record::Quick(mut r) => {
            r.date = date.unwrap_or(r.date);
            r.odometer = odometer.or(r.odometer);
            r.notes = notes.unwrap_or(r.notes);
            if let Some(action) = &args.action {
                r.action = parse_action(action)?;
            }
            Record::Quick(r)
        }
        Record::Inspection(mut r) => {
            r.date = date.unwrap_or(r.date);
            r.odometer = odometer.or(r.odometer);
            r.notes = notes.unwrap_or(r.notes);
            Record::Inspection(r)
        }
        Record::Shop(mut r) => {
            r.date = date.unwrap_or(r.date);
            r.odometer = odometer.or(r.odometer);
            r.notes = notes.unwrap_or(r.notes);
            r.category = args.category.map(shop_category).or(r.category);
            if let Some(name) = &args.shop_name {
                r.shop_name = normalize_text_option(Some(name.clone()));
            }
            if !args.work_done.is_empty() {
                r.work_done = args
                    .work_done
                    .iter()
                    .filter_map(|item| non_empty(item))
                    .map(ToString::to_string)
                    .collect();
            }
            r.total_cost = measurement("cost", args.cost)?.or(r.total_cost);
            if let Some(next_date) = &args.next_date {
                r.next_date = Some(parse_date(Some(next_date))?);
            }
            r.next_odometer = measurement("next odometer", args.next_odometer)?.or(r.next_odometer);
            Record::Shop(r)
        }
        Record::Odometer(mut r) => {
            r.date = date.unwrap_or(r.date);
            r.odometer = odometer.unwrap_or(r.odometer);
            Record::Odometer(r)
        }
    };
    Ok(edited)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use motolog_core::models::{
        OdometerRecord, QuickAction, QuickRecord, RefuelRecord, ShopCategory, ShopRecord,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cli::ShopCategoryArg;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    fn edit(id: &str) -> EditArgs {
        EditArgs {
            id: id.to_string(),
            ..EditArgs::default()
        }
    }

    #[test]
    fn refuel_edit_keeps_id_and_untouched_fields() {
        let mut refuel = RefuelRecord::new("cb400", date(1), false);
        refuel.fuel_amount = Some(8.0);
        refuel.odometer = Some(1_200.0);
        refuel.station = Some("ENEOS".to_string());
        refuel.notes = Some("rain".to_string());
        refuel.created_at = 42;

        let args = EditArgs {
            fuel: Some(8.4),
            full: true,
            notes: Some(String::new()),
            date: Some("2024-02-03".to_string()),
            ..edit(&refuel.id)
        };
        let Record::Refuel(edited) = apply_edit(Record::Refuel(refuel.clone()), &args).unwrap()
        else {
            panic!("expected a refuel");
        };

        assert_eq!(edited.id, refuel.id);
        assert_eq!(edited.created_at, 42);
        assert_eq!(edited.date, date(3));
        assert_eq!(edited.fuel_amount, Some(8.4));
        assert!(edited.is_full_tank);
        assert_eq!(edited.odometer, Some(1_200.0));
        assert_eq!(edited.station.as_deref(), Some("ENEOS"));
        assert_eq!(edited.notes, None);
    }

    #[test]
    fn partial_flag_clears_full_tank() {
        let refuel = RefuelRecord::new("cb400", date(1), true);
        let args = EditArgs {
            partial: true,
            ..edit(&refuel.id)
        };
        let Record::Refuel(edited) = apply_edit(Record::Refuel(refuel), &args).unwrap() else {
            panic!("expected a refuel");
        };
        assert!(!edited.is_full_tank);
    }

    #[test]
    fn edit_without_flags_is_unchanged() {
        let quick = Record::Quick(QuickRecord::new("cb400", date(1), QuickAction::Wash));
        let args = edit(quick.id());
        assert_eq!(apply_edit(quick.clone(), &args).unwrap(), quick);
    }

    #[test]
    fn quick_action_and_shop_fields_change() {
        let quick = QuickRecord::new("cb400", date(1), QuickAction::Wash);
        let args = EditArgs {
            action: Some("chain-lube".to_string()),
            ..edit(&quick.id)
        };
        let Record::Quick(edited) = apply_edit(Record::Quick(quick), &args).unwrap() else {
            panic!("expected a quick record");
        };
        assert_eq!(edited.action, QuickAction::ChainLube);

        let mut shop = ShopRecord::new("cb400", date(1));
        shop.work_done = vec!["oilChange".to_string()];
        let args = EditArgs {
            category: Some(ShopCategoryArg::Repair),
            work_done: vec!["brakePads".to_string(), " ".to_string()],
            next_odometer: Some(20_000.0),
            ..edit(&shop.id)
        };
        let Record::Shop(edited) = apply_edit(Record::Shop(shop), &args).unwrap() else {
            panic!("expected a shop record");
        };
        assert_eq!(edited.category, Some(ShopCategory::Repair));
        assert_eq!(edited.work_done, vec!["brakePads".to_string()]);
        assert_eq!(edited.next_odometer, Some(20_000.0));
    }

    #[test]
    fn flags_for_another_kind_are_rejected() {
        let odometer = Record::Odometer(OdometerRecord::new("cb400", date(1), 900.0));
        let args = EditArgs {
            fuel: Some(5.0),
            ..edit(odometer.id())
        };
        assert!(matches!(
            apply_edit(odometer.clone(), &args),
            Err(CliError::InvalidInput(message)) if message.contains("--fuel")
        ));

        let args = EditArgs {
            odometer: Some(950.0),
            ..edit(odometer.id())
        };
        let Record::Odometer(edited) = apply_edit(odometer, &args).unwrap() else {
            panic!("expected an odometer record");
        };
        assert_eq!(edited.odometer, 950.0);
    }

    #[test]
    fn bad_values_are_rejected() {
        let refuel = Record::Refuel(RefuelRecord::new("cb400", date(1), true));
        let zero = EditArgs {
            fuel: Some(0.0),
            ..edit(refuel.id())
        };
        assert!(apply_edit(refuel.clone(), &zero).is_err());
        let negative = EditArgs {
            odometer: Some(-1.0),
            ..edit(refuel.id())
        };
        assert!(apply_edit(refuel, &negative).is_err());
    }
}
