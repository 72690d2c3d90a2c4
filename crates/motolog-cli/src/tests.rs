use chrono::NaiveDate;
use clap::Parser;
use motolog_core::models::{
    OdometerRecord, QuickAction, QuickRecord, Record, RefuelRecord, TimelineItem, Vehicle,
};
use motolog_core::publish::RelayRejection;
use motolog_core::Delivery;
use nostr_sdk::prelude::Keys;

use crate::cli::{Cli, Commands, CompletionShell};
use crate::commands::common::{
    describe_delivery, find_vehicle, format_timeline_lines, parse_date, resolve_vehicle, summarize,
    timeline_to_list_item,
};
use crate::commands::completions::render_completions;
use crate::error::CliError;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

#[test]
fn parse_date_accepts_iso_and_defaults_to_today() {
    assert_eq!(parse_date(Some(" 2024-01-05 ")).unwrap(), date(5));
    assert!(parse_date(None).is_ok());
    assert!(parse_date(Some("")).is_ok());
    assert!(matches!(
        parse_date(Some("2024-13-01")),
        Err(CliError::InvalidInput(_))
    ));
}

#[test]
fn find_vehicle_matches_id_name_and_slug() {
    let mut cub = Vehicle::new("Super Cub");
    cub.id = "cub".to_string();
    let vehicles = vec![Vehicle::new("CB400 Super Four"), cub];

    assert_eq!(
        find_vehicle(&vehicles, "cb400-super-four").map(|v| v.name.as_str()),
        Some("CB400 Super Four")
    );
    assert_eq!(
        find_vehicle(&vehicles, "super cub").map(|v| v.id.as_str()),
        Some("cub")
    );
    assert_eq!(
        find_vehicle(&vehicles, "CB400 SUPER FOUR").map(|v| v.id.as_str()),
        Some("cb400-super-four")
    );
    assert!(find_vehicle(&vehicles, "ninja").is_none());
    assert!(find_vehicle(&vehicles, "  ").is_none());
}

#[test]
fn resolve_vehicle_falls_back_to_active() {
    let mut session = motolog_core::Session::read_only(Keys::generate().public_key());
    assert!(matches!(
        resolve_vehicle(&session, None),
        Err(CliError::NoVehicle)
    ));

    session
        .store
        .upsert(Record::Vehicle(Vehicle::new("CB400")));
    session.store.upsert(Record::Vehicle(Vehicle::new("Cub")));
    session.set_active_vehicle("cub").unwrap();

    assert_eq!(resolve_vehicle(&session, None).unwrap().id, "cub");
    assert_eq!(resolve_vehicle(&session, Some("cb400")).unwrap().id, "cb400");
    assert!(matches!(
        resolve_vehicle(&session, Some("ninja")),
        Err(CliError::VehicleNotFound(_))
    ));
}

#[test]
fn timeline_lines_are_one_per_record() {
    let mut refuel = RefuelRecord::new("cb400", date(3), true);
    refuel.fuel_amount = Some(12.5);
    refuel.odometer = Some(1200.0);
    refuel.notes = Some("highway".to_string());
    let items = vec![
        TimelineItem::Refuel(refuel),
        TimelineItem::Odometer(OdometerRecord::new("cb400", date(2), 1100.0)),
        TimelineItem::Quick(QuickRecord::new("cb400", date(1), QuickAction::Wash)),
    ];

    let lines = format_timeline_lines(&items);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("2024-01-03  refuel      1200 km"));
    assert!(lines[0].ends_with("12.5 L  full  (highway)"));
    assert!(lines[2].ends_with("wash"));
    assert_eq!(summarize(&items[1]), "1100 km");

    let json_item = timeline_to_list_item(&items[0]);
    assert_eq!(json_item.kind, "refuel");
    assert_eq!(json_item.odometer, Some(1200.0));
}

#[test]
fn delivery_descriptions() {
    assert_eq!(
        describe_delivery(&Delivery::Accepted {
            relay: "wss://a".to_string()
        }),
        "accepted by wss://a"
    );
    assert_eq!(
        describe_delivery(&Delivery::Unconfirmed {
            rejections: vec![RelayRejection {
                relay: "wss://a".to_string(),
                reason: "blocked".to_string(),
            }]
        }),
        "no relay accepted the entry (wss://a: blocked)"
    );
    assert!(describe_delivery(&Delivery::DeadlineElapsed).contains("deadline"));
}

#[test]
fn cli_parses_record_commands() {
    let cli = Cli::try_parse_from([
        "motolog",
        "--relay",
        "wss://relay.example",
        "refuel",
        "--fuel",
        "11.2",
        "--full",
        "--odometer",
        "1500",
        "-v",
        "cb400",
    ])
    .unwrap();
    assert_eq!(cli.relays, vec!["wss://relay.example".to_string()]);
    let Commands::Refuel(args) = cli.command else {
        panic!("expected refuel");
    };
    assert!(args.full);
    assert_eq!(args.fuel, Some(11.2));
    assert_eq!(args.common.vehicle.vehicle.as_deref(), Some("cb400"));

    let cli = Cli::try_parse_from(["motolog", "list", "--all", "--json"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Timeline {
            all: true,
            json: true,
            limit: 20,
            ..
        }
    ));
}

#[test]
fn cli_rejects_conflicting_login_flags() {
    let result = Cli::try_parse_from([
        "motolog",
        "auth",
        "login",
        "--secret-key",
        "nsec1x",
        "--generate",
    ]);
    assert!(result.is_err());
}

#[test]
fn completions_name_the_binary() {
    for shell in [CompletionShell::Bash, CompletionShell::Zsh, CompletionShell::Fish] {
        let script = String::from_utf8(render_completions(shell)).unwrap();
        assert!(script.contains("motolog"));
    }
}

#[test]
fn cli_parses_edit_and_rejects_full_with_partial() {
    let cli = Cli::try_parse_from([
        "motolog",
        "edit",
        "refuel:0190",
        "--fuel",
        "9.5",
        "--full",
        "--notes",
        "",
    ])
    .unwrap();
    let Commands::Edit(args) = cli.command else {
        panic!("expected edit");
    };
    assert_eq!(args.id, "refuel:0190");
    assert_eq!(args.fuel, Some(9.5));
    assert!(args.full);
    assert_eq!(args.notes.as_deref(), Some(""));

    let result = Cli::try_parse_from(["motolog", "edit", "refuel:0190", "--full", "--partial"]);
    assert!(result.is_err());
}
