use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "motolog")]
#[command(about = "Keep a motorcycle maintenance and fuel log on Nostr relays")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Relay URL to use instead of the configured set (repeatable)
    #[arg(long = "relay", global = true, value_name = "URL")]
    pub relays: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the identity entries are signed with
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Show or change CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Manage vehicles
    Vehicle {
        #[command(subcommand)]
        command: VehicleCommands,
    },
    /// Record a refuel
    Refuel(RefuelArgs),
    /// Record a quick maintenance action
    Quick(QuickArgs),
    /// Record an odometer reading
    Odometer(OdometerArgs),
    /// Record an inspection
    Inspection(InspectionArgs),
    /// Record a shop visit
    Shop(ShopArgs),
    /// Show a vehicle's records, newest first
    #[command(alias = "list")]
    Timeline {
        #[command(flatten)]
        vehicle: VehicleSelector,
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Page through the whole history instead of the newest page
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change fields of an existing record
    Edit(EditArgs),
    /// Delete a record by id
    Delete {
        /// Record id (e.g. refuel:0190...)
        id: String,
    },
    /// Show fuel efficiency statistics
    Stats {
        #[command(flatten)]
        vehicle: VehicleSelector,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show maintenance reminders
    Alerts {
        #[command(flatten)]
        vehicle: VehicleSelector,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the raw entries stored on the relays
    Raw {
        /// Only show the entry with this identifier tag
        #[arg(long, value_name = "D_TAG")]
        id: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store a key in the system keychain
    Login {
        /// Secret key (nsec or hex) for a signing session
        #[arg(long, value_name = "NSEC", conflicts_with_all = ["public_key", "generate"])]
        secret_key: Option<String>,
        /// Public key (npub or hex) for a read-only session
        #[arg(long, value_name = "NPUB", conflicts_with = "generate")]
        public_key: Option<String>,
        /// Generate a new secret key
        #[arg(long)]
        generate: bool,
    },
    /// Show the current identity
    Status,
    /// Remove the stored key
    Logout,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current configuration
    Show,
    /// Replace the relay set
    Relays {
        /// Relay URLs (ws:// or wss://)
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Go back to the default relay set
    ResetRelays,
    /// Set a maintenance reminder threshold
    Threshold {
        /// Quick action (e.g. chain-lube)
        action: String,
        /// Days until the reminder warns
        #[arg(long)]
        warn: u32,
        /// Days until the reminder is overdue
        #[arg(long)]
        danger: u32,
    },
    /// Restore the default maintenance thresholds
    ResetThresholds,
}

#[derive(Subcommand)]
pub enum VehicleCommands {
    /// List vehicles
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add or update a vehicle
    Add(VehicleArgs),
    /// Make a vehicle the default for new records
    Use {
        /// Vehicle id or name
        vehicle: String,
    },
    /// Delete a vehicle (its records are kept)
    Delete {
        /// Vehicle id or name
        vehicle: String,
    },
}

#[derive(Args)]
pub struct VehicleSelector {
    /// Vehicle id or name (defaults to the active vehicle)
    #[arg(long, short = 'v', value_name = "VEHICLE")]
    pub vehicle: Option<String>,
}

#[derive(Args)]
pub struct VehicleArgs {
    /// Display name; the id is derived from it
    pub name: String,
    #[arg(long)]
    pub maker: Option<String>,
    #[arg(long)]
    pub year: Option<u32>,
    /// Engine displacement (cc)
    #[arg(long)]
    pub displacement: Option<f64>,
    /// Fuel tank capacity (L)
    #[arg(long, value_name = "LITRES")]
    pub tank: Option<f64>,
    #[arg(long, value_enum)]
    pub fuel_type: Option<FuelTypeArg>,
    /// Recommended front tire pressure (kPa)
    #[arg(long, value_name = "KPA")]
    pub tire_front: Option<f64>,
    /// Recommended rear tire pressure (kPa)
    #[arg(long, value_name = "KPA")]
    pub tire_rear: Option<f64>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum FuelTypeArg {
    Regular,
    Premium,
    Diesel,
}

/// Options shared by every dated record
#[derive(Args)]
pub struct RecordArgs {
    #[command(flatten)]
    pub vehicle: VehicleSelector,
    /// Date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<String>,
    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct RefuelArgs {
    #[command(flatten)]
    pub common: RecordArgs,
    /// Litres added
    #[arg(long, value_name = "LITRES")]
    pub fuel: Option<f64>,
    /// The tank was filled to the brim
    #[arg(long)]
    pub full: bool,
    /// Odometer reading (km)
    #[arg(long, value_name = "KM")]
    pub odometer: Option<f64>,
    /// Price per litre
    #[arg(long)]
    pub price: Option<f64>,
    /// Total paid
    #[arg(long)]
    pub cost: Option<f64>,
    /// Station name
    #[arg(long)]
    pub station: Option<String>,
}

#[derive(Args)]
pub struct QuickArgs {
    /// Action (tire-pressure, chain-lube, chain-clean, chain-adjust, wash,
    /// oil-check, coolant-check, battery-charge, custom)
    pub action: String,
    #[command(flatten)]
    pub common: RecordArgs,
    /// Odometer reading (km)
    #[arg(long, value_name = "KM")]
    pub odometer: Option<f64>,
}

#[derive(Args)]
pub struct OdometerArgs {
    /// Odometer reading (km)
    pub km: f64,
    #[command(flatten)]
    pub vehicle: VehicleSelector,
    /// Date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum InspectionKind {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Args)]
pub struct InspectionArgs {
    /// Inspection cadence
    #[arg(value_enum)]
    pub kind: InspectionKind,
    #[command(flatten)]
    pub common: RecordArgs,
    /// Odometer reading (km)
    #[arg(long, value_name = "KM")]
    pub odometer: Option<f64>,
    /// Item that needs attention soon (repeatable)
    #[arg(long = "warning", value_name = "ITEM")]
    pub warnings: Vec<String>,
    /// Item that failed (repeatable)
    #[arg(long = "ng", value_name = "ITEM")]
    pub failures: Vec<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ShopCategoryArg {
    Regular,
    Repair,
    Shaken,
    Custom,
}

#[derive(Args)]
pub struct ShopArgs {
    #[command(flatten)]
    pub common: RecordArgs,
    /// Odometer reading (km)
    #[arg(long, value_name = "KM")]
    pub odometer: Option<f64>,
    #[arg(long, value_enum)]
    pub category: Option<ShopCategoryArg>,
    /// Shop name
    #[arg(long = "shop", value_name = "NAME")]
    pub shop_name: Option<String>,
    /// Work item (repeatable, e.g. oilChange)
    #[arg(long = "work", value_name = "ITEM")]
    pub work_done: Vec<String>,
    /// Total paid
    #[arg(long)]
    pub cost: Option<f64>,
    /// Date the next visit is due (YYYY-MM-DD)
    #[arg(long)]
    pub next_date: Option<String>,
    /// Odometer reading the next visit is due at
    #[arg(long, value_name = "KM")]
    pub next_odometer: Option<f64>,
}

/// Fields to change on an existing record; anything not given is kept
#[derive(Args, Default)]
pub struct EditArgs {
    /// Record id (e.g. refuel:0190...)
    pub id: String,
    /// Date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
    /// Free-form notes (an empty value clears them)
    #[arg(long)]
    pub notes: Option<String>,
    /// Odometer reading (km)
    #[arg(long, value_name = "KM")]
    pub odometer: Option<f64>,
    /// Litres added (refuel)
    #[arg(long, value_name = "LITRES")]
    pub fuel: Option<f64>,
    /// Mark a refuel as a full tank
    #[arg(long, conflicts_with = "partial")]
    pub full: bool,
    /// Mark a refuel as a partial top-up
    #[arg(long)]
    pub partial: bool,
    /// Price per litre (refuel)
    #[arg(long)]
    pub price: Option<f64>,
    /// Total paid (refuel, shop)
    #[arg(long)]
    pub cost: Option<f64>,
    /// Station name (refuel)
    #[arg(long)]
    pub station: Option<String>,
    /// Quick action (quick)
    #[arg(long)]
    pub action: Option<String>,
    /// Shop category (shop)
    #[arg(long, value_enum)]
    pub category: Option<ShopCategoryArg>,
    /// Shop name (shop)
    #[arg(long = "shop", value_name = "NAME")]
    pub shop_name: Option<String>,
    /// Work item, replacing the recorded list (shop, repeatable)
    #[arg(long = "work", value_name = "ITEM")]
    pub work_done: Vec<String>,
    /// Date the next visit is due (shop)
    #[arg(long)]
    pub next_date: Option<String>,
    /// Odometer reading the next visit is due at (shop)
    #[arg(long, value_name = "KM")]
    pub next_odometer: Option<f64>,
}
