use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use plantcare_core::VERSION;

/// Plantcare - a CLI-first plant care tracker
#[derive(Parser)]
#[command(name = "plantcare")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the plantcare database
    #[arg(short, long, global = true, env = "PLANTCARE_DB")]
    pub database: Option<String>,

    /// Acting user (email or UUID)
    #[arg(short, long, global = true, env = "PLANTCARE_USER")]
    pub user: Option<String>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new plantcare database
    Init(InitArgs),

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage the plant type catalog
    Type {
        #[command(subcommand)]
        command: TypeCommands,
    },

    /// Manage your plants
    Plant {
        #[command(subcommand)]
        command: PlantCommands,
    },

    /// Care calendar and task management
    Care {
        #[command(subcommand)]
        command: CareCommands,
    },

    /// Sensor readings and assignments
    Sensor {
        #[command(subcommand)]
        command: SensorCommands,
    },

    /// System administration
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the database will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Write the path into the config file as the default database
    #[arg(long)]
    pub save_config: bool,

    /// Config path override
    #[arg(long)]
    pub config_path: Option<String>,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user account
    Add {
        /// Email address (unique)
        #[arg(value_name = "EMAIL")]
        email: String,

        /// Display name
        #[arg(long)]
        username: Option<String>,
    },

    /// List all users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one user
    Show {
        /// User email or UUID
        #[arg(value_name = "USER")]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum TypeCommands {
    /// Add a plant type to the catalog
    Add(TypeAddArgs),

    /// List the catalog
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one plant type
    Show {
        /// Plant type name or UUID
        #[arg(value_name = "TYPE")]
        plant_type: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove an unreferenced plant type
    Remove {
        /// Plant type name or UUID
        #[arg(value_name = "TYPE")]
        plant_type: String,
    },
}

/// Arguments for `type add`
#[derive(Args)]
pub struct TypeAddArgs {
    /// Common name (e.g., "Monstera")
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Scientific name
    #[arg(long)]
    pub scientific_name: Option<String>,

    /// Watering frequency in days
    #[arg(long, value_name = "DAYS")]
    pub watering_days: u32,

    /// Fertilizing frequency in days
    #[arg(long, value_name = "DAYS")]
    pub fertilizing_days: u32,

    /// Repotting frequency in months
    #[arg(long, value_name = "MONTHS")]
    pub repotting_months: Option<u32>,

    /// Optimal temperature range, °C (min max)
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    pub temp: Vec<f64>,

    /// Optimal soil humidity range, percent (min max)
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    pub humidity: Vec<u32>,

    /// Optimal light range, lux (min max)
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    pub light: Vec<u32>,

    /// Free-form care tips
    #[arg(long)]
    pub care_tips: Option<String>,
}

#[derive(Subcommand)]
pub enum PlantCommands {
    /// Register a plant
    Add(PlantAddArgs),

    /// List your plants
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one plant with schedule and latest reading
    Show {
        /// Plant name or UUID
        #[arg(value_name = "PLANT")]
        plant: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update a plant's name, location or notes
    Update {
        /// Plant name or UUID
        #[arg(value_name = "PLANT")]
        plant: String,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New location
        #[arg(long)]
        location: Option<String>,

        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a plant and its tasks and readings
    Remove {
        /// Plant name or UUID
        #[arg(value_name = "PLANT")]
        plant: String,
    },

    /// Recompute a plant's health status
    Refresh {
        /// Plant name or UUID
        #[arg(value_name = "PLANT")]
        plant: String,
    },
}

/// Arguments for `plant add`
#[derive(Args)]
pub struct PlantAddArgs {
    /// Display name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Plant type name or UUID
    #[arg(long, value_name = "TYPE")]
    pub plant_type: String,

    /// Location (e.g., "Kitchen window")
    #[arg(long)]
    pub location: Option<String>,

    /// When the plant was last watered (YYYY-MM-DD, default today)
    #[arg(long, value_name = "DATE")]
    pub last_watered: Option<String>,

    /// When the plant was last fertilized (YYYY-MM-DD, default today)
    #[arg(long, value_name = "DATE")]
    pub last_fertilized: Option<String>,

    /// When the plant was last repotted (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub last_repotted: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand)]
pub enum CareCommands {
    /// Tasks scheduled for today
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Incomplete tasks over the coming days
    Upcoming {
        /// Horizon in days
        #[arg(long, value_name = "DAYS")]
        days: Option<i64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Incomplete tasks scheduled before today
    Overdue {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Tasks in a calendar month
    Month {
        /// Month as YYYY-MM
        #[arg(value_name = "MONTH")]
        month: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Tasks on a specific date
    Date {
        /// Date as YYYY-MM-DD
        #[arg(value_name = "DATE")]
        date: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Complete a task and advance the schedule
    Complete {
        /// Task UUID
        #[arg(value_name = "TASK_ID")]
        task_id: String,

        /// Completion notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Skip a task without rescheduling
    Skip {
        /// Task UUID
        #[arg(value_name = "TASK_ID")]
        task_id: String,
    },
}

#[derive(Subcommand)]
pub enum SensorCommands {
    /// Record a sensor reading (premium)
    Record(SensorRecordArgs),

    /// Mark a plant as sensor-equipped (premium)
    Assign {
        /// Plant name or UUID
        #[arg(value_name = "PLANT")]
        plant: String,
    },

    /// Detach a plant's sensor
    Unassign {
        /// Plant name or UUID
        #[arg(value_name = "PLANT")]
        plant: String,
    },

    /// Show a plant's latest reading
    Latest {
        /// Plant name or UUID
        #[arg(value_name = "PLANT")]
        plant: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a plant's readings
    List {
        /// Plant name or UUID
        #[arg(value_name = "PLANT")]
        plant: String,

        /// Time window (day, week, month; default all)
        #[arg(long, value_name = "PERIOD")]
        period: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export a plant's readings
    Export {
        /// Plant name or UUID
        #[arg(value_name = "PLANT")]
        plant: String,

        /// Output format
        #[arg(long, default_value = "csv")]
        format: String,
    },
}

/// Arguments for `sensor record`
#[derive(Args)]
pub struct SensorRecordArgs {
    /// Plant name or UUID
    #[arg(value_name = "PLANT")]
    pub plant: String,

    /// Temperature (°C)
    #[arg(long, value_name = "CELSIUS", allow_negative_numbers = true)]
    pub temperature: f64,

    /// Soil humidity (percent)
    #[arg(long, value_name = "PERCENT")]
    pub soil: Option<f64>,

    /// Air humidity (percent)
    #[arg(long, value_name = "PERCENT")]
    pub air: Option<f64>,

    /// Light level (lux)
    #[arg(long, value_name = "LUX")]
    pub light: u32,

    /// Recompute the plant's status after ingesting
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// System-wide statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Grant premium to a user
    GrantPremium {
        /// User email or UUID
        #[arg(value_name = "USER")]
        user: String,

        /// Subscription length in days
        #[arg(long, value_name = "DAYS")]
        days: Option<i64>,
    },

    /// Revoke a user's premium
    RevokePremium {
        /// User email or UUID
        #[arg(value_name = "USER")]
        user: String,
    },

    /// Recompute every plant's status
    Recompute,

    /// Check database integrity
    Check,

    /// Back up the database
    Backup {
        /// Destination path
        #[arg(value_name = "DEST")]
        destination: String,
    },

    /// Restore the database from a backup
    Restore {
        /// Backup path
        #[arg(value_name = "SOURCE")]
        source: String,
    },
}
