//! Command-line schema.

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use simplelog::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "delivery")]
#[command(about = "Administer the food-delivery backend from the terminal")]
#[command(version)]
pub struct Cli {
    /// Backend API base URL
    #[arg(long, env = "DELIVERY_API_URL")]
    pub api_url: Option<String>,

    /// Dashboard statistics server URL
    #[arg(long, env = "DELIVERY_STATS_URL")]
    pub stats_url: Option<String>,

    /// Bearer token to send as-is
    #[arg(long, env = "DELIVERY_TOKEN", conflicts_with = "email")]
    pub token: Option<String>,

    /// Sign in with this email (needs DELIVERY_IDENTITY_API_KEY)
    #[arg(long, env = "DELIVERY_EMAIL", requires = "password")]
    pub email: Option<String>,

    #[arg(long, env = "DELIVERY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Log level written to the log file
    #[arg(long, env = "DELIVERY_LOG_LEVEL", default_value = "debug")]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List a resource as a table
    List {
        resource: ResourceKind,

        /// Keep rows where any column contains this text
        #[arg(long)]
        search: Option<String>,

        /// Sort by a column; repeat to toggle descending
        #[arg(long = "sort", value_name = "FIELD")]
        sort: Vec<String>,

        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page
        #[arg(long, env = "DELIVERY_PAGE_SIZE")]
        page_size: Option<usize>,
    },

    /// Show one record as JSON
    Get { resource: ResourceKind, id: i64 },

    /// Delete one record
    Delete {
        resource: ResourceKind,
        id: i64,

        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Print new orders as they arrive, until Ctrl-C
    WatchOrders {
        /// Seconds between polls
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },

    /// Print dashboard aggregates
    Stats {
        #[command(subcommand)]
        series: StatsSeries,
    },

    /// Ask the help-desk assistant; without a question, list the FAQs
    Ask {
        /// Question text
        question: Vec<String>,

        /// Answer the FAQ with this number instead
        #[arg(long, conflicts_with = "question")]
        faq: Option<usize>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum StatsSeries {
    /// Sales totals per day
    Sales,
    /// Orders and revenue per day
    Orders,
    /// Orders per hour on one day
    Hours {
        /// Day as YYYY-MM-DD
        date: String,
    },
    /// Latest known state of each motorcycle
    Motorcycles,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Restaurants,
    Products,
    Menus,
    Customers,
    Orders,
    Addresses,
    Drivers,
    Motorcycles,
    Shifts,
    Issues,
    Photos,
}
