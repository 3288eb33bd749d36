use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// printquote - business card price calculator
#[derive(Parser)]
#[command(name = "printquote")]
#[command(about = "Quote business card print jobs from a tariff table")]
#[command(version)]
pub struct Cli {
    /// Tariff file to use instead of the built-in tariff
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List printing methods, papers, sides, weights and add-ons
    Catalog,
    /// Show the curated plans
    Plans,
    /// Show the supported quantities
    Quantities,
    /// Price a plan or a custom selection
    Quote(QuoteArgs),
    /// Suggest a plan for a budget and a desired number of cards
    Recommend {
        /// Total budget
        #[arg(short, long, allow_hyphen_values = true)]
        budget: String,
        /// Desired number of cards (snapped to the nearest supported quantity)
        #[arg(short, long, allow_hyphen_values = true)]
        quantity: String,
    },
    /// Validate a tariff file
    Validate {
        /// Path to the tariff file to validate
        file: PathBuf,
    },
    /// Write the active tariff to a JSON file
    Export {
        /// Destination path
        output: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct QuoteArgs {
    /// Start from a curated plan (economy, standard, premium); any level
    /// given alongside it refines the plan
    #[arg(long)]
    pub plan: Option<String>,

    /// Printing method key
    #[arg(short, long)]
    pub method: Option<String>,

    /// Paper type key
    #[arg(short, long)]
    pub paper: Option<String>,

    /// Side key (single_sided, double_sided)
    #[arg(short, long)]
    pub side: Option<String>,

    /// Weight key (e.g. 300gr)
    #[arg(short, long)]
    pub weight: Option<String>,

    /// Lamination add-on key
    #[arg(long)]
    pub lamination: Option<String>,

    /// Foil stamping add-on key
    #[arg(long)]
    pub foil: Option<String>,

    /// Corner rounding add-on key
    #[arg(long)]
    pub corners: Option<String>,

    /// Number of cards; must be a supported quantity
    #[arg(short, long)]
    pub quantity: Option<u32>,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
