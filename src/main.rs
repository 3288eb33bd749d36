//! printquote - command-line entry point
//!
//! Loads the tariff once, runs one subcommand and prints its output.

use printquote::cli::{Cli, Commands};
use printquote::commands;
use printquote::report;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr; `RUST_LOG` overrides the default level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed");

    let catalog = || commands::load_catalog(cli.catalog.as_deref());

    let output = match &cli.command {
        Commands::Validate { file } => {
            info!("Validating tariff file: {:?}", file);
            match commands::validate(file) {
                Ok(message) => message,
                Err(e) => {
                    error!("Tariff validation failed: {:#}", e);
                    eprintln!("✗ Tariff validation failed: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Catalog => report::render_catalog(&catalog()?),
        Commands::Plans => report::render_plans(&catalog()?),
        Commands::Quantities => format!("{}\n", report::render_quantities()),
        Commands::Quote(args) => commands::quote(&catalog()?, args)?,
        Commands::Recommend { budget, quantity } => {
            commands::recommend(&catalog()?, budget, quantity)?
        }
        Commands::Export { output } => commands::export(&catalog()?, output)?,
    };

    print!("{}", output);
    Ok(())
}
