//! FacilityMap CLI - Command-line interface
//!
//! This binary provides a command-line interface to the FacilityMap library:
//! one-off scans, a live session fed from stdin, and config management.

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use facilitymap::geo::BoundingBox;

use commands::common::SessionArgs;
use commands::config::ConfigCommands;
use commands::scan::ScanArgs;
use commands::watch::WatchArgs;

#[derive(Parser)]
#[command(name = "facilitymap")]
#[command(version = facilitymap::VERSION)]
#[command(about = "Find drinking water and public toilets near you", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate yourself once and list nearby facilities
    Scan {
        #[command(flatten)]
        session: SessionArgs,

        /// Area to search as south,west,north,east (default: around you)
        #[arg(long, allow_hyphen_values = true)]
        bbox: Option<BoundingBox>,

        /// Maximum facilities listed per layer
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Follow viewport changes read from stdin and print updates
    Watch {
        #[command(flatten)]
        session: SessionArgs,

        /// Maximum facilities listed per layer
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// View and modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            session,
            bbox,
            limit,
        } => commands::scan::run(ScanArgs {
            session,
            bbox,
            limit,
        }),
        Commands::Watch { session, limit } => {
            commands::watch::run(WatchArgs { session, limit })
        }
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
