//! Campus Nav CLI - Command-line interface
//!
//! Fetches walking directions and replays recorded position tracks through
//! the navigation engine.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use campus_nav::geo::LatLng;

use commands::common::ModeArg;
use commands::config::ConfigCommands;
use commands::replay::ReplayArgs;
use commands::route::RouteArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "campus-nav", version, about = "Turn-by-turn campus navigation")]
struct Cli {
    /// Use this configuration file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch directions between two coordinates
    Route {
        /// Origin as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        from: LatLng,

        /// Destination as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        to: LatLng,

        /// Travel mode (default from config, else walking)
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Google Maps API key (overrides config)
        #[arg(long)]
        api_key: Option<String>,

        /// Print the route as JSON
        #[arg(long)]
        json: bool,

        /// Also save the route as JSON to this file
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Run a recorded track against a saved route
    Replay {
        /// Route JSON (as written by `route --output`)
        #[arg(long, value_name = "FILE")]
        route: PathBuf,

        /// Track JSON: a list of position samples or position events
        #[arg(long, value_name = "FILE")]
        track: PathBuf,

        /// Replay speed factor; 0 replays without pacing
        #[arg(long, default_value_t = 0.0)]
        speed: f64,
    },

    /// View or modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Route {
            from,
            to,
            mode,
            api_key,
            json,
            output,
        } => {
            let runner = CliRunner::new(cli.config.as_deref(), cli.verbose)?;
            commands::route::run(
                &runner,
                RouteArgs {
                    from,
                    to,
                    mode,
                    api_key,
                    json,
                    output,
                },
            )
        }
        Commands::Replay {
            route,
            track,
            speed,
        } => {
            let runner = CliRunner::new(cli.config.as_deref(), cli.verbose)?;
            commands::replay::run(&runner, ReplayArgs { route, track, speed })
        }
        Commands::Config(command) => commands::config::run(command, cli.config),
    }
}
