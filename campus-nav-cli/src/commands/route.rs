//! Route command - fetch directions between two coordinates.

use std::path::PathBuf;

use campus_nav::geo::LatLng;
use campus_nav::route::{GoogleDirectionsProvider, ReqwestClient, Route, RouteProvider};

use super::common::{resolve_api_key, resolve_mode, ModeArg};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the route command.
pub struct RouteArgs {
    pub from: LatLng,
    pub to: LatLng,
    pub mode: Option<ModeArg>,
    pub api_key: Option<String>,
    pub json: bool,
    pub output: Option<PathBuf>,
}

/// Run the route command.
pub fn run(runner: &CliRunner, args: RouteArgs) -> Result<(), CliError> {
    runner.log_startup("route");
    let config = runner.config();

    let api_key = resolve_api_key(args.api_key, config)?;
    let mode = resolve_mode(args.mode, config);

    let client = ReqwestClient::with_timeout(config.provider.timeout_secs)?;
    let provider = GoogleDirectionsProvider::new(client, api_key);

    tracing::info!(from = %args.from, to = %args.to, %mode, "Requesting route");
    let route = provider.compute_route(args.from, args.to, mode)?;
    tracing::info!(steps = route.len(), provider = provider.name(), "Route received");

    if let Some(path) = &args.output {
        let json = to_json(&route)?;
        std::fs::write(path, json).map_err(|e| CliError::Input {
            path: path.clone(),
            message: e.to_string(),
        })?;
        println!("Saved route to {}", path.display());
    }

    if args.json {
        println!("{}", to_json(&route)?);
    } else {
        print_route(&route, provider.name());
    }

    Ok(())
}

fn to_json(route: &Route) -> Result<String, CliError> {
    serde_json::to_string_pretty(route)
        .map_err(|e| CliError::Runtime(format!("Failed to serialize route: {}", e)))
}

/// Print a numbered step list.
fn print_route(route: &Route, provider: &str) {
    println!(
        "Route: {}, {} (via {})",
        route.distance_text, route.duration_text, provider
    );
    println!();

    if route.is_empty() {
        println!("  (no steps)");
        return;
    }

    for (i, step) in route.steps.iter().enumerate() {
        println!(
            "  {:>2}. {} ({}, {})",
            i + 1,
            step.display_instruction(),
            step.distance_text,
            step.duration_text
        );
    }
}
