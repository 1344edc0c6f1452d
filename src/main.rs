//! Hawaii Climate Data Service
//!
//! Serves the fixed read-only query set over the hawaii.sqlite snapshot:
//! precipitation, stations, temperature observations, and MIN/AVG/MAX
//! temperature aggregates, all as JSON over HTTP.
//!
//! Usage:
//!   cargo run --release                              # hawaii.sqlite, port 5000
//!   cargo run --release -- --port 8080               # listen elsewhere
//!   cargo run --release -- --database data/hawaii.sqlite
//!
//! Environment:
//!   CLIMATE_DATABASE - overrides the snapshot path (also read from .env)

use climate_service::config;
use climate_service::db::{self, ClimateStore};
use climate_service::endpoint;
use std::env;
use std::path::PathBuf;

fn main() {
    println!("🌺 Hawaii Climate Data Service");
    println!("==============================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut port_override: Option<u16> = None;
    let mut database_override: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                if i + 1 < args.len() {
                    port_override = args[i + 1].parse().ok();
                    i += 2;
                } else {
                    eprintln!("Error: --port requires a port number");
                    std::process::exit(1);
                }
            }
            "--database" => {
                if i + 1 < args.len() {
                    database_override = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("Error: --database requires a path");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--port PORT] [--database PATH]", args[0]);
                std::process::exit(1);
            }
        }
    }

    // climate.toml is optional; the defaults are a working configuration.
    // Precedence for the snapshot path: --database, then CLIMATE_DATABASE,
    // then climate.toml, then hawaii.sqlite in the working directory.
    let config = config::load_config();
    let port = port_override.unwrap_or(config.port);
    let database =
        database_override.unwrap_or_else(|| db::resolve_database_path(&config.database));

    // Validate the snapshot before accepting any traffic
    println!("📊 Validating climate store at {}...", database.display());
    let store = match ClimateStore::open(&database) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("\n❌ Store validation failed: {}\n", e);
            std::process::exit(1);
        }
    };
    println!("✓ Store validated\n");

    println!("🚀 Starting HTTP endpoint server...");
    println!("   Press Ctrl+C to stop\n");

    if let Err(e) = endpoint::start_endpoint_server(port, config.workers, store) {
        eprintln!("\n❌ Endpoint server error: {}", e);
        std::process::exit(1);
    }
}
