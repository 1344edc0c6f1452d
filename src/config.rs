/// Service configuration loader - parses climate.toml
///
/// The service runs out of the box with fixed defaults (hawaii.sqlite in
/// the working directory, port 5000), so no configuration file is
/// required. When climate.toml is present it overrides those defaults
/// without recompiling the service.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Service settings loaded from climate.toml. Every field is optional in
/// the file; missing fields fall back to the defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Path to the read-only SQLite climate snapshot.
    pub database: PathBuf,

    /// TCP port the HTTP endpoint listens on.
    pub port: u16,

    /// Number of accept worker threads serving requests.
    pub workers: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("hawaii.sqlite"),
            port: 5000,
            workers: 4,
        }
    }
}

/// Loads service configuration from climate.toml in the current working
/// directory. A missing file is not an error; the defaults are a
/// complete working configuration.
///
/// # Panics
/// Panics if climate.toml exists but cannot be read or parsed. This is
/// intentional — a present-but-broken configuration should stop the
/// service rather than be silently ignored.
pub fn load_config() -> ServiceConfig {
    load_config_from(Path::new("climate.toml"))
}

fn load_config_from(path: &Path) -> ServiceConfig {
    if !path.exists() {
        return ServiceConfig::default();
    }

    let contents = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));

    toml::from_str(&contents)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
}
