//! climate_service: read-only HTTP API over the Hawaii climate dataset.
//!
//! # Module structure
//!
//! ```text
//! climate_service
//! ├── model    — shared domain types + the fixed dataset date anchor
//! ├── schema   — static table declarations for the SQLite snapshot
//! ├── config   — service configuration loader (climate.toml, optional)
//! ├── db       — store validation + per-request read-only query sessions
//! └── endpoint — HTTP routes serving the fixed query set as JSON
//! ```

/// Public modules
pub mod config;
pub mod db;
pub mod endpoint;
pub mod model;
pub mod schema;
