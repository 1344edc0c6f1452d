/// Climate store access - validation and the read-only query set
///
/// Owns the path to the SQLite snapshot and exposes the fixed query
/// operations the endpoint serves. Every operation opens its own
/// short-lived read-only session and drops it before returning, so no
/// connection is ever held across a request boundary or leaked when a
/// query fails.

use crate::model::{TemperatureObservation, TemperatureStats};
use crate::schema::{self, TableSchema};
use chrono::NaiveDate;
use rusqlite::{Connection, OpenFlags};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Store configuration validation error, raised at startup only.
#[derive(Debug)]
pub enum StoreConfigError {
    /// No file at the resolved database path
    MissingDatabaseFile(PathBuf),
    /// File exists but could not be opened as a SQLite database
    OpenFailed(PathBuf, rusqlite::Error),
    /// A declared table is absent from the snapshot
    MissingTable(&'static str),
    /// A declared table is missing one of its declared columns
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    /// A validation query itself failed
    ValidationFailed(rusqlite::Error),
}

impl std::fmt::Display for StoreConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfigError::MissingDatabaseFile(path) => {
                write!(f, "Climate database not found at '{}'.\n\n", path.display())?;
                write!(f, "  The service reads a pre-built SQLite snapshot and never creates one.\n")?;
                write!(f, "  1. Place hawaii.sqlite in the working directory, or\n")?;
                write!(f, "  2. Point at it with --database PATH, or\n")?;
                write!(f, "  3. Set CLIMATE_DATABASE in the environment (or .env), or\n")?;
                write!(f, "  4. Set `database` in climate.toml")
            }
            StoreConfigError::OpenFailed(path, e) => {
                write!(f, "Failed to open '{}' as a SQLite database.\n\n", path.display())?;
                write!(f, "  Error: {}\n\n", e)?;
                write!(f, "  Common causes:\n")?;
                write!(f, "  - The file is not a SQLite database\n")?;
                write!(f, "  - The file is not readable by this process")
            }
            StoreConfigError::MissingTable(table) => {
                write!(f, "Required table '{}' does not exist in the snapshot.\n\n", table)?;
                write!(f, "  The file does not look like the expected climate dataset.\n")?;
                write!(f, "  Expected tables: measurement, station")
            }
            StoreConfigError::MissingColumn { table, column } => {
                write!(f, "Table '{}' is missing required column '{}'.\n\n", table, column)?;
                write!(f, "  The snapshot schema does not match the expected climate dataset.")
            }
            StoreConfigError::ValidationFailed(e) => {
                write!(f, "Store validation query failed: {}", e)
            }
        }
    }
}

impl std::error::Error for StoreConfigError {}

/// Result alias for the query operations below.
pub type QueryResult<T> = Result<T, rusqlite::Error>;

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

/// Resolves the database path: CLIMATE_DATABASE from the environment
/// (loaded from .env if present) overrides the configured path.
pub fn resolve_database_path(configured: &Path) -> PathBuf {
    // Load .env file if present
    dotenv::dotenv().ok();

    match env::var("CLIMATE_DATABASE") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => configured.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Store handle
// ---------------------------------------------------------------------------

/// Handle to the validated climate store. The handle is just the path;
/// cloning is cheap, and sessions are opened per operation.
#[derive(Debug, Clone)]
pub struct ClimateStore {
    path: PathBuf,
}

impl ClimateStore {
    /// Opens the store with full validation: the file must exist, open
    /// as SQLite, and carry the declared `measurement` and `station`
    /// tables with all of their declared columns.
    ///
    /// The validation session is dropped before returning; the handle
    /// keeps no connection.
    pub fn open(path: &Path) -> Result<Self, StoreConfigError> {
        if !path.exists() {
            return Err(StoreConfigError::MissingDatabaseFile(path.to_path_buf()));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| StoreConfigError::OpenFailed(path.to_path_buf(), e))?;

        for table in schema::TABLE_REGISTRY {
            verify_table(&conn, table)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Path this store was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens one read-only session. Dropping the connection releases it,
    /// so a session never outlives the operation that opened it, error
    /// paths included.
    fn session(&self) -> QueryResult<Connection> {
        Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
    }

    /// Date → precipitation for every reading on or after `since`.
    ///
    /// Readings from different stations on the same date collapse to a
    /// single entry and the last row wins. This collapse reproduces the
    /// upstream map contract; it is not an aggregation.
    pub fn precipitation_since(
        &self,
        since: NaiveDate,
    ) -> QueryResult<BTreeMap<String, Option<f64>>> {
        let conn = self.session()?;
        let mut stmt = conn.prepare("SELECT date, prcp FROM measurement WHERE date >= ?1")?;
        let rows = stmt.query_map([iso_date(since)], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<f64>>(1)?))
        })?;

        let mut readings = BTreeMap::new();
        for row in rows {
            let (date, prcp) = row?;
            readings.insert(date, prcp);
        }

        Ok(readings)
    }

    /// Every station identifier, one per `station` row, in store-default
    /// order with no deduplication.
    pub fn station_ids(&self) -> QueryResult<Vec<String>> {
        let conn = self.session()?;
        let mut stmt = conn.prepare("SELECT station FROM station")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    /// The station with the highest measurement count. Ties resolve to
    /// whichever group SQLite orders first; no further rule applies.
    ///
    /// An empty measurement table yields `QueryReturnedNoRows`, which
    /// the endpoint surfaces as a 500.
    pub fn most_active_station(&self) -> QueryResult<String> {
        let conn = self.session()?;
        conn.query_row(
            "SELECT station FROM measurement
             GROUP BY station
             ORDER BY COUNT(station) DESC
             LIMIT 1",
            [],
            |row| row.get(0),
        )
    }

    /// (date, temperature) readings for one station on or after `since`,
    /// in store-default order.
    pub fn observations_for_station_since(
        &self,
        station_id: &str,
        since: NaiveDate,
    ) -> QueryResult<Vec<TemperatureObservation>> {
        let conn = self.session()?;
        let mut stmt = conn.prepare(
            "SELECT date, tobs FROM measurement WHERE station = ?1 AND date >= ?2",
        )?;
        let observations = stmt
            .query_map(rusqlite::params![station_id, iso_date(since)], |row| {
                Ok(TemperatureObservation {
                    date: row.get(0)?,
                    temperature: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(observations)
    }

    /// MIN/AVG/MAX temperature over readings with date >= `start` and,
    /// when given, date <= `end` (inclusive).
    ///
    /// `start` and `end` arrive as raw request path segments and go to
    /// the filter unvalidated. Date text compares lexicographically, so
    /// a nonsensical value simply matches no rows and the aggregate row
    /// comes back with every field null.
    pub fn temperature_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> QueryResult<TemperatureStats> {
        let conn = self.session()?;
        let map = |row: &rusqlite::Row<'_>| {
            Ok(TemperatureStats {
                tmin: row.get(0)?,
                tavg: row.get(1)?,
                tmax: row.get(2)?,
            })
        };

        match end {
            Some(end) => conn.query_row(
                "SELECT MIN(tobs), AVG(tobs), MAX(tobs) FROM measurement
                 WHERE date >= ?1 AND date <= ?2",
                rusqlite::params![start, end],
                map,
            ),
            None => conn.query_row(
                "SELECT MIN(tobs), AVG(tobs), MAX(tobs) FROM measurement
                 WHERE date >= ?1",
                rusqlite::params![start],
                map,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Formats a date the way the store keys them: ISO `YYYY-MM-DD` text.
fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Verifies one declared table exists with all of its declared columns.
fn verify_table(conn: &Connection, table: &TableSchema) -> Result<(), StoreConfigError> {
    let present: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table.name],
            |row| row.get(0),
        )
        .map_err(StoreConfigError::ValidationFailed)?;

    if present == 0 {
        return Err(StoreConfigError::MissingTable(table.name));
    }

    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1)")
        .map_err(StoreConfigError::ValidationFailed)?;
    let columns: Vec<String> = stmt
        .query_map([table.name], |row| row.get(0))
        .map_err(StoreConfigError::ValidationFailed)?
        .collect::<Result<_, _>>()
        .map_err(StoreConfigError::ValidationFailed)?;

    for &column in table.columns {
        if !columns.iter().any(|c| c == column) {
            return Err(StoreConfigError::MissingColumn {
                table: table.name,
                column,
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
