/// Static schema declarations for the climate store.
///
/// The upstream data pipeline discovers these tables by reflecting the
/// SQLite file at startup; here the two entities are declared explicitly
/// and checked once when the store opens. This module is the single
/// source of truth for which tables and columns the service requires —
/// the store may carry more, but these must be present.

// ---------------------------------------------------------------------------
// Table declarations
// ---------------------------------------------------------------------------

/// Declared shape of one store table.
pub struct TableSchema {
    /// Table name as it appears in the SQLite file.
    pub name: &'static str,
    /// Columns the service queries or validates.
    pub columns: &'static [&'static str],
}

/// The `measurement` table: one row per (station, date) observation.
/// `date` is ISO `YYYY-MM-DD` text, `prcp` is nullable inches of
/// precipitation, `tobs` is the observed temperature in °F.
pub static MEASUREMENT: TableSchema = TableSchema {
    name: "measurement",
    columns: &["id", "station", "date", "prcp", "tobs"],
};

/// The `station` table: one row per monitoring station, keyed by the
/// `station` identifier that `measurement.station` references.
pub static STATION: TableSchema = TableSchema {
    name: "station",
    columns: &["id", "station", "name", "latitude", "longitude", "elevation"],
};

/// Every table the store must provide, validated in order at startup.
pub static TABLE_REGISTRY: &[&TableSchema] = &[&MEASUREMENT, &STATION];

/// Looks up a declared table by name. Returns `None` if not declared.
pub fn find_table(name: &str) -> Option<&'static TableSchema> {
    TABLE_REGISTRY.iter().copied().find(|t| t.name == name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_declares_both_entities() {
        let names: Vec<_> = TABLE_REGISTRY.iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec!["measurement", "station"],
            "the store carries exactly these two entities"
        );
    }

    #[test]
    fn test_no_duplicate_columns_within_a_table() {
        for table in TABLE_REGISTRY {
            let mut seen = std::collections::HashSet::new();
            for column in table.columns {
                assert!(
                    seen.insert(column),
                    "duplicate column '{}' declared for table '{}'",
                    column,
                    table.name
                );
            }
        }
    }

    #[test]
    fn test_queried_columns_are_declared() {
        // Every column referenced by the query layer must be part of the
        // startup validation, or a truncated snapshot would fail at
        // request time instead of at startup.
        for column in ["station", "date", "prcp", "tobs"] {
            assert!(
                MEASUREMENT.columns.contains(&column),
                "measurement queries rely on column '{}'",
                column
            );
        }
        assert!(STATION.columns.contains(&"station"));
    }

    #[test]
    fn test_find_table_returns_correct_entry() {
        let table = find_table("measurement").expect("measurement should be declared");
        assert_eq!(table.name, "measurement");
        assert!(table.columns.contains(&"tobs"));
    }

    #[test]
    fn test_find_table_returns_none_for_unknown_name() {
        assert!(find_table("observations").is_none());
    }
}
