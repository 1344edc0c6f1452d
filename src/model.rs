/// Shared data types and dataset constants.
///
/// The climate store is a fixed snapshot: its most recent observation is
/// dated 2017-08-23, and every "last twelve months" window in the API is
/// anchored there rather than at the current calendar date. Deriving the
/// window from `Utc::now()` would silently empty every response as the
/// snapshot ages.

use chrono::{Duration, NaiveDate};

// ---------------------------------------------------------------------------
// Dataset anchor
// ---------------------------------------------------------------------------

/// Latest observation date present in the snapshot.
pub fn latest_observation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2017, 8, 23).expect("valid calendar date")
}

/// Start of the rolling one-year window: exactly 365 days before the
/// snapshot's latest observation date (2016-08-23).
pub fn one_year_window_start() -> NaiveDate {
    latest_observation_date() - Duration::days(365)
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// One dated temperature reading from a single station.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureObservation {
    /// Observation date as stored, ISO `YYYY-MM-DD` text.
    pub date: String,
    /// Observed temperature in °F.
    pub temperature: f64,
}

/// MIN/AVG/MAX temperature over a date-filtered set of measurements.
/// All three fields are `None` when no measurement matched the filter;
/// an empty range is data, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureStats {
    pub tmin: Option<f64>,
    pub tavg: Option<f64>,
    pub tmax: Option<f64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_start_is_fixed_at_2016_08_23() {
        // 2017 is not a leap year, so 365 days lands exactly one
        // calendar year back. The anchor must never move with the clock.
        let expected = NaiveDate::from_ymd_opt(2016, 8, 23).unwrap();
        assert_eq!(one_year_window_start(), expected);
    }

    #[test]
    fn test_window_is_bounded_by_dataset_end() {
        assert!(one_year_window_start() < latest_observation_date());
    }

    #[test]
    fn test_empty_stats_row_is_all_none() {
        let stats = TemperatureStats {
            tmin: None,
            tavg: None,
            tmax: None,
        };
        assert!(stats.tmin.is_none() && stats.tavg.is_none() && stats.tmax.is_none());
    }
}
