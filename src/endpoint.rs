/// HTTP endpoint serving the climate dataset
///
/// Fixed GET routes over the read-only store. Every handler runs exactly
/// one store operation (two for /tobs, which first resolves the most
/// active station) and shapes the result into the JSON the original
/// dataset consumers expect.
///
/// Endpoints:
/// - GET /                       - HTML listing of available routes
/// - GET /health                 - Service health check
/// - GET /api/v1.0/precipitation - Last year of precipitation by date
/// - GET /api/v1.0/stations      - Station identifiers
/// - GET /api/v1.0/tobs          - Last year of observations, most active station
/// - GET /api/v1.0/{start}       - MIN/AVG/MAX temperature from a start date
/// - GET /api/v1.0/{start}/{end} - MIN/AVG/MAX temperature, inclusive range

use crate::db::ClimateStore;
use crate::model::{self, TemperatureStats};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::Arc;
use threadpool::ThreadPool;

type HttpResponse = tiny_http::Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// One temperature observation as served by /api/v1.0/tobs.
#[derive(Debug, Serialize, Deserialize)]
pub struct ObservationEntry {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
}

/// Aggregate temperature summary as served by the start and start/end
/// routes. All three fields are null when no measurement fell in range.
#[derive(Debug, Serialize, Deserialize)]
pub struct TemperatureSummary {
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
    #[serde(rename = "TAVG")]
    pub tavg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
}

impl From<TemperatureStats> for TemperatureSummary {
    fn from(stats: TemperatureStats) -> Self {
        Self {
            tmin: stats.tmin,
            tavg: stats.tavg,
            tmax: stats.tmax,
        }
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Dispatches one request URL to its handler.
///
/// Anything under /api/v1.0/ that is not a fixed route is read as a
/// start date or a start/end date pair; the raw path segments go to the
/// store filter without validation or type coercion.
pub fn route(store: &ClimateStore, url: &str) -> HttpResponse {
    // Path only - the raw URL may carry a query string
    let path = url.split('?').next().unwrap_or(url);

    match path {
        "/" => handle_index(),
        "/health" => handle_health(),
        "/api/v1.0/precipitation" => handle_precipitation(store),
        "/api/v1.0/stations" => handle_stations(store),
        "/api/v1.0/tobs" => handle_tobs(store),
        _ => match path
            .strip_prefix("/api/v1.0/")
            .and_then(parse_date_segments)
        {
            Some((start, end)) => handle_temperature_range(store, start, end),
            None => handle_not_found(),
        },
    }
}

/// Splits the free-form tail of /api/v1.0/ into (start, optional end).
/// Empty or surplus segments do not match a route; they fall through
/// to the 404 handler like any other unmatched path.
fn parse_date_segments(rest: &str) -> Option<(&str, Option<&str>)> {
    let segments: Vec<&str> = rest.split('/').collect();
    match segments.as_slice() {
        [start] if !start.is_empty() => Some((start, None)),
        [start, end] if !start.is_empty() && !end.is_empty() => Some((start, Some(end))),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Handle / - the route listing, served as HTML.
fn handle_index() -> HttpResponse {
    let body = concat!(
        "Welcome to the Hawaii Climate App!<br/><br/>",
        "Available Routes:<br/>",
        "/api/v1.0/precipitation<br/>",
        "/api/v1.0/stations<br/>",
        "/api/v1.0/tobs<br/>",
        "/api/v1.0/&lt;start&gt;<br/>",
        "/api/v1.0/&lt;start&gt;/&lt;end&gt;",
    );
    create_html_response(body)
}

/// Handle /health
fn handle_health() -> HttpResponse {
    create_response(
        200,
        serde_json::json!({
            "status": "ok",
            "service": "climate_service",
            "version": "0.1.0"
        }),
    )
}

/// Handle /api/v1.0/precipitation - the last twelve months of
/// precipitation readings, keyed by date.
fn handle_precipitation(store: &ClimateStore) -> HttpResponse {
    match store.precipitation_since(model::one_year_window_start()) {
        Ok(readings) => create_response(200, serde_json::to_value(&readings).unwrap()),
        Err(e) => create_error_response(e),
    }
}

/// Handle /api/v1.0/stations
fn handle_stations(store: &ClimateStore) -> HttpResponse {
    match store.station_ids() {
        Ok(ids) => create_response(200, serde_json::to_value(&ids).unwrap()),
        Err(e) => create_error_response(e),
    }
}

/// Handle /api/v1.0/tobs - the previous year of temperature observations
/// for the station with the highest measurement count.
fn handle_tobs(store: &ClimateStore) -> HttpResponse {
    let observations = store.most_active_station().and_then(|station| {
        store.observations_for_station_since(&station, model::one_year_window_start())
    });

    match observations {
        Ok(observations) => {
            let entries: Vec<ObservationEntry> = observations
                .into_iter()
                .map(|o| ObservationEntry {
                    date: o.date,
                    temperature: o.temperature,
                })
                .collect();
            create_response(200, serde_json::to_value(&entries).unwrap())
        }
        Err(e) => create_error_response(e),
    }
}

/// Handle /api/v1.0/{start} and /api/v1.0/{start}/{end}.
fn handle_temperature_range(store: &ClimateStore, start: &str, end: Option<&str>) -> HttpResponse {
    match store.temperature_stats(start, end) {
        Ok(stats) => {
            let summary = vec![TemperatureSummary::from(stats)];
            create_response(200, serde_json::to_value(&summary).unwrap())
        }
        Err(e) => create_error_response(e),
    }
}

fn handle_not_found() -> HttpResponse {
    create_response(
        404,
        serde_json::json!({
            "error": "Not found",
            "available_endpoints": [
                "/",
                "/health",
                "/api/v1.0/precipitation",
                "/api/v1.0/stations",
                "/api/v1.0/tobs",
                "/api/v1.0/{start}",
                "/api/v1.0/{start}/{end}"
            ]
        }),
    )
}

// ---------------------------------------------------------------------------
// Response construction
// ---------------------------------------------------------------------------

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: serde_json::Value) -> HttpResponse {
    let body = serde_json::to_string_pretty(&json).unwrap();
    let bytes = body.into_bytes();

    tiny_http::Response::from_data(bytes)
        .with_status_code(tiny_http::StatusCode::from(status_code))
        .with_header(
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
        )
}

/// Create HTTP response with HTML body
fn create_html_response(body: &str) -> HttpResponse {
    tiny_http::Response::from_data(body.as_bytes().to_vec()).with_header(
        tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..])
            .unwrap(),
    )
}

/// Query failures have no recovery path anywhere in this service; they
/// surface as a plain 500.
fn create_error_response(error: rusqlite::Error) -> HttpResponse {
    create_response(500, serde_json::json!({ "error": error.to_string() }))
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start the endpoint server on the specified port and serve forever.
pub fn start_endpoint_server(
    port: u16,
    workers: usize,
    store: ClimateStore,
) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    println!("📡 HTTP endpoint listening on http://0.0.0.0:{}", port);
    println!("   GET /api/v1.0/precipitation - Last year of precipitation by date");
    println!("   GET /api/v1.0/stations - Station identifiers");
    println!("   GET /api/v1.0/tobs - Last year of observations, most active station");
    println!("   GET /api/v1.0/{{start}}[/{{end}}] - MIN/AVG/MAX temperature");
    println!("   GET /health - Service health check\n");

    serve(server, workers, store);
    Ok(())
}

/// Serve requests from a fixed pool of accept workers sharing the
/// listener. Each request opens its own store session; nothing else is
/// shared between workers.
pub fn serve(server: tiny_http::Server, workers: usize, store: ClimateStore) {
    let workers = workers.max(1);
    let server = Arc::new(server);
    let pool = ThreadPool::new(workers);

    for _ in 0..workers {
        let server = Arc::clone(&server);
        let store = store.clone();
        pool.execute(move || {
            for request in server.incoming_requests() {
                let response = route(&store, request.url());
                if let Err(e) = request.respond(response) {
                    eprintln!("Failed to send response: {}", e);
                }
            }
        });
    }

    // Accept workers run until the process is interrupted.
    pool.join();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_observation_entry_uses_capitalized_keys() {
        let entry = ObservationEntry {
            date: "2016-08-24".to_string(),
            temperature: 77.0,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["Date"], "2016-08-24");
        assert_eq!(json["Temperature"], 77.0);
    }

    #[test]
    fn test_empty_summary_serializes_nulls() {
        let summary = TemperatureSummary::from(TemperatureStats {
            tmin: None,
            tavg: None,
            tmax: None,
        });

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["TMIN"].is_null());
        assert!(json["TAVG"].is_null());
        assert!(json["TMAX"].is_null());
    }

    #[test]
    fn test_summary_carries_stats_through_unchanged() {
        let summary = TemperatureSummary::from(TemperatureStats {
            tmin: Some(53.0),
            tavg: Some(71.6),
            tmax: Some(87.0),
        });

        assert_eq!(summary.tmin, Some(53.0));
        assert_eq!(summary.tavg, Some(71.6));
        assert_eq!(summary.tmax, Some(87.0));
    }

    #[test]
    fn test_date_segments_single_start() {
        assert_eq!(parse_date_segments("2017-01-01"), Some(("2017-01-01", None)));
    }

    #[test]
    fn test_date_segments_start_and_end() {
        assert_eq!(
            parse_date_segments("2017-01-01/2017-01-31"),
            Some(("2017-01-01", Some("2017-01-31")))
        );
    }

    #[test]
    fn test_date_segments_reject_empty_and_surplus() {
        assert_eq!(parse_date_segments(""), None);
        assert_eq!(parse_date_segments("2017-01-01/"), None);
        assert_eq!(parse_date_segments("/2017-01-31"), None);
        assert_eq!(parse_date_segments("a/b/c"), None);
    }

    #[test]
    fn test_index_lists_every_route() {
        // The HTML listing is the only discoverability surface; all five
        // data routes must appear in it.
        let response = handle_index();
        let mut body = String::new();
        response
            .into_reader()
            .read_to_string(&mut body)
            .expect("index body should be utf-8");

        for fragment in [
            "/api/v1.0/precipitation",
            "/api/v1.0/stations",
            "/api/v1.0/tobs",
            "/api/v1.0/&lt;start&gt;",
            "/api/v1.0/&lt;start&gt;/&lt;end&gt;",
        ] {
            assert!(body.contains(fragment), "index should list {}", fragment);
        }
    }
}
