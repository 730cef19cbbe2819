//! Bundled flight data.
//!
//! The JSON files under `data/` are compiled into the binary and share the
//! API's wire shapes, so they decode through the same types.

use crate::classify::{classify, ClassifiedError, Failure};
use crate::flight::{FlightList, Severity, TrafficStatus};

const DEPARTURES_JSON: &str = include_str!("../data/flights-departure.json");
const ARRIVALS_JSON: &str = include_str!("../data/flights-arrival.json");

/// Decode a bundled flight list.
///
/// # Errors
///
/// Returns a classified error if `raw` is not a valid flight list.
pub fn parse_flights(raw: &str, context: &str) -> Result<FlightList, ClassifiedError> {
    serde_json::from_str(raw).map_err(|e| classify(Failure::Parse(e.to_string()), context))
}

/// The bundled departures.
///
/// # Errors
///
/// Returns a [`crate::classify::ErrorKind::JsonLoad`] error if the bundled file is corrupt.
pub fn departures() -> Result<FlightList, ClassifiedError> {
    parse_flights(DEPARTURES_JSON, "get_departure_flights")
}

/// The bundled arrivals.
///
/// # Errors
///
/// Returns a [`crate::classify::ErrorKind::JsonLoad`] error if the bundled file is corrupt.
pub fn arrivals() -> Result<FlightList, ClassifiedError> {
    parse_flights(ARRIVALS_JSON, "get_arrival_flights")
}

/// The static traffic notice served when no API is in use.
#[must_use]
pub fn traffic_status() -> TrafficStatus {
    TrafficStatus {
        message: "Strike in France on 05/08/2025".to_string(),
        severity: Severity::Warning,
        affected_flights: vec!["AF101".to_string(), "AF201".to_string(), "AF301".to_string()],
    }
}
