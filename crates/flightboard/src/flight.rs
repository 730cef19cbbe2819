//! Flight and traffic-status records.
//!
//! These mirror the JSON served by the flight API and shipped in the bundled
//! fixtures. Decoding is lenient (unknown fields are ignored, missing required
//! fields decode as empty strings, and [`FlightList::decode_rows`] skips rows
//! that don't decode at all); [`validate_flight`] is the strict check.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One scheduled departure or arrival.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    /// Flight number, e.g. `AF101`.
    #[serde(default, alias = "flightNumber")]
    pub flight_number: String,

    /// Operating airline.
    #[serde(default)]
    pub company: String,

    /// Free-text status ("On time", "Delayed", ...).
    #[serde(default)]
    pub status: String,

    /// Destination city (departures).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Origin city (arrivals).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Scheduled time as published.
    #[serde(
        default,
        alias = "scheduledTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_time: Option<String>,

    /// Revised time, when it differs from the schedule.
    #[serde(
        default,
        alias = "estimatedTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_time: Option<String>,

    /// Boarding gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,

    /// Terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
}

impl Flight {
    /// Create a flight with the three required fields set.
    #[must_use]
    pub fn new(
        flight_number: impl Into<String>,
        company: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            flight_number: flight_number.into(),
            company: company.into(),
            status: status.into(),
            ..Self::default()
        }
    }

    /// The other airport: destination for departures, origin for arrivals.
    #[must_use]
    pub fn other_airport(&self) -> Option<&str> {
        self.destination.as_deref().or(self.origin.as_deref())
    }

    /// Best known time: the estimate if present, else the schedule.
    #[must_use]
    pub fn display_time(&self) -> Option<&str> {
        self.estimated_time
            .as_deref()
            .or(self.scheduled_time.as_deref())
    }
}

/// A flight missing one or more required fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation error: {}", .missing.join(", "))]
pub struct FlightValidationError {
    /// One entry per missing field, in field order.
    pub missing: Vec<&'static str>,
}

/// Check that a flight carries a number, a company and a status.
///
/// All missing fields are reported together.
///
/// # Errors
///
/// Returns a [`FlightValidationError`] listing every missing field.
pub fn validate_flight(flight: &Flight) -> Result<(), FlightValidationError> {
    let mut missing = Vec::new();
    if flight.flight_number.trim().is_empty() {
        missing.push("Missing flight number");
    }
    if flight.company.trim().is_empty() {
        missing.push("Missing company");
    }
    if flight.status.trim().is_empty() {
        missing.push("Missing status");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FlightValidationError { missing })
    }
}

/// A flight-list row that could not be decoded.
#[derive(Debug, Error)]
#[error("row {index}: {source}")]
pub struct SkippedRow {
    /// Position of the row in the payload.
    pub index: usize,
    /// Why it failed to decode.
    #[source]
    pub source: serde_json::Error,
}

/// Message for a flight payload of the wrong shape.
pub const INVALID_FLIGHTS_MESSAGE: &str = "Invalid data format received from API";

/// Message for a traffic payload of the wrong shape.
pub const INVALID_TRAFFIC_MESSAGE: &str = "Invalid traffic status data format";

/// A list of flights.
///
/// Decodes from either `{"flights": [...]}` or a bare array; always encodes as
/// the wrapped form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FlightListRepr")]
pub struct FlightList {
    /// The flights, in published order.
    pub flights: Vec<Flight>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlightListRepr {
    Wrapped { flights: Vec<Flight> },
    Bare(Vec<Flight>),
}

impl From<FlightListRepr> for FlightList {
    fn from(repr: FlightListRepr) -> Self {
        match repr {
            FlightListRepr::Wrapped { flights } | FlightListRepr::Bare(flights) => {
                Self { flights }
            }
        }
    }
}

impl From<Vec<Flight>> for FlightList {
    fn from(flights: Vec<Flight>) -> Self {
        Self { flights }
    }
}

impl FlightList {
    /// Decode a flight-list payload one row at a time.
    ///
    /// Rows that don't decode as a [`Flight`] are left out and returned with
    /// the reason. Returns `None` when `value` is not a flight list at all.
    #[must_use]
    pub fn decode_rows(value: Value) -> Option<(Self, Vec<SkippedRow>)> {
        let rows = match value {
            Value::Array(rows) => rows,
            Value::Object(mut map) => match map.remove("flights") {
                Some(Value::Array(rows)) => rows,
                _ => return None,
            },
            _ => return None,
        };

        let mut flights = Vec::with_capacity(rows.len());
        let mut skipped = Vec::new();
        for (index, row) in rows.into_iter().enumerate() {
            match serde_json::from_value(row) {
                Ok(flight) => flights.push(flight),
                Err(source) => skipped.push(SkippedRow { index, source }),
            }
        }
        Some((Self { flights }, skipped))
    }

    /// Number of flights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Iterate over the flights.
    pub fn iter(&self) -> std::slice::Iter<'_, Flight> {
        self.flights.iter()
    }

    /// Find a flight by number, ignoring ASCII case.
    #[must_use]
    pub fn find(&self, flight_number: &str) -> Option<&Flight> {
        self.flights
            .iter()
            .find(|f| f.flight_number.eq_ignore_ascii_case(flight_number))
    }

    /// Drop flights that fail [`validate_flight`], returning why each was dropped.
    pub fn retain_valid(&mut self) -> Vec<FlightValidationError> {
        let mut rejected = Vec::new();
        self.flights.retain(|flight| match validate_flight(flight) {
            Ok(()) => true,
            Err(err) => {
                rejected.push(err);
                false
            }
        });
        rejected
    }
}

impl<'a> IntoIterator for &'a FlightList {
    type Item = &'a Flight;
    type IntoIter = std::slice::Iter<'a, Flight>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// How serious a traffic notice is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    /// Informational.
    #[default]
    Info,
    /// Disruption expected.
    Warning,
    /// Severe disruption.
    Critical,
    /// A level this client does not know; kept verbatim.
    Other(String),
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "info" => Self::Info,
            "warning" => Self::Warning,
            "critical" => Self::Critical,
            _ => Self::Other(value),
        }
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A traffic-status notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficStatus {
    /// Human-readable notice.
    #[serde(default)]
    pub message: String,

    /// Notice severity.
    #[serde(default)]
    pub severity: Severity,

    /// Flight numbers affected by the notice.
    #[serde(default)]
    pub affected_flights: Vec<String>,
}

impl TrafficStatus {
    /// Whether a decoded JSON value has an accepted traffic-status shape.
    #[must_use]
    pub fn is_valid_shape(value: &Value) -> bool {
        value
            .get("message")
            .and_then(Value::as_str)
            .is_some_and(|m| !m.is_empty())
    }

    /// Whether the notice names the given flight, ignoring ASCII case.
    #[must_use]
    pub fn affects(&self, flight_number: &str) -> bool {
        self.affected_flights
            .iter()
            .any(|f| f.eq_ignore_ascii_case(flight_number))
    }
}
