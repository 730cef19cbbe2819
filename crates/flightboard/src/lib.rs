//! `flightboard` - Airport flight-information client
//!
//! This library fetches departure and arrival boards and traffic notices from
//! a remote flight API or from bundled data, classifies every failure into a
//! small fixed set of kinds, and lets a user follow a flight by email.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod board;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod flight;
pub mod logging;
pub mod response;
pub mod source;
pub mod subscription;

pub use api::FlightApi;
pub use classify::{classify, ClassifiedError, ErrorKind, Failure};
pub use config::{Config, DataSource};
pub use error::{Error, Result};
pub use flight::{validate_flight, Flight, FlightList, Severity, TrafficStatus};
pub use logging::init_logging;
pub use response::{Response, Source};
pub use source::{DataService, FlightSource};
pub use subscription::Subscription;
