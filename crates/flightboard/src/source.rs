//! Data-source selection.
//!
//! [`DataService`] answers every query through a [`FlightSource`] chosen from
//! [`Config::data_source`]: [`ApiSource`] talks to the remote API,
//! [`FixtureSource`] serves the bundled data. Callers that would rather show
//! an empty board than an error use the `*_or_empty` variants.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::FlightApi;
use crate::classify::ClassifiedError;
use crate::config::{Config, DataSource};
use crate::error::Result;
use crate::fixtures;
use crate::flight::{FlightList, TrafficStatus};
use crate::response::{Response, Source};
use crate::subscription::{validate_follow_input, Subscription};

/// Result of a single data-source call.
pub type SourceResult<T> = std::result::Result<Response<T>, ClassifiedError>;

/// A backend able to answer the four flight queries.
#[async_trait]
pub trait FlightSource: Send + Sync + std::fmt::Debug {
    /// Which configured source this is.
    fn kind(&self) -> DataSource;

    /// Departing flights.
    async fn departure_flights(&self) -> SourceResult<FlightList>;

    /// Arriving flights.
    async fn arrival_flights(&self) -> SourceResult<FlightList>;

    /// Current traffic notice.
    async fn traffic_status(&self) -> SourceResult<TrafficStatus>;

    /// Subscribe `email` to `flight_number`.
    async fn follow_flight(&self, flight_number: &str, email: &str) -> SourceResult<Subscription>;
}

/// Serves the bundled fixtures after a simulated delay.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    delay: Duration,
}

impl FixtureSource {
    /// Create a fixture source that waits `delay` before each answer.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl FlightSource for FixtureSource {
    fn kind(&self) -> DataSource {
        DataSource::Json
    }

    async fn departure_flights(&self) -> SourceResult<FlightList> {
        self.simulate_latency().await;
        Ok(Response::ok(fixtures::departures()?, Source::Json))
    }

    async fn arrival_flights(&self) -> SourceResult<FlightList> {
        self.simulate_latency().await;
        Ok(Response::ok(fixtures::arrivals()?, Source::Json))
    }

    async fn traffic_status(&self) -> SourceResult<TrafficStatus> {
        self.simulate_latency().await;
        Ok(Response::ok(fixtures::traffic_status(), Source::Json))
    }

    async fn follow_flight(&self, flight_number: &str, email: &str) -> SourceResult<Subscription> {
        validate_follow_input(flight_number, email, "follow_flight")?;
        self.simulate_latency().await;
        Ok(Response::ok(
            Subscription::new(flight_number, email),
            Source::Json,
        ))
    }
}

/// Serves data from the remote API.
#[derive(Debug, Clone)]
pub struct ApiSource {
    api: FlightApi,
}

impl ApiSource {
    /// Wrap an API client.
    #[must_use]
    pub fn new(api: FlightApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl FlightSource for ApiSource {
    fn kind(&self) -> DataSource {
        DataSource::Api
    }

    async fn departure_flights(&self) -> SourceResult<FlightList> {
        self.api.get_departure_flights().await
    }

    async fn arrival_flights(&self) -> SourceResult<FlightList> {
        self.api.get_arrival_flights().await
    }

    async fn traffic_status(&self) -> SourceResult<TrafficStatus> {
        self.api.get_traffic_status().await
    }

    async fn follow_flight(&self, flight_number: &str, email: &str) -> SourceResult<Subscription> {
        self.api.follow_flight(flight_number, email).await
    }
}

/// A degraded answer: placeholder data plus the failure that caused it.
///
/// Serializes as the response envelope with an extra `error` field when set.
#[derive(Debug, Clone, Serialize)]
pub struct Degraded<T> {
    /// Data to show. Status 500 and source `fallback` when `error` is set.
    #[serde(flatten)]
    pub response: Response<T>,
    /// Why the response was degraded, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ClassifiedError>,
}

impl<T> Degraded<T> {
    fn from_result(result: SourceResult<T>, placeholder: impl FnOnce() -> T) -> Self {
        match result {
            Ok(response) => Self {
                response,
                error: None,
            },
            Err(error) => {
                warn!(kind = %error.kind, "Serving fallback data: {}", error.message);
                Self {
                    response: Response::degraded(placeholder()),
                    error: Some(error),
                }
            }
        }
    }
}

/// Front door for flight data.
#[derive(Debug)]
pub struct DataService {
    source: Box<dyn FlightSource>,
    debug: bool,
}

impl DataService {
    /// Build the service for the source selected in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source: Box<dyn FlightSource> = match config.data_source {
            DataSource::Api => Box::new(ApiSource::new(FlightApi::new(config)?)),
            DataSource::Json => Box::new(FixtureSource::new(config.simulated_delay())),
        };
        Ok(Self::with_source(source, config.debug))
    }

    /// Build the service around an explicit source.
    #[must_use]
    pub fn with_source(source: Box<dyn FlightSource>, debug: bool) -> Self {
        Self { source, debug }
    }

    /// The active source.
    #[must_use]
    pub fn data_source(&self) -> DataSource {
        self.source.kind()
    }

    fn announce(&self, what: &str) {
        let backend = match self.source.kind() {
            DataSource::Api => "API",
            DataSource::Json => "JSON",
        };
        if self.debug {
            info!("Using {backend} for {what}");
        } else {
            debug!("Using {backend} for {what}");
        }
    }

    /// Departing flights.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the active source.
    pub async fn departure_flights(&self) -> SourceResult<FlightList> {
        self.announce("departure flights");
        self.source.departure_flights().await
    }

    /// Arriving flights.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the active source.
    pub async fn arrival_flights(&self) -> SourceResult<FlightList> {
        self.announce("arrival flights");
        self.source.arrival_flights().await
    }

    /// Current traffic notice.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the active source.
    pub async fn traffic_status(&self) -> SourceResult<TrafficStatus> {
        self.announce("traffic status");
        self.source.traffic_status().await
    }

    /// Subscribe `email` to `flight_number`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or the classified failure of
    /// the active source.
    pub async fn follow_flight(&self, flight_number: &str, email: &str) -> SourceResult<Subscription> {
        self.announce("flight following");
        self.source.follow_flight(flight_number, email).await
    }

    /// Departing flights, or an empty status-500 list on failure.
    pub async fn departures_or_empty(&self) -> Degraded<FlightList> {
        Degraded::from_result(self.departure_flights().await, FlightList::default)
    }

    /// Arriving flights, or an empty status-500 list on failure.
    pub async fn arrivals_or_empty(&self) -> Degraded<FlightList> {
        Degraded::from_result(self.arrival_flights().await, FlightList::default)
    }

    /// The traffic notice, or `None` on failure.
    pub async fn traffic_or_none(&self) -> Option<TrafficStatus> {
        match self.traffic_status().await {
            Ok(response) => Some(response.data),
            Err(err) => {
                warn!(kind = %err.kind, "Traffic status unavailable: {}", err.message);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, ErrorKind, Failure};
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `announce` under an INFO-level subscriber and return what it logged.
    fn announced_at_info(debug: bool) -> String {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(Level::INFO)
            .with_ansi(false)
            .finish();
        let service =
            DataService::with_source(Box::new(FixtureSource::new(Duration::ZERO)), debug);

        tracing::subscriber::with_default(subscriber, || service.announce("departure flights"));
        logs.contents()
    }

    fn fixture_service() -> DataService {
        DataService::with_source(Box::new(FixtureSource::new(Duration::ZERO)), false)
    }

    #[tokio::test]
    async fn test_fixture_departures() {
        let resp = fixture_service().departure_flights().await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.source, Source::Json);
        assert_eq!(resp.data, fixtures::departures().unwrap());
    }

    #[tokio::test]
    async fn test_fixture_arrivals() {
        let resp = fixture_service().arrival_flights().await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.data, fixtures::arrivals().unwrap());
    }

    #[tokio::test]
    async fn test_fixture_traffic() {
        let resp = fixture_service().traffic_status().await.unwrap();
        assert_eq!(resp.data.message, "Strike in France on 05/08/2025");
        assert_eq!(resp.data.affected_flights, ["AF101", "AF201", "AF301"]);
    }

    #[tokio::test]
    async fn test_fixture_follow() {
        let resp = fixture_service()
            .follow_flight("AF101", "jo@example.com")
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.data.email, "jo@example.com");
        assert!(resp.data.is_active());
    }

    #[tokio::test]
    async fn test_fixture_follow_validates_input() {
        let err = fixture_service()
            .follow_flight("AF101", "jo@")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_fixture_degraded_variants_pass_through() {
        let service = fixture_service();
        let degraded = service.departures_or_empty().await;
        assert!(degraded.error.is_none());
        assert_eq!(degraded.response.status, 200);
        assert!(service.traffic_or_none().await.is_some());
    }

    #[test]
    fn test_from_config_selects_source() {
        let mut config = Config::default();
        assert_eq!(
            DataService::from_config(&config).unwrap().data_source(),
            DataSource::Json
        );

        config.data_source = DataSource::Api;
        assert_eq!(
            DataService::from_config(&config).unwrap().data_source(),
            DataSource::Api
        );
    }

    #[test]
    fn test_debug_flag_announces_source_at_info() {
        assert!(announced_at_info(true).contains("Using JSON for departure flights"));
        assert!(!announced_at_info(false).contains("Using JSON"));
    }

    #[test]
    fn test_degraded_json_carries_error() {
        let error = classify(Failure::Request("connection refused".into()), "get_departure_flights");
        let degraded = Degraded::from_result(Err(error), FlightList::default);

        let value = serde_json::to_value(&degraded).unwrap();
        assert_eq!(value["status"], 500);
        assert_eq!(value["source"], "fallback");
        assert_eq!(value["data"]["flights"], serde_json::json!([]));
        assert_eq!(value["error"]["type"], "NETWORK_ERROR");
        assert_eq!(value["error"]["context"], "get_departure_flights");
    }

    #[tokio::test]
    async fn test_degraded_json_omits_error_on_success() {
        let degraded = fixture_service().arrivals_or_empty().await;
        let value = serde_json::to_value(&degraded).unwrap();
        assert_eq!(value["status"], 200);
        assert!(value.get("error").is_none());
    }
}
