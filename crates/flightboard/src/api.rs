//! Client for the remote flight API.
//!
//! Each call is bounded by the configured timeout: when it elapses the pending
//! request future is dropped, which aborts the connection, and the call fails
//! with a [`Failure::Timeout`]. Failures are classified and returned; this
//! client never substitutes data of its own.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::classify::{classify, ClassifiedError, Failure};
use crate::config::{ApiConfig, Config};
use crate::error::{Error, Result};
use crate::flight::{FlightList, TrafficStatus, INVALID_FLIGHTS_MESSAGE, INVALID_TRAFFIC_MESSAGE};
use crate::response::{Response, Source};
use crate::subscription::{validate_follow_input, FollowRequest, Subscription};

/// HTTP client for the flight API endpoints.
#[derive(Debug, Clone)]
pub struct FlightApi {
    client: reqwest::Client,
    endpoints: ApiConfig,
    timeout: Duration,
    follow_delay: Duration,
}

impl FlightApi {
    /// Create a client for the endpoints in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("flightboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::HttpClient)?;

        Ok(Self {
            client,
            endpoints: config.api.clone(),
            timeout: config.timeout(),
            follow_delay: config.follow_delay(),
        })
    }

    /// The per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch departing flights.
    ///
    /// # Errors
    ///
    /// Returns a classified error on HTTP, network, parse, or shape failure.
    pub async fn get_departure_flights(
        &self,
    ) -> std::result::Result<Response<FlightList>, ClassifiedError> {
        self.get_flights(&self.endpoints.departures, "get_departure_flights")
            .await
    }

    /// Fetch arriving flights.
    ///
    /// # Errors
    ///
    /// Returns a classified error on HTTP, network, parse, or shape failure.
    pub async fn get_arrival_flights(
        &self,
    ) -> std::result::Result<Response<FlightList>, ClassifiedError> {
        self.get_flights(&self.endpoints.arrivals, "get_arrival_flights")
            .await
    }

    /// Fetch the current traffic notice.
    ///
    /// # Errors
    ///
    /// Returns a classified error on HTTP, network, parse, or shape failure,
    /// including a payload without a `message`.
    pub async fn get_traffic_status(
        &self,
    ) -> std::result::Result<Response<TrafficStatus>, ClassifiedError> {
        const CONTEXT: &str = "get_traffic_status";
        info!("Fetching traffic status from API...");

        self.fetch_traffic()
            .await
            .map(|status| Response::ok(status, Source::Api))
            .map_err(|failure| classify(failure, CONTEXT))
    }

    /// Subscribe `email` to updates for `flight_number`.
    ///
    /// Input is validated before any request is made. Without a follow
    /// endpoint the call is simulated locally after the configured delay.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::classify::ErrorKind::Validation`] error for bad input,
    /// or a classified error if the follow endpoint fails.
    pub async fn follow_flight(
        &self,
        flight_number: &str,
        email: &str,
    ) -> std::result::Result<Response<Subscription>, ClassifiedError> {
        const CONTEXT: &str = "follow_flight";
        validate_follow_input(flight_number, email, CONTEXT)?;

        let subscription = match &self.endpoints.follow {
            Some(url) => self
                .post_follow(url, flight_number, email)
                .await
                .map_err(|failure| classify(failure, CONTEXT))?,
            None => {
                debug!("No follow endpoint configured, simulating subscription");
                tokio::time::sleep(self.follow_delay).await;
                Subscription::new(flight_number, email)
            }
        };

        info!(
            subscription_id = %subscription.subscription_id,
            "Flight {} is now being followed by {}",
            subscription.flight_number,
            subscription.email
        );
        Ok(Response::ok(subscription, Source::Api))
    }

    async fn get_flights(
        &self,
        url: &str,
        context: &str,
    ) -> std::result::Result<Response<FlightList>, ClassifiedError> {
        info!(url, "Fetching {context} from API...");

        self.fetch_flights(url)
            .await
            .map(|flights| Response::ok(flights, Source::Api))
            .map_err(|failure| classify(failure, context))
    }

    async fn fetch_flights(&self, url: &str) -> std::result::Result<FlightList, Failure> {
        let value = self.fetch_json(self.client.get(url)).await?;
        let (flights, skipped) = FlightList::decode_rows(value)
            .ok_or_else(|| Failure::Invalid(INVALID_FLIGHTS_MESSAGE.to_string()))?;
        for skip in &skipped {
            warn!("Skipping undecodable flight: {skip}");
        }
        debug!(
            count = flights.len(),
            skipped = skipped.len(),
            "Received flights"
        );
        Ok(flights)
    }

    async fn fetch_traffic(&self) -> std::result::Result<TrafficStatus, Failure> {
        let value = self
            .fetch_json(self.client.get(&self.endpoints.traffic_status))
            .await?;
        if !TrafficStatus::is_valid_shape(&value) {
            return Err(Failure::Invalid(INVALID_TRAFFIC_MESSAGE.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn post_follow(
        &self,
        url: &str,
        flight_number: &str,
        email: &str,
    ) -> std::result::Result<Subscription, Failure> {
        let request = self.client.post(url).json(&FollowRequest {
            flight_number,
            email,
        });
        let value = self.fetch_json(request).await?;
        let mut subscription: Subscription = serde_json::from_value(value)?;
        if subscription.flight_number.is_empty() {
            subscription.flight_number = flight_number.to_string();
        }
        if subscription.email.is_empty() {
            subscription.email = email.to_string();
        }
        Ok(subscription)
    }

    /// Send `request`, enforce the timeout, and decode a 2xx body as JSON.
    async fn fetch_json(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<Value, Failure> {
        let exchange = async move {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| Failure::Timeout)??;

        if !status.is_success() {
            return Err(Failure::Response {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Failure::Parse(e.to_string()))
    }
}
