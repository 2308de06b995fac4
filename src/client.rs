use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use std::time::Duration;
use tracing::{debug, field, instrument, warn, Span};
use url::Url;

use crate::config::ClientConfig;
use crate::context::EventContext;
use crate::errors::{EventsError, Result};
use crate::event::Event;
use crate::types::EventResponse;
use crate::validation::validate;
use crate::wire::EnqueueRequest;

const ENQUEUE_PATH: &str = "/v2/enqueue";

/// Client for the PagerDuty Events API v2
///
/// # Example
///
/// ```rust,no_run
/// use pagerduty_events_api::{EventsClient, Severity, TriggerEvent};
/// use url::Url;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = EventsClient::new(
///         Url::parse("https://events.pagerduty.com")?,
///         Duration::from_secs(10),
///     )?;
///
///     let event = TriggerEvent::new("Disk full on db1")
///         .with_severity(Severity::Critical)
///         .with_component("db1");
///
///     let response = client.submit(event).await?;
///     println!("{} {}", response.status_code, response.dedup_key);
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct EventsClient {
    client: ClientWithMiddleware,
    endpoint: Url,
    context: EventContext,
}

impl EventsClient {
    /// Create a new Events API client
    ///
    /// # Arguments
    ///
    /// * `api_url` - Base URL of the Events API (e.g., `https://events.pagerduty.com`)
    /// * `timeout` - Request timeout duration
    ///
    /// Routing key and source come from [`EventContext::process`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the URL cannot
    /// be joined with the enqueue path.
    pub fn new(api_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .http1_only()
            .build()
            .map_err(EventsError::BuildHttpClient)?;

        let client = ClientBuilder::new(client).build();

        Self::with_client(client, api_url)
    }

    /// Create a client from a [`ClientConfig`]
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.api_url()?, config.timeout())
    }

    /// Create a client configured from `PAGERDUTY_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ClientConfig::from_env()?)
    }

    /// Create a new client with a custom reqwest middleware client
    ///
    /// This allows you to add custom middleware (logging, tracing, etc.)
    pub fn with_client(client: ClientWithMiddleware, api_url: Url) -> Result<Self> {
        let endpoint = api_url.join(ENQUEUE_PATH)?;

        Ok(Self {
            client,
            endpoint,
            context: EventContext::process(),
        })
    }

    /// Replace the routing key and source providers
    pub fn with_context(mut self, context: EventContext) -> Self {
        self.context = context;
        self
    }

    /// Validate and send an event
    ///
    /// A response is returned for every completed round trip, whatever its
    /// HTTP status: the service reports rejected events in the body.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The event fails validation (nothing is sent)
    /// - The HTTP request fails
    /// - The response body is not a valid Events API reply
    #[instrument(
        name = "EventsClient::submit",
        skip_all,
        fields(action = field::Empty, status = field::Empty)
    )]
    pub async fn submit(&self, event: impl Into<Event>) -> Result<EventResponse> {
        let event = event.into();
        Span::current().record("action", field::display(event.action()));

        validate(&event, &self.context)?;

        let routing_key = self.context.routing_key().unwrap_or_default();
        let source = self.context.source().unwrap_or_default();
        let body = serde_json::to_vec(&EnqueueRequest::new(&event, routing_key, source))
            .map_err(EventsError::Serialize)?;

        debug!(url = %self.endpoint, bytes = body.len(), "Sending event");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(EventsError::Request)?;

        let status = response.status();
        Span::current().record("status", u64::from(status.as_u16()));

        let text = response
            .text()
            .await
            .map_err(|err| EventsError::Request(err.into()))?;

        let parsed: EventResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(source) => {
                return Err(EventsError::Deserialize {
                    status: status.as_u16(),
                    body: text,
                    source,
                })
            }
        };
        let response = parsed.with_status_code(status.as_u16());

        if status.is_success() && response.errors.is_empty() {
            debug!(dedup_key = %response.dedup_key, "Event accepted");
        } else {
            warn!(
                remote_status = %response.status,
                message = %response.message,
                errors = ?response.errors,
                "Events API reported a problem"
            );
        }

        Ok(response)
    }

    /// Acknowledge the alert identified by `dedup_key`
    pub async fn acknowledge(&self, dedup_key: &str) -> Result<EventResponse> {
        self.submit(Event::acknowledge(dedup_key)).await
    }

    /// Resolve the alert identified by `dedup_key`
    pub async fn resolve(&self, dedup_key: &str) -> Result<EventResponse> {
        self.submit(Event::resolve(dedup_key)).await
    }

    /// Get the enqueue endpoint URL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Get the routing key and source providers
    pub fn context(&self) -> &EventContext {
        &self.context
    }
}
