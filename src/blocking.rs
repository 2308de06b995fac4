//! Blocking API.
//!
//! Wraps the async [`EventsClient`](crate::EventsClient) and drives it on a
//! runtime owned by the client, so events can be sent from synchronous code.
//! These types must not be created, used or dropped from within an async
//! runtime.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::context::EventContext;
use crate::errors::{EventsError, Result};
use crate::event::{CustomDetails, Event};
use crate::types::{EventResponse, Severity};

/// Blocking client for the PagerDuty Events API v2
///
/// # Example
///
/// ```rust,no_run
/// use pagerduty_events_api::blocking::EventsClient;
/// use pagerduty_events_api::{Severity, TriggerEvent};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = EventsClient::from_env()?;
///     let response = client.submit(
///         TriggerEvent::new("Backup job failed").with_severity(Severity::Error),
///     )?;
///     println!("{}", response.status_code);
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct EventsClient {
    inner: crate::EventsClient,
    runtime: Arc<Runtime>,
}

impl EventsClient {
    /// Create a client for the given base URL
    pub fn new(api_url: Url, timeout: Duration) -> Result<Self> {
        Self::from_async(crate::EventsClient::new(api_url, timeout)?)
    }

    /// Create a client from explicit configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::from_async(crate::EventsClient::from_config(config)?)
    }

    /// Create a client from `PAGERDUTY_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_async(crate::EventsClient::from_env()?)
    }

    /// Wrap an existing async client
    pub fn from_async(inner: crate::EventsClient) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(EventsError::Runtime)?;

        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    /// Replace the routing key and source providers
    pub fn with_context(mut self, context: EventContext) -> Self {
        self.inner = self.inner.with_context(context);
        self
    }

    /// Validate and send an event, blocking until the reply arrives
    pub fn submit(&self, event: impl Into<Event>) -> Result<EventResponse> {
        self.runtime.block_on(self.inner.submit(event))
    }

    /// Acknowledge the alert identified by `dedup_key`
    pub fn acknowledge(&self, dedup_key: &str) -> Result<EventResponse> {
        self.runtime.block_on(self.inner.acknowledge(dedup_key))
    }

    /// Resolve the alert identified by `dedup_key`
    pub fn resolve(&self, dedup_key: &str) -> Result<EventResponse> {
        self.runtime.block_on(self.inner.resolve(dedup_key))
    }

    /// Get the enqueue endpoint
    pub fn endpoint(&self) -> &Url {
        self.inner.endpoint()
    }
}

/// Blocking counterpart of [`Pager`](crate::Pager)
#[derive(Clone, Debug)]
pub struct Pager {
    inner: crate::Pager,
    runtime: Arc<Runtime>,
}

impl Pager {
    /// Create a pager with nothing staged
    pub fn new(client: EventsClient) -> Self {
        Self {
            inner: crate::Pager::new(client.inner),
            runtime: client.runtime,
        }
    }

    /// Stage a custom detail for every following trigger
    pub fn with_custom_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.inner = self.inner.with_custom_detail(key, value);
        self
    }

    /// Stage several custom details
    pub fn with_custom_details<I>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.inner = self.inner.with_custom_details(details);
        self
    }

    /// Get the staged custom details
    pub fn custom_details(&self) -> &CustomDetails {
        self.inner.custom_details()
    }

    /// Trigger an event with severity `error`
    pub fn trigger(
        &self,
        summary: &str,
        component: &str,
        dedup_key: Option<Uuid>,
    ) -> Result<EventResponse> {
        self.runtime
            .block_on(self.inner.trigger(summary, component, dedup_key))
    }

    pub fn trigger_with_severity(
        &self,
        summary: &str,
        component: &str,
        severity: Severity,
        dedup_key: Option<Uuid>,
    ) -> Result<EventResponse> {
        self.runtime.block_on(
            self.inner
                .trigger_with_severity(summary, component, severity, dedup_key),
        )
    }

    pub fn trigger_with_group(
        &self,
        summary: &str,
        component: &str,
        severity: Severity,
        group: &str,
        class: &str,
        dedup_key: Option<Uuid>,
    ) -> Result<EventResponse> {
        self.runtime.block_on(self.inner.trigger_with_group(
            summary, component, severity, group, class, dedup_key,
        ))
    }
}
