//! # PagerDuty Events API
//!
//! A Rust client library for sending alert events to the
//! [PagerDuty Events API v2](https://developer.pagerduty.com/docs/events-api-v2/overview/).
//!
//! ## Features
//!
//! - Trigger, acknowledge and resolve alerts via `POST /v2/enqueue`
//! - Builder pattern for constructing trigger events
//! - Client-side validation before anything is sent
//! - Routing key and source read once from the environment, or injected
//! - Async client plus a [`blocking`] variant
//!
//! Rejections by the service are not errors: every completed round trip yields
//! an [`EventResponse`] carrying the HTTP status and the service's reply.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pagerduty_events_api::{EventsClient, Image, Severity, TriggerEvent};
//! use url::Url;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Routing key from ROUTING_KEY, source from the host name
//!     let client = EventsClient::new(
//!         Url::parse("https://events.pagerduty.com")?,
//!         Duration::from_secs(10),
//!     )?;
//!
//!     let event = TriggerEvent::new("Memory usage above 90%")
//!         .with_severity(Severity::Warning)
//!         .with_component("api-server")
//!         .with_group("prod")
//!         .with_custom_detail("used_mb", 7340)
//!         .with_image(Image::new(Url::parse("https://grafana.example.com/mem.png")?));
//!
//!     let response = client.submit(event).await?;
//!     if response.is_success() {
//!         client.resolve(&response.dedup_key).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod blocking;
mod client;
mod config;
mod context;
mod errors;
mod event;
mod pager;
mod types;
mod validation;
mod wire;

pub use client::EventsClient;
pub use config::{ClientConfig, DEFAULT_API_URL, ENV_PREFIX};
pub use context::{CachedValue, EventContext, ROUTING_KEY_ENV};
pub use errors::{EventsError, Result};
pub use event::{CustomDetails, Event, EventPayload, TriggerEvent, TIMESTAMP_FORMAT};
pub use pager::Pager;
pub use types::{EventAction, EventResponse, Image, Link, Severity};
pub use validation::{validate, ValidationError, MAX_DEDUP_KEY_LEN};
