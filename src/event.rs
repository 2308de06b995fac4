use chrono::{DateTime, Utc};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::types::{EventAction, Image, Link, Severity};

/// Free-form details attached to a trigger event, serialized sorted by key
pub type CustomDetails = BTreeMap<String, Value>;

/// Wire format of payload timestamps (ISO-8601, seconds precision, no offset)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
enum Timestamp {
    /// Instant the payload was created, rendered on read
    Created(DateTime<Utc>),
    /// Caller supplied value; replaces the creation instant for good
    Explicit(Option<String>),
}

/// Trigger-specific event details
///
/// The `source` field is not part of this type: it is always the host name
/// supplied by the [`EventContext`](crate::EventContext) at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPayload {
    summary: String,
    timestamp: Timestamp,
    severity: Option<Severity>,
    component: Option<String>,
    group: Option<String>,
    class: Option<String>,
    custom_details: CustomDetails,
}

impl EventPayload {
    fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            timestamp: Timestamp::Created(Utc::now()),
            severity: None,
            component: None,
            group: None,
            class: None,
            custom_details: CustomDetails::new(),
        }
    }

    /// Get the summary
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Event timestamp
    ///
    /// Defaults to the creation instant of the payload until a value is set
    /// explicitly. Explicit values are returned as given and only checked on
    /// submission.
    pub fn timestamp(&self) -> Option<Cow<'_, str>> {
        match &self.timestamp {
            Timestamp::Created(at) => Some(Cow::Owned(at.format(TIMESTAMP_FORMAT).to_string())),
            Timestamp::Explicit(value) => value.as_deref().map(Cow::Borrowed),
        }
    }

    /// Get the severity, if set
    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }

    /// Get the component
    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    /// Get the group
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Get the class
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Get the custom details, sorted by key
    pub fn custom_details(&self) -> &CustomDetails {
        &self.custom_details
    }
}

/// A trigger event, opening (or adding to) an alert
///
/// # Example
///
/// ```rust
/// use pagerduty_events_api::{Severity, TriggerEvent};
///
/// let event = TriggerEvent::new("Disk usage above 95%")
///     .with_severity(Severity::Critical)
///     .with_component("db1")
///     .with_group("storage")
///     .with_custom_detail("free_bytes", 1024);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEvent {
    dedup_key: Option<String>,
    payload: EventPayload,
    images: Vec<Image>,
    links: Vec<Link>,
}

impl TriggerEvent {
    /// Create a trigger event with the given summary
    ///
    /// Severity is left unset and must be provided before submission.
    pub fn new(summary: &str) -> Self {
        Self {
            dedup_key: None,
            payload: EventPayload::new(summary),
            images: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Replace the summary
    pub fn with_summary(mut self, summary: &str) -> Self {
        self.payload.summary = summary.to_string();
        self
    }

    /// Set an explicit timestamp string
    ///
    /// The value is validated on submission, not here.
    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.payload.timestamp = Timestamp::Explicit(Some(timestamp.to_string()));
        self
    }

    /// Set the timestamp from an instant
    pub fn with_occurred_at(self, at: DateTime<Utc>) -> Self {
        let rendered = at.format(TIMESTAMP_FORMAT).to_string();
        self.with_timestamp(&rendered)
    }

    /// Drop the timestamp, including the creation-time default
    pub fn clear_timestamp(mut self) -> Self {
        self.payload.timestamp = Timestamp::Explicit(None);
        self
    }

    /// Set the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.payload.severity = Some(severity);
        self
    }

    /// Component of the source machine responsible for the event
    pub fn with_component(mut self, component: &str) -> Self {
        self.payload.component = Some(component.to_string());
        self
    }

    /// Logical grouping of components
    pub fn with_group(mut self, group: &str) -> Self {
        self.payload.group = Some(group.to_string());
        self
    }

    /// Class/type of the event
    pub fn with_class(mut self, class: &str) -> Self {
        self.payload.class = Some(class.to_string());
        self
    }

    /// Merge custom details, last write wins per key
    pub fn with_custom_details<I>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.payload.custom_details.extend(details);
        self
    }

    /// Set a single custom detail
    pub fn with_custom_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload
            .custom_details
            .insert(key.to_string(), value.into());
        self
    }

    /// Append an image
    pub fn with_image(mut self, image: Image) -> Self {
        self.images.push(image);
        self
    }

    /// Append a link
    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Correlate with an existing alert using a caller chosen key
    pub fn with_dedup_key(mut self, dedup_key: &str) -> Self {
        self.dedup_key = Some(dedup_key.to_string());
        self
    }

    /// Correlate using a UUID; `None` lets the service start a new alert
    pub fn with_dedup_uuid(mut self, dedup_key: Option<Uuid>) -> Self {
        self.dedup_key = dedup_key.map(|key| key.to_string());
        self
    }

    /// Get the dedup key
    pub fn dedup_key(&self) -> Option<&str> {
        self.dedup_key.as_deref()
    }

    /// Get the trigger payload
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// Get the attached images
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Get the attached links
    pub fn links(&self) -> &[Link] {
        &self.links
    }
}

/// An event accepted by the Events API
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Trigger(TriggerEvent),
    Acknowledge { dedup_key: String },
    Resolve { dedup_key: String },
}

impl Event {
    /// Acknowledge the alert identified by `dedup_key`
    pub fn acknowledge(dedup_key: &str) -> Self {
        Event::Acknowledge {
            dedup_key: dedup_key.to_string(),
        }
    }

    /// Resolve the alert identified by `dedup_key`
    pub fn resolve(dedup_key: &str) -> Self {
        Event::Resolve {
            dedup_key: dedup_key.to_string(),
        }
    }

    /// Get the `event_action` of this event
    pub fn action(&self) -> EventAction {
        match self {
            Event::Trigger(_) => EventAction::Trigger,
            Event::Acknowledge { .. } => EventAction::Acknowledge,
            Event::Resolve { .. } => EventAction::Resolve,
        }
    }

    /// Get the dedup key, if any
    pub fn dedup_key(&self) -> Option<&str> {
        match self {
            Event::Trigger(trigger) => trigger.dedup_key(),
            Event::Acknowledge { dedup_key } | Event::Resolve { dedup_key } => Some(dedup_key),
        }
    }
}

impl From<TriggerEvent> for Event {
    fn from(event: TriggerEvent) -> Self {
        Event::Trigger(event)
    }
}
