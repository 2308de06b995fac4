use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use url::Url;

/// Trigger event severity levels
///
/// Describes the perceived impact of the event on the affected system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// The kind of event being sent (`event_action` on the wire)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Trigger,
    Acknowledge,
    Resolve,
}

impl Display for EventAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Trigger => write!(f, "trigger"),
            EventAction::Acknowledge => write!(f, "acknowledge"),
            EventAction::Resolve => write!(f, "resolve"),
        }
    }
}

/// An image attached to the incident
///
/// The image source must be served over HTTPS.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Image {
    /// Source URL of the image
    #[serde(rename = "src")]
    pub source_url: Url,

    /// Optional URL that makes the image a clickable link
    #[serde(rename = "href", skip_serializing_if = "Option::is_none")]
    pub hypertext_reference: Option<Url>,

    /// Optional alternative text for the image
    #[serde(rename = "alt", skip_serializing_if = "Option::is_none")]
    pub alternative_text: Option<String>,
}

impl Image {
    /// Create an image from its source URL
    pub fn new(source_url: Url) -> Self {
        Self {
            source_url,
            hypertext_reference: None,
            alternative_text: None,
        }
    }

    /// Make the image a clickable link
    pub fn with_href(mut self, href: Url) -> Self {
        self.hypertext_reference = Some(href);
        self
    }

    /// Set the alternative text
    pub fn with_alt(mut self, alt: &str) -> Self {
        self.alternative_text = Some(alt.to_string());
        self
    }
}

/// A text link attached to the incident
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    /// URL of the link
    #[serde(rename = "href")]
    pub hypertext_reference: Url,

    /// Plain text describing the link, used as its label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Link {
    /// Create a link without a label
    pub fn new(href: Url) -> Self {
        Self {
            hypertext_reference: href,
            text: None,
        }
    }

    /// Set the link label
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }
}

/// Reply from the Events API
///
/// Application-level failures (invalid event, throttling, ...) are reported here
/// rather than as an error: inspect `status_code`, `status` and `errors`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct EventResponse {
    /// Remote status, e.g. `success` or `invalid event`
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,

    /// HTTP status code of the transport response (not part of the body)
    #[serde(skip)]
    pub status_code: u16,

    /// Human readable message from the service
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,

    /// Dedup key the service assigned or echoed back
    #[serde(default, deserialize_with = "null_as_default")]
    pub dedup_key: String,

    /// Problems reported by the service
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl EventResponse {
    /// Attach the transport status code
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    /// `true` when the transport status is 2xx and the service reported `success`
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code) && self.status == "success"
    }
}
