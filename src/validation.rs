use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::context::EventContext;
use crate::event::{Event, TriggerEvent};
use crate::types::EventAction;

/// Longest dedup key accepted by the Events API, in characters
pub const MAX_DEDUP_KEY_LEN: usize = 255;

const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// An event violates a rule checked before it is sent
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'routing_key' must be defined")]
    MissingRoutingKey,

    #[error("'dedup_key' must be defined for {action} events")]
    MissingDedupKey { action: EventAction },

    #[error("the length of 'dedup_key' cannot be greater than 255 (got {length})")]
    DedupKeyTooLong { length: usize },

    #[error("'summary' must be defined")]
    MissingSummary,

    #[error("'source' must be defined")]
    MissingSource,

    #[error("'severity' must be defined")]
    MissingSeverity,

    #[error("'timestamp' is not a valid date-time: {value}")]
    InvalidTimestamp { value: String },

    #[error("image source must be served over https: {url}")]
    InsecureImage { url: String },
}

impl ValidationError {
    /// Wire name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingRoutingKey => "routing_key",
            Self::MissingDedupKey { .. } | Self::DedupKeyTooLong { .. } => "dedup_key",
            Self::MissingSummary => "summary",
            Self::MissingSource => "source",
            Self::MissingSeverity => "severity",
            Self::InvalidTimestamp { .. } => "timestamp",
            Self::InsecureImage { .. } => "images",
        }
    }
}

/// Check an event before submission
///
/// Stops at the first violated rule. Trigger events are checked for routing
/// key, dedup key length, summary, source, severity, timestamp and image
/// scheme, in that order. Acknowledge and resolve events need a routing key
/// and a dedup key of acceptable length.
pub fn validate(event: &Event, context: &EventContext) -> Result<(), ValidationError> {
    match event {
        Event::Trigger(trigger) => validate_trigger(trigger, context),
        Event::Acknowledge { dedup_key } | Event::Resolve { dedup_key } => {
            require_routing_key(context)?;
            if dedup_key.trim().is_empty() {
                return Err(ValidationError::MissingDedupKey {
                    action: event.action(),
                });
            }
            check_dedup_key_length(dedup_key)
        }
    }
}

fn validate_trigger(event: &TriggerEvent, context: &EventContext) -> Result<(), ValidationError> {
    require_routing_key(context)?;

    if let Some(dedup_key) = event.dedup_key() {
        check_dedup_key_length(dedup_key)?;
    }

    let payload = event.payload();
    if payload.summary().is_empty() {
        return Err(ValidationError::MissingSummary);
    }
    if context.source().is_none() {
        return Err(ValidationError::MissingSource);
    }
    if payload.severity().is_none() {
        return Err(ValidationError::MissingSeverity);
    }
    if let Some(timestamp) = payload.timestamp() {
        if !is_date_time(&timestamp) {
            return Err(ValidationError::InvalidTimestamp {
                value: timestamp.into_owned(),
            });
        }
    }

    if let Some(image) = event
        .images()
        .iter()
        .find(|image| image.source_url.scheme() != "https")
    {
        return Err(ValidationError::InsecureImage {
            url: image.source_url.to_string(),
        });
    }

    Ok(())
}

fn require_routing_key(context: &EventContext) -> Result<(), ValidationError> {
    match context.routing_key() {
        Some(key) if !key.is_empty() => Ok(()),
        _ => Err(ValidationError::MissingRoutingKey),
    }
}

fn check_dedup_key_length(dedup_key: &str) -> Result<(), ValidationError> {
    let length = dedup_key.chars().count();
    if length > MAX_DEDUP_KEY_LEN {
        return Err(ValidationError::DedupKeyTooLong { length });
    }
    Ok(())
}

/// Accepts RFC 3339, RFC 2822, offset-less date-times and plain dates
fn is_date_time(value: &str) -> bool {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value).is_ok()
        || DateTime::parse_from_rfc2822(value).is_ok()
        || NAIVE_DATE_TIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
