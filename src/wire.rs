//! JSON body of `POST /v2/enqueue`, borrowed from an [`Event`].

use serde::Serialize;
use std::borrow::Cow;

use crate::event::{CustomDetails, Event, TriggerEvent};
use crate::types::{EventAction, Image, Link, Severity};

#[derive(Debug, Serialize)]
pub(crate) struct EnqueueRequest<'a> {
    routing_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dedup_key: Option<&'a str>,
    event_action: EventAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Payload<'a>>,
    #[serde(skip_serializing_if = "is_empty")]
    images: &'a [Image],
    #[serde(skip_serializing_if = "is_empty")]
    links: &'a [Link],
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    summary: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<Cow<'a, str>>,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    class: Option<&'a str>,
    #[serde(skip_serializing_if = "no_details")]
    custom_details: &'a CustomDetails,
}

impl<'a> EnqueueRequest<'a> {
    pub(crate) fn new(event: &'a Event, routing_key: &'a str, source: &'a str) -> Self {
        let (payload, images, links): (_, &[Image], &[Link]) = match event {
            Event::Trigger(trigger) => (
                Some(Payload::new(trigger, source)),
                trigger.images(),
                trigger.links(),
            ),
            Event::Acknowledge { .. } | Event::Resolve { .. } => (None, &[], &[]),
        };

        Self {
            routing_key,
            dedup_key: event.dedup_key(),
            event_action: event.action(),
            payload,
            images,
            links,
        }
    }
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

fn no_details(details: &&CustomDetails) -> bool {
    details.is_empty()
}

impl<'a> Payload<'a> {
    fn new(event: &'a TriggerEvent, source: &'a str) -> Self {
        let payload = event.payload();
        Self {
            summary: payload.summary(),
            timestamp: payload.timestamp(),
            source,
            severity: payload.severity(),
            component: payload.component(),
            group: payload.group(),
            class: payload.class(),
            custom_details: payload.custom_details(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use url::Url;

    #[test]
    fn test_trigger_body() {
        let event: Event = TriggerEvent::new("disk full")
            .with_severity(Severity::Critical)
            .with_component("db1")
            .with_timestamp("2024-01-02T03:04:05")
            .with_custom_detail("zeta", true)
            .with_custom_detail("alpha", json!({ "nested": [1, 2] }))
            .with_dedup_key("abc123")
            .into();

        let body = serde_json::to_value(EnqueueRequest::new(&event, "rk", "host-a")).unwrap();
        assert_eq!(
            body,
            json!({
                "routing_key": "rk",
                "dedup_key": "abc123",
                "event_action": "trigger",
                "payload": {
                    "summary": "disk full",
                    "timestamp": "2024-01-02T03:04:05",
                    "source": "host-a",
                    "severity": "critical",
                    "component": "db1",
                    "custom_details": { "alpha": { "nested": [1, 2] }, "zeta": true }
                }
            })
        );
    }

    #[test]
    fn test_custom_details_sorted_by_key() {
        let event: Event = TriggerEvent::new("sorted")
            .with_severity(Severity::Info)
            .with_custom_detail("b", 2)
            .with_custom_detail("a", 1)
            .into();

        let body = serde_json::to_string(&EnqueueRequest::new(&event, "rk", "h")).unwrap();
        assert!(body.contains(r#""custom_details":{"a":1,"b":2}"#));
    }

    #[test]
    fn test_optional_fields_omitted() {
        let event: Event = TriggerEvent::new("bare")
            .with_severity(Severity::Warning)
            .clear_timestamp()
            .into();

        let body = serde_json::to_value(EnqueueRequest::new(&event, "rk", "h")).unwrap();
        assert_eq!(
            body,
            json!({
                "routing_key": "rk",
                "event_action": "trigger",
                "payload": { "summary": "bare", "source": "h", "severity": "warning" }
            })
        );
    }

    #[test]
    fn test_attachments() {
        let event: Event = TriggerEvent::new("attachments")
            .with_severity(Severity::Error)
            .clear_timestamp()
            .with_image(
                Image::new(Url::parse("https://example.com/cpu.png").unwrap()).with_alt("CPU"),
            )
            .with_link(Link::new(Url::parse("https://example.com/runbook").unwrap()))
            .into();

        let body = serde_json::to_value(EnqueueRequest::new(&event, "rk", "h")).unwrap();
        assert_eq!(
            body["images"],
            json!([{ "src": "https://example.com/cpu.png", "alt": "CPU" }])
        );
        assert_eq!(body["links"], json!([{ "href": "https://example.com/runbook" }]));
    }

    #[test]
    fn test_resolve_body() {
        let event = Event::resolve("abc123");
        let body = serde_json::to_value(EnqueueRequest::new(&event, "rk", "h")).unwrap();
        assert_eq!(
            body,
            json!({ "routing_key": "rk", "dedup_key": "abc123", "event_action": "resolve" })
        );
    }
}
