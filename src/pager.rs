use serde_json::Value;
use uuid::Uuid;

use crate::client::EventsClient;
use crate::errors::Result;
use crate::event::{CustomDetails, TriggerEvent};
use crate::types::{EventResponse, Severity};

/// One-call trigger helpers with staged custom details
///
/// Details staged on the pager are copied into the payload of every event it
/// triggers. Each call builds and sends a fresh event.
///
/// # Example
///
/// ```rust,no_run
/// use pagerduty_events_api::{EventsClient, Pager, Severity};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pager = Pager::new(EventsClient::from_env()?)
///         .with_custom_detail("region", "eu-west-1");
///
///     let response = pager
///         .trigger_with_severity("Replication lag above 30s", "db1", Severity::Warning, None)
///         .await?;
///     println!("{}", response.dedup_key);
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Pager {
    client: EventsClient,
    custom_details: CustomDetails,
}

impl Pager {
    /// Create a pager with nothing staged
    pub fn new(client: EventsClient) -> Self {
        Self {
            client,
            custom_details: CustomDetails::new(),
        }
    }

    /// Stage a custom detail for every triggered event
    pub fn with_custom_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.custom_details.insert(key.to_string(), value.into());
        self
    }

    /// Stage several custom details, last write wins per key
    pub fn with_custom_details<I>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.custom_details.extend(details);
        self
    }

    /// Get the staged custom details
    pub fn custom_details(&self) -> &CustomDetails {
        &self.custom_details
    }

    /// Get the underlying client
    pub fn client(&self) -> &EventsClient {
        &self.client
    }

    /// Trigger an event with severity `error`
    pub async fn trigger(
        &self,
        summary: &str,
        component: &str,
        dedup_key: Option<Uuid>,
    ) -> Result<EventResponse> {
        self.trigger_with_severity(summary, component, Severity::Error, dedup_key)
            .await
    }

    /// Trigger an event with the given severity
    pub async fn trigger_with_severity(
        &self,
        summary: &str,
        component: &str,
        severity: Severity,
        dedup_key: Option<Uuid>,
    ) -> Result<EventResponse> {
        let event = staged_trigger(&self.custom_details, summary, component, severity)
            .with_dedup_uuid(dedup_key);
        self.client.submit(event).await
    }

    /// Trigger an event with severity, group and class
    pub async fn trigger_with_group(
        &self,
        summary: &str,
        component: &str,
        severity: Severity,
        group: &str,
        class: &str,
        dedup_key: Option<Uuid>,
    ) -> Result<EventResponse> {
        let event = staged_trigger(&self.custom_details, summary, component, severity)
            .with_group(group)
            .with_class(class)
            .with_dedup_uuid(dedup_key);
        self.client.submit(event).await
    }
}

fn staged_trigger(
    staged: &CustomDetails,
    summary: &str,
    component: &str,
    severity: Severity,
) -> TriggerEvent {
    TriggerEvent::new(summary)
        .with_component(component)
        .with_severity(severity)
        .with_custom_details(staged.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EventContext;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn pager_for(server: &MockServer) -> Pager {
        Mock::given(method("POST"))
            .and(path("/v2/enqueue"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "status": "success",
                "message": "Event processed",
                "dedup_key": "abc123",
                "errors": []
            })))
            .mount(server)
            .await;

        let client = EventsClient::new(Url::parse(&server.uri()).unwrap(), Duration::from_secs(10))
            .unwrap()
            .with_context(EventContext::fixed("rk", "host-a"));
        Pager::new(client)
    }

    async fn sent_payload(server: &MockServer) -> serde_json::Value {
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        body["payload"].clone()
    }

    #[tokio::test]
    async fn test_trigger_defaults_to_error() {
        let server = MockServer::start().await;
        let pager = pager_for(&server).await;

        let response = pager.trigger("disk full", "db1", None).await.unwrap();
        assert_eq!(response.status_code, 202);

        let payload = sent_payload(&server).await;
        assert_eq!(payload["severity"], "error");
        assert_eq!(payload["component"], "db1");
        assert_eq!(payload["source"], "host-a");
        assert!(payload.get("custom_details").is_none());
    }

    #[tokio::test]
    async fn test_trigger_merges_staged_details() {
        let server = MockServer::start().await;
        let pager = pager_for(&server)
            .await
            .with_custom_detail("b", 2)
            .with_custom_details([("a".to_string(), json!(1))]);

        pager
            .trigger_with_severity("disk full", "db1", Severity::Critical, None)
            .await
            .unwrap();

        let payload = sent_payload(&server).await;
        assert_eq!(payload["severity"], "critical");
        assert_eq!(payload["custom_details"], json!({ "a": 1, "b": 2 }));
        // Staging is not consumed by a trigger
        assert_eq!(pager.custom_details().len(), 2);
    }

    #[tokio::test]
    async fn test_trigger_with_group_and_dedup_key() {
        let server = MockServer::start().await;
        let pager = pager_for(&server).await;
        let key = Uuid::new_v4();

        pager
            .trigger_with_group("lag", "db1", Severity::Warning, "storage", "replication", Some(key))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["dedup_key"], key.to_string());
        assert_eq!(body["payload"]["group"], "storage");
        assert_eq!(body["payload"]["class"], "replication");
        assert_eq!(body["payload"]["severity"], "warning");
    }

    #[test]
    fn test_staged_trigger_fields() {
        let mut staged = CustomDetails::new();
        staged.insert("a".to_string(), json!(1));

        let event = staged_trigger(&staged, "summary", "component", Severity::Info);
        assert_eq!(event.payload().custom_details(), &staged);
        assert_eq!(event.payload().severity(), Some(Severity::Info));
        assert_eq!(event.payload().component(), Some("component"));
    }
}
