//! Webhook transport port — HTTP delivery for `send_webhook` actions.
//!
//! The transport performs exactly one attempt; timeout and retry policy
//! live in the executor where they are unit-testable.

use async_trait::async_trait;

use roomrunner_domain::error::ExecutionError;

/// A single outbound webhook call.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookRequest {
    pub url: String,
    /// Upper-case HTTP method, e.g. `"POST"`.
    pub method: String,
    /// Optional JSON payload.
    pub body: Option<serde_json::Value>,
}

/// The observable result of a webhook call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
}

/// Delivers webhook requests to external HTTP endpoints.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Perform one delivery attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when the endpoint cannot be reached;
    /// non-success HTTP statuses are returned as a normal
    /// [`WebhookResponse`] for the executor to classify.
    async fn send(&self, request: &WebhookRequest) -> Result<WebhookResponse, ExecutionError>;
}
