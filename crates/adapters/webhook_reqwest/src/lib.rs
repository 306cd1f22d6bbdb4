//! # roomrunner-adapter-webhook-reqwest
//!
//! [`WebhookTransport`] adapter built on [reqwest](https://docs.rs/reqwest).
//!
//! The adapter performs exactly one HTTP attempt per call and reports
//! the raw status; timeout and retry policy live in the engine's
//! webhook executor.

use async_trait::async_trait;

use roomrunner_domain::error::ExecutionError;
use roomrunner_engine::ports::{WebhookRequest, WebhookResponse, WebhookTransport};

/// HTTP webhook delivery via a shared [`reqwest::Client`].
pub struct ReqwestWebhookTransport {
    client: reqwest::Client,
}

impl ReqwestWebhookTransport {
    /// Create a transport with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport from a pre-configured client (proxies, TLS, …).
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestWebhookTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookTransport for ReqwestWebhookTransport {
    async fn send(&self, request: &WebhookRequest) -> Result<WebhookResponse, ExecutionError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            ExecutionError::WebhookFailed {
                url: request.url.clone(),
                reason: format!("invalid http method `{}`", request.method),
            }
        })?;

        let mut builder = self.client.request(method, &request.url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| ExecutionError::WebhookFailed {
                url: request.url.clone(),
                reason: err.to_string(),
            })?;

        Ok(WebhookResponse {
            status: response.status().as_u16(),
        })
    }
}
