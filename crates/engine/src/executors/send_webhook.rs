//! Executor for `send_webhook` actions.
//!
//! Every attempt runs under a fixed timeout so no webhook can stall the
//! dispatcher. Transient failures (timeout, transport error, 5xx) get
//! exactly one retry; a 4xx answer is treated as permanent and fails
//! immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use roomrunner_domain::error::{ConfigurationError, ExecutionError};
use roomrunner_domain::trigger::{Action, ActionKind};

use crate::executor::{ActionContext, ActionExecutor, ActionOutcome};
use crate::ports::{WebhookRequest, WebhookTransport};

/// Ceiling for one delivery attempt.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

const ALLOWED_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Delivers webhook calls through a [`WebhookTransport`].
pub struct SendWebhookExecutor {
    transport: Arc<dyn WebhookTransport>,
    timeout: Duration,
}

impl SendWebhookExecutor {
    /// Create an executor with the default per-attempt timeout.
    #[must_use]
    pub fn new(transport: Arc<dyn WebhookTransport>) -> Self {
        Self::with_timeout(transport, WEBHOOK_TIMEOUT)
    }

    /// Create an executor with a custom per-attempt timeout.
    #[must_use]
    pub fn with_timeout(transport: Arc<dyn WebhookTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    async fn attempt(&self, request: &WebhookRequest) -> Result<(), ExecutionError> {
        let response = tokio::time::timeout(self.timeout, self.transport.send(request))
            .await
            .map_err(|_| ExecutionError::WebhookFailed {
                url: request.url.clone(),
                reason: "timed out".to_string(),
            })??;
        if response.status >= 400 {
            return Err(ExecutionError::WebhookStatus {
                url: request.url.clone(),
                status: response.status,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ActionExecutor for SendWebhookExecutor {
    fn validate(&self, action: &Action) -> Result<(), ConfigurationError> {
        if let Action::SendWebhook { url, method, .. } = action {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigurationError::InvalidActionConfig {
                    kind: ActionKind::SendWebhook,
                    detail: format!("url `{url}` is not http(s)"),
                });
            }
            if !ALLOWED_METHODS.contains(&method.to_uppercase().as_str()) {
                return Err(ConfigurationError::InvalidActionConfig {
                    kind: ActionKind::SendWebhook,
                    detail: format!("unsupported method `{method}`"),
                });
            }
        }
        Ok(())
    }

    async fn execute(
        &self,
        action: &Action,
        _ctx: &ActionContext,
    ) -> Result<Vec<ActionOutcome>, ExecutionError> {
        let Action::SendWebhook { url, method, body } = action else {
            return Ok(Vec::new());
        };
        let request = WebhookRequest {
            url: url.clone(),
            method: method.to_uppercase(),
            body: body.clone(),
        };

        match self.attempt(&request).await {
            Ok(()) => Ok(Vec::new()),
            Err(err) if is_transient(&err) => {
                tracing::debug!(url = %request.url, error = %err, "webhook attempt failed, retrying once");
                self.attempt(&request).await.map(|()| Vec::new())
            }
            Err(err) => Err(err),
        }
    }
}

/// Whether a failure is worth one retry: timeouts, transport errors,
/// and 5xx answers. 4xx is a permanent configuration/endpoint problem.
fn is_transient(err: &ExecutionError) -> bool {
    match err {
        ExecutionError::WebhookFailed { .. } => true,
        ExecutionError::WebhookStatus { status, .. } => *status >= 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomrunner_domain::id::RoomId;
    use serde_json::json;
    use std::sync::Mutex;

    /// Transport that answers from a script and records every request.
    struct ScriptedTransport {
        responses: Mutex<Vec<Result<WebhookResponse, ExecutionError>>>,
        requests: Mutex<Vec<WebhookRequest>>,
    }

    use crate::ports::WebhookResponse;

    impl ScriptedTransport {
        fn with(responses: Vec<Result<WebhookResponse, ExecutionError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl WebhookTransport for ScriptedTransport {
        async fn send(&self, request: &WebhookRequest) -> Result<WebhookResponse, ExecutionError> {
            self.requests.lock().unwrap().push(request.clone());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(WebhookResponse { status: 200 })
            } else {
                responses.remove(0)
            }
        }
    }

    /// Transport that never answers, to exercise the timeout path.
    struct StalledTransport;

    #[async_trait]
    impl WebhookTransport for StalledTransport {
        async fn send(&self, _request: &WebhookRequest) -> Result<WebhookResponse, ExecutionError> {
            std::future::pending().await
        }
    }

    fn webhook_action() -> Action {
        Action::SendWebhook {
            url: "https://example.com/hook".to_string(),
            method: "post".to_string(),
            body: Some(json!({"solved": true})),
        }
    }

    fn ctx() -> ActionContext {
        ActionContext {
            room_id: RoomId::new(),
            depth: 0,
        }
    }

    #[tokio::test]
    async fn should_succeed_on_first_2xx_without_retry() {
        let transport = ScriptedTransport::with(vec![Ok(WebhookResponse { status: 200 })]);
        let executor = SendWebhookExecutor::new(Arc::clone(&transport) as Arc<dyn WebhookTransport>);

        let outcomes = executor.execute(&webhook_action(), &ctx()).await.unwrap();
        assert!(outcomes.is_empty());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn should_uppercase_method_before_sending() {
        let transport = ScriptedTransport::with(vec![]);
        let executor = SendWebhookExecutor::new(Arc::clone(&transport) as Arc<dyn WebhookTransport>);

        executor.execute(&webhook_action(), &ctx()).await.unwrap();
        assert_eq!(transport.requests.lock().unwrap()[0].method, "POST");
    }

    #[tokio::test]
    async fn should_retry_exactly_once_on_5xx_then_fail() {
        let transport = ScriptedTransport::with(vec![
            Ok(WebhookResponse { status: 503 }),
            Ok(WebhookResponse { status: 503 }),
        ]);
        let executor = SendWebhookExecutor::new(Arc::clone(&transport) as Arc<dyn WebhookTransport>);

        let result = executor.execute(&webhook_action(), &ctx()).await;
        assert!(matches!(
            result,
            Err(ExecutionError::WebhookStatus { status: 503, .. })
        ));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn should_recover_when_retry_succeeds_after_503() {
        let transport = ScriptedTransport::with(vec![
            Ok(WebhookResponse { status: 503 }),
            Ok(WebhookResponse { status: 200 }),
        ]);
        let executor = SendWebhookExecutor::new(Arc::clone(&transport) as Arc<dyn WebhookTransport>);

        let result = executor.execute(&webhook_action(), &ctx()).await;
        assert!(result.is_ok());
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn should_not_retry_on_4xx() {
        let transport = ScriptedTransport::with(vec![Ok(WebhookResponse { status: 404 })]);
        let executor = SendWebhookExecutor::new(Arc::clone(&transport) as Arc<dyn WebhookTransport>);

        let result = executor.execute(&webhook_action(), &ctx()).await;
        assert!(matches!(
            result,
            Err(ExecutionError::WebhookStatus { status: 404, .. })
        ));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn should_retry_transport_errors_once() {
        let transport = ScriptedTransport::with(vec![
            Err(ExecutionError::WebhookFailed {
                url: "https://example.com/hook".to_string(),
                reason: "connection refused".to_string(),
            }),
            Ok(WebhookResponse { status: 204 }),
        ]);
        let executor = SendWebhookExecutor::new(Arc::clone(&transport) as Arc<dyn WebhookTransport>);

        let result = executor.execute(&webhook_action(), &ctx()).await;
        assert!(result.is_ok());
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn should_time_out_stalled_attempts() {
        let executor = SendWebhookExecutor::with_timeout(
            Arc::new(StalledTransport),
            Duration::from_millis(10),
        );

        let result = executor.execute(&webhook_action(), &ctx()).await;
        assert!(matches!(
            result,
            Err(ExecutionError::WebhookFailed { reason, .. }) if reason == "timed out"
        ));
    }

    #[test]
    fn should_reject_non_http_url() {
        let executor = SendWebhookExecutor::new(Arc::new(StalledTransport));
        let action = Action::SendWebhook {
            url: "ftp://example.com".to_string(),
            method: "GET".to_string(),
            body: None,
        };
        assert!(matches!(
            executor.validate(&action),
            Err(ConfigurationError::InvalidActionConfig { .. })
        ));
    }

    #[test]
    fn should_reject_unsupported_method() {
        let executor = SendWebhookExecutor::new(Arc::new(StalledTransport));
        let action = Action::SendWebhook {
            url: "https://example.com".to_string(),
            method: "TRACE".to_string(),
            body: None,
        };
        assert!(executor.validate(&action).is_err());
    }

    #[test]
    fn should_accept_lowercase_method() {
        let executor = SendWebhookExecutor::new(Arc::new(StalledTransport));
        let action = Action::SendWebhook {
            url: "https://example.com".to_string(),
            method: "delete".to_string(),
            body: None,
        };
        assert!(executor.validate(&action).is_ok());
    }
}
