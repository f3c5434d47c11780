use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    RequestFailed(String),
    #[error("Notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound notification to a sibling function
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, function: &str, payload: Value) -> Result<(), NotifyError>;
}

/// Calls Supabase edge functions at `{url}/functions/v1/{function}`
pub struct EdgeFunctionNotifier {
    client: reqwest::Client,
    functions_url: String,
    service_key: String,
}

impl EdgeFunctionNotifier {
    pub fn new(url: &str, service_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            functions_url: format!("{}/functions/v1", url.trim_end_matches('/')),
            service_key: service_key.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for EdgeFunctionNotifier {
    async fn notify(&self, function: &str, payload: Value) -> Result<(), NotifyError> {
        let url = format!("{}/{}", self.functions_url, function);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(function, "Notification delivered");
        Ok(())
    }
}

/// Fire and forget: the notification runs on its own task and failures are
/// only logged. Callers never wait on it.
pub fn dispatch(notifier: Arc<dyn Notifier>, function: String, payload: Value) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&function, payload).await {
            warn!(function = %function, error = %e, "Notification failed");
        }
    });
}
