//! Outbound notifications for report lifecycle events.

use async_trait::async_trait;
use reportd_common::{AppError, AppResult};
use reportd_db::entities::report;
use serde::Serialize;
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;

/// Notification payload sent to external endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub event: String,
    pub report_id: i64,
    pub report_type: String,
    pub status: String,
    pub timestamp: String,
    pub data: serde_json::Value,
}

/// Sink for report lifecycle events.
///
/// Implementations must be cheap to call from request handlers; delivery
/// failures are the implementation's problem, not the caller's.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A report was created.
    async fn report_created(&self, report: &report::Model) -> AppResult<()>;

    /// A report changed status.
    async fn status_changed(&self, report: &report::Model, old_status: &str) -> AppResult<()>;

    /// A report has sat unhandled past the staleness threshold.
    async fn report_stale(&self, report: &report::Model) -> AppResult<()>;
}

/// No-op notifier for deployments without an endpoint configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn report_created(&self, _report: &report::Model) -> AppResult<()> {
        Ok(())
    }

    async fn status_changed(&self, _report: &report::Model, _old_status: &str) -> AppResult<()> {
        Ok(())
    }

    async fn report_stale(&self, _report: &report::Model) -> AppResult<()> {
        Ok(())
    }
}

/// Maximum number of retries for a delivery.
const MAX_DELIVERY_RETRIES: u32 = 3;

/// Webhook notifier that POSTs signed JSON payloads.
#[derive(Clone)]
pub struct WebhookNotifier {
    url: String,
    secret: String,
    http_client: Arc<reqwest::Client>,
}

impl WebhookNotifier {
    /// Create a new webhook notifier.
    #[allow(clippy::expect_used)] // Client build only fails with incompatible TLS settings
    #[must_use]
    pub fn new(url: String, secret: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            url,
            secret,
            http_client: Arc::new(http_client),
        }
    }

    async fn deliver(&self, payload: &NotificationPayload) -> AppResult<()> {
        let body = serde_json::to_string(payload)
            .map_err(|e| AppError::Internal(format!("Failed to serialize payload: {e}")))?;
        let signature = self.sign_payload(&body);

        let mut retry = 0u32;
        loop {
            let result = self
                .http_client
                .post(&self.url)
                .header("Content-Type", "application/json")
                .header("X-Reportd-Signature", &signature)
                .body(body.clone())
                .send()
                .await;

            let error = match result {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => AppError::ExternalService(format!("HTTP {}", response.status())),
                Err(e) => AppError::ExternalService(format!("Request failed: {e}")),
            };

            retry += 1;
            if retry > MAX_DELIVERY_RETRIES {
                tracing::warn!(
                    url = %self.url,
                    event = %payload.event,
                    error = %error,
                    "Notification delivery failed after max retries"
                );
                return Err(error);
            }

            // Backoff: 2^retry seconds (2, 4, 8)
            let delay_secs = 2u64.pow(retry);
            tracing::debug!(
                url = %self.url,
                retry_count = retry,
                delay_secs = delay_secs,
                "Notification delivery failed, retrying"
            );
            tokio::time::sleep(std::time::Duration::from_secs(delay_secs)).await;
        }
    }

    #[allow(clippy::expect_used)] // HMAC accepts any key size, this cannot fail
    fn sign_payload(&self, payload: &str) -> String {
        use hmac::{Hmac, Mac};

        type HmacSha256 = Hmac<Sha256>;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        let result = mac.finalize();

        format!("sha256={}", hex::encode(result.into_bytes()))
    }

    fn payload(event: &str, report: &report::Model, data: serde_json::Value) -> NotificationPayload {
        NotificationPayload {
            event: event.to_string(),
            report_id: report.id,
            report_type: report.report_type.as_str().to_string(),
            status: report.status.as_str().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            data,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn report_created(&self, report: &report::Model) -> AppResult<()> {
        let data = json!({
            "category": report.category,
            "priority": report.priority.as_str(),
            "anonymous": report.anonymous,
        });
        self.deliver(&Self::payload("report.created", report, data))
            .await
    }

    async fn status_changed(&self, report: &report::Model, old_status: &str) -> AppResult<()> {
        let data = json!({
            "oldStatus": old_status,
            "handledBy": report.handled_by,
        });
        self.deliver(&Self::payload("report.status_changed", report, data))
            .await
    }

    async fn report_stale(&self, report: &report::Model) -> AppResult<()> {
        let data = json!({
            "createdAt": report.created_at.to_rfc3339(),
        });
        self.deliver(&Self::payload("report.stale", report, data))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reportd_db::entities::report::{Priority, ReportStatus, ReportType};

    fn sample_report() -> report::Model {
        report::Model {
            id: 7,
            report_type: ReportType::BugReport,
            category: "gameplay".to_string(),
            subcategory: None,
            priority: Priority::High,
            description: "Crash on login".to_string(),
            target_player_id: None,
            reporter_external_id: Some("ext-1".to_string()),
            reporter_player_id: None,
            anonymous: false,
            status: ReportStatus::Pending,
            handled_by: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_signature_format() {
        let notifier = WebhookNotifier::new(
            "https://example.com/hook".to_string(),
            "secret".to_string(),
        );
        let signature = notifier.sign_payload("{}");
        assert!(signature.starts_with("sha256="));
        assert_eq!(signature.len(), "sha256=".len() + 64);
    }

    #[test]
    fn test_signature_is_deterministic() {
        let notifier =
            WebhookNotifier::new("https://example.com".to_string(), "key".to_string());
        assert_eq!(notifier.sign_payload("abc"), notifier.sign_payload("abc"));
        assert_ne!(notifier.sign_payload("abc"), notifier.sign_payload("abd"));
    }

    #[test]
    fn test_payload_shape() {
        let report = sample_report();
        let payload = WebhookNotifier::payload("report.created", &report, json!({}));
        assert_eq!(payload.report_id, 7);
        assert_eq!(payload.report_type, "bug_report");
        assert_eq!(payload.status, "pending");

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["event"], "report.created");
        assert_eq!(value["reportId"], 7);
    }

    #[tokio::test]
    async fn test_null_notifier_is_noop() {
        let report = sample_report();
        assert!(NullNotifier.report_created(&report).await.is_ok());
        assert!(NullNotifier.status_changed(&report, "pending").await.is_ok());
        assert!(NullNotifier.report_stale(&report).await.is_ok());
    }
}
