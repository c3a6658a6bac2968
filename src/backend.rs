use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::model::Channel;

/// One student's outbound report payload, snapshotted at send time.
#[derive(Debug, Clone)]
pub struct OutboundReport {
    pub student_id: String,
    pub student_name: String,
    pub parent_name: String,
    pub parent_contact: String,
    pub parent_whatsapp: String,
    pub message: String,
}

/// Seam between the dispatcher and the delivery backend. The real
/// implementation talks HTTP; tests substitute a scripted one.
#[async_trait]
pub trait DeliveryService: Send + Sync {
    /// Deliver one report over the given channel. `Ok(())` means the backend
    /// acknowledged delivery; any `Err` is treated as a failed attempt.
    async fn send_notification(&self, report: &OutboundReport, channel: Channel) -> Result<()>;

    /// Deliver a whole batch in a single call. Per-item results are reported
    /// by the backend but not tracked here.
    async fn send_bulk(&self, reports: &[OutboundReport]) -> Result<()>;
}

#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let base_url = Url::parse(&cfg.backend.base_url).context("invalid backend.base_url")?;
        Ok(Self::with_base_url(
            base_url,
            Duration::from_millis(cfg.backend.request_timeout_ms),
        ))
    }

    pub fn with_base_url(base_url: Url, timeout: Duration) -> Self {
        let http = Client::builder()
            .user_agent("gradecast/0.1")
            .timeout(timeout)
            .no_proxy()
            .build()
            .expect("reqwest client");
        Self { http, base_url }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("invalid backend base URL")
    }

    async fn execute(&self, endpoint: Url, body: &Value) -> Result<SendResponse> {
        info!(url=%endpoint, "posting to delivery backend");
        let res = self
            .http
            .post(endpoint)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .context("failed to reach delivery backend")?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            warn!(%status, "delivery backend error: {}", body);
            return Err(anyhow!("backend error {}: {}", status, body));
        }

        let payload: SendResponse = res
            .json()
            .await
            .context("invalid delivery backend response JSON")?;
        if !payload.success {
            let detail = payload.message.as_deref().unwrap_or("no detail");
            warn!("delivery backend reported failure: {}", detail);
            return Err(anyhow!("backend reported failure: {}", detail));
        }
        Ok(payload)
    }
}

#[async_trait]
impl DeliveryService for BackendClient {
    async fn send_notification(&self, report: &OutboundReport, channel: Channel) -> Result<()> {
        let endpoint = self.endpoint("api/send-notification")?;
        let body = build_notification_request(report, channel);
        self.execute(endpoint, &body).await?;
        Ok(())
    }

    async fn send_bulk(&self, reports: &[OutboundReport]) -> Result<()> {
        let endpoint = self.endpoint("api/send-bulk-notifications")?;
        let body = build_bulk_request(reports);
        self.execute(endpoint, &body).await?;
        Ok(())
    }
}

pub fn build_notification_request(report: &OutboundReport, channel: Channel) -> Value {
    json!({
        "student_id": report.student_id,
        "student_name": report.student_name,
        "parent_name": report.parent_name,
        "parent_contact": report.parent_contact,
        "parent_whatsapp": report.parent_whatsapp,
        "message": report.message,
        "notification_type": channel.as_str(),
    })
}

pub fn build_bulk_request(reports: &[OutboundReport]) -> Value {
    let students: Vec<Value> = reports
        .iter()
        .map(|r| {
            json!({
                "student_id": r.student_id,
                "student_name": r.student_name,
                "parent_name": r.parent_name,
                "parent_contact": r.parent_contact,
                "parent_whatsapp": r.parent_whatsapp,
                "message": r.message,
            })
        })
        .collect();
    json!({ "students": students })
}

#[derive(Debug, Deserialize)]
pub struct SendResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> OutboundReport {
        OutboundReport {
            student_id: "1".into(),
            student_name: "Arjun Sharma".into(),
            parent_name: "Mr. Rajesh Sharma".into(),
            parent_contact: "+91 9876543210".into(),
            parent_whatsapp: "+91 9876543210".into(),
            message: "report text".into(),
        }
    }

    #[test]
    fn build_notification_request_includes_all_fields() {
        let body = build_notification_request(&sample_report(), Channel::Both);
        assert_eq!(body["student_id"], "1");
        assert_eq!(body["student_name"], "Arjun Sharma");
        assert_eq!(body["parent_name"], "Mr. Rajesh Sharma");
        assert_eq!(body["parent_contact"], "+91 9876543210");
        assert_eq!(body["parent_whatsapp"], "+91 9876543210");
        assert_eq!(body["message"], "report text");
        assert_eq!(body["notification_type"], "both");
    }

    #[test]
    fn build_notification_request_channel_labels() {
        let report = sample_report();
        assert_eq!(
            build_notification_request(&report, Channel::Sms)["notification_type"],
            "sms"
        );
        assert_eq!(
            build_notification_request(&report, Channel::Whatsapp)["notification_type"],
            "whatsapp"
        );
    }

    #[test]
    fn build_bulk_request_preserves_order() {
        let mut second = sample_report();
        second.student_id = "2".into();
        second.student_name = "Priya Patel".into();
        let body = build_bulk_request(&[sample_report(), second]);

        let students = body["students"].as_array().unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0]["student_id"], "1");
        assert_eq!(students[1]["student_id"], "2");
        // the bulk items carry no channel; the backend fans out to both
        assert!(students[0].get("notification_type").is_none());
    }

    #[test]
    fn build_bulk_request_empty() {
        let body = build_bulk_request(&[]);
        assert_eq!(body["students"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn response_parses_with_and_without_detail() {
        let full: SendResponse = serde_json::from_str(
            r#"{"success": true, "message": "Notification sent successfully", "results": [{}]}"#,
        )
        .unwrap();
        assert!(full.success);
        assert_eq!(full.results.len(), 1);

        let bare: SendResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!bare.success);
        assert!(bare.message.is_none());
        assert!(bare.results.is_empty());
    }
}
