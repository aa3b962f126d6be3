use crate::build_client;
use crate::traits::{AdapterError, Notifier};
use async_trait::async_trait;
use tracing::debug;

// 倒计时事件转发：向外部自动化 webhook 发一条 JSON，只看状态码
pub struct WebhookNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client()?,
            webhook_url: webhook_url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, post_id: &str, comment_id: &str) -> Result<(), AdapterError> {
        let payload = serde_json::json!({
            "post_id": post_id,
            "comment_id": comment_id,
        });
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AdapterError::Notify(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AdapterError::Notify(format!("HTTP {}", resp.status())));
        }
        debug!(%post_id, %comment_id, "Notification delivered");
        Ok(())
    }
}
