use crate::DedupStore;
use anyhow::Context;
use async_trait::async_trait;
use domain::TriggerRecord;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::warn;

// 托管表存储 (Supabase 风格 REST)：每次读写都是一次 HTTP 调用。
// 插入冲突 (409) 按"已记录"处理，与 SQLite 驱动的 ON CONFLICT 语义对齐。
#[derive(Clone)]
pub struct HttpTableStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl HttpTableStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build table-store HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }
}

#[async_trait]
impl DedupStore for HttpTableStore {
    async fn is_processed(&self, comment_id: &str) -> anyhow::Result<bool> {
        if comment_id.trim().is_empty() {
            return Ok(true);
        }
        let rows: Vec<serde_json::Value> = self
            .client
            .get(self.table_url())
            .query(&[
                ("comment_id", format!("eq.{}", comment_id).as_str()),
                ("select", "comment_id"),
                ("limit", "1"),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("Dedup lookup request failed")?
            .error_for_status()
            .context("Dedup lookup rejected by table store")?
            .json()
            .await
            .context("Dedup lookup returned non-JSON body")?;
        Ok(!rows.is_empty())
    }

    async fn mark_processed(&self, record: &TriggerRecord) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .context("Dedup insert request failed")?;

        // 唯一键冲突：另一次调用已经记过，不算失败
        if resp.status() == StatusCode::CONFLICT {
            warn!(comment_id = %record.comment_id, "Dedup record already exists");
            return Ok(());
        }
        resp.error_for_status()
            .context("Dedup insert rejected by table store")?;
        Ok(())
    }
}
