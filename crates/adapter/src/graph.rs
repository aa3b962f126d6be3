use crate::traits::{AdapterError, FeedClient};
use crate::build_client;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Comment, Post};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub api_base: String,
    pub page_id: String,
    pub access_token: String,
}

// Facebook Graph API 客户端：读取粉丝页最新贴文（含最多 100 条评论），
// 以粉丝页身份发回复。
pub struct GraphFeedClient {
    client: reqwest::Client,
    config: GraphConfig,
}

// --- 边界层 wire 模型：上游 JSON 在这里收敛成 domain 类型 ---

#[derive(Deserialize)]
struct FeedEnvelope {
    #[serde(default)]
    data: Vec<WirePost>,
}

#[derive(Deserialize)]
struct WirePost {
    id: Option<String>,
    created_time: Option<String>,
    comments: Option<CommentEnvelope>,
}

#[derive(Deserialize)]
struct CommentEnvelope {
    #[serde(default)]
    data: Vec<WireComment>,
}

#[derive(Deserialize)]
struct WireComment {
    id: Option<String>,
    #[serde(default)]
    message: String,
    from: Option<WireAuthor>,
}

#[derive(Deserialize)]
struct WireAuthor {
    id: String,
}

// Graph 的 created_time 是 "+0000" 尾缀而非 RFC3339 的 "+00:00"
fn parse_graph_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

impl WirePost {
    fn into_post(self) -> Option<Post> {
        let id = self.id.filter(|s| !s.is_empty())?;
        let created_time = parse_graph_time(self.created_time.as_deref()?)?;
        let comments = self
            .comments
            .map(|c| c.data)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.into_comment())
            .collect();
        Some(Post {
            id,
            created_time,
            comments,
        })
    }
}

impl WireComment {
    // 缺 id 的评论无法去重，缺 from 的无法校验作者身份，都在边界上丢弃
    fn into_comment(self) -> Option<Comment> {
        let id = match self.id.filter(|s| !s.is_empty()) {
            Some(id) => id,
            None => {
                warn!("Dropping comment without id");
                return None;
            }
        };
        let author_id = match self.from {
            Some(a) if !a.id.is_empty() => a.id,
            _ => {
                warn!(comment_id = %id, "Dropping comment without author");
                return None;
            }
        };
        Some(Comment {
            id,
            message: self.message,
            author_id,
        })
    }
}

impl GraphFeedClient {
    pub fn new(config: GraphConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client()?,
            config,
        })
    }

    // 响应体带 error 对象时 Graph 仍可能返回 200，要单独检查
    fn check_graph_error(body: &serde_json::Value) -> Result<(), String> {
        match body.get("error") {
            Some(err) => Err(
                err.get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown graph error")
                    .to_string(),
            ),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FeedClient for GraphFeedClient {
    async fn latest_post(&self) -> Result<Option<Post>, AdapterError> {
        let url = format!("{}/{}/posts", self.config.api_base, self.config.page_id);
        let body: serde_json::Value = self
            .client
            .get(&url)
            .query(&[
                (
                    "fields",
                    "id,created_time,comments.limit(100){id,message,from}",
                ),
                ("limit", "1"),
                ("access_token", self.config.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AdapterError::UpstreamFetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| AdapterError::UpstreamFetch(e.to_string()))?;

        Self::check_graph_error(&body).map_err(AdapterError::UpstreamFetch)?;

        let envelope: FeedEnvelope = serde_json::from_value(body)
            .map_err(|e| AdapterError::UpstreamFetch(e.to_string()))?;

        // "最新" = 平台返回的第一条（倒序时间线）
        let post = envelope.data.into_iter().next().and_then(WirePost::into_post);
        match &post {
            Some(p) => debug!(post_id = %p.id, comments = p.comments.len(), "Fetched latest post"),
            None => debug!("Feed yielded no usable post"),
        }
        Ok(post)
    }

    async fn post_reply(&self, post_id: &str, text: &str) -> Result<(), AdapterError> {
        let url = format!("{}/{}/comments", self.config.api_base, post_id);
        let resp = self
            .client
            .post(&url)
            .form(&[
                ("message", text),
                ("access_token", self.config.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AdapterError::Reply(e.to_string()))?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .unwrap_or_else(|_| serde_json::json!({}));
        Self::check_graph_error(&body).map_err(AdapterError::Reply)?;
        if !status.is_success() {
            return Err(AdapterError::Reply(format!("HTTP {}", status)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_graph_timestamp_variants() {
        assert!(parse_graph_time("2024-05-01T12:00:00+0000").is_some());
        assert!(parse_graph_time("2024-05-01T12:00:00+00:00").is_some());
        assert!(parse_graph_time("yesterday").is_none());
    }

    #[test]
    fn malformed_comments_are_dropped_at_boundary() {
        let wire: FeedEnvelope = serde_json::from_value(serde_json::json!({
            "data": [{
                "id": "p1",
                "created_time": "2024-05-01T12:00:00+0000",
                "comments": { "data": [
                    { "id": "c1", "message": "系统开始", "from": { "id": "page" } },
                    { "message": "no id", "from": { "id": "page" } },
                    { "id": "c3", "message": "no author" },
                    { "id": "c4", "from": { "id": "page" } }
                ]}
            }]
        }))
        .unwrap();

        let post = wire.data.into_iter().next().unwrap().into_post().unwrap();
        assert_eq!(post.id, "p1");
        let ids: Vec<_> = post.comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c4"]);
        // message 缺失按空串处理
        assert_eq!(post.comments[1].message, "");
    }

    #[test]
    fn post_without_usable_fields_is_rejected() {
        let wire: FeedEnvelope = serde_json::from_value(serde_json::json!({
            "data": [{ "created_time": "2024-05-01T12:00:00+0000" }]
        }))
        .unwrap();
        assert!(wire.data.into_iter().next().unwrap().into_post().is_none());
    }

    #[test]
    fn graph_error_payload_is_detected() {
        let body = serde_json::json!({ "error": { "message": "Invalid OAuth token" } });
        assert_eq!(
            GraphFeedClient::check_graph_error(&body),
            Err("Invalid OAuth token".to_string())
        );
        assert!(GraphFeedClient::check_graph_error(&serde_json::json!({"data": []})).is_ok());
    }
}
