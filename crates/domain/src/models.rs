use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// 平台侧评论，只读。message 缺失时由上游客户端填空串。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub message: String,
    pub author_id: String,
}

// 只取最新一条贴文；comments 保持 Graph API 返回顺序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub created_time: DateTime<Utc>,
    pub comments: Vec<Comment>,
}

impl Post {
    // 贴文是否仍在时效窗口内 (window_minutes 为 None 表示不限制)
    pub fn within_window(&self, now: DateTime<Utc>, window_minutes: Option<i64>) -> bool {
        match window_minutes {
            Some(mins) => {
                now.signed_duration_since(self.created_time) <= chrono::Duration::minutes(mins)
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    SystemOn,
    Zzz,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::SystemOn => "system_on",
            TriggerType::Zzz => "zzz",
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 去重表的一行：每条触发过的评论恰好一条记录，只插入，永不更新/删除
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub comment_id: String,
    pub post_id: Option<String>,
    pub trigger_type: Option<TriggerType>,
}

impl TriggerRecord {
    pub fn new(comment_id: impl Into<String>, post_id: &str, trigger_type: TriggerType) -> Self {
        Self {
            comment_id: comment_id.into(),
            post_id: Some(post_id.to_string()),
            trigger_type: Some(trigger_type),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Greeting,
    Notify,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub comment_id: String,
    pub action: ActionKind,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// 单次调用的汇总，直接序列化为 HTTP 响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub message: String,
    pub triggered: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ActionLog>,
}

impl RunReport {
    pub fn no_post() -> Self {
        Self {
            message: "no post".to_string(),
            triggered: 0,
            post_id: None,
            details: Vec::new(),
        }
    }

    pub fn stale(post_id: &str) -> Self {
        Self {
            message: "skipped: stale post".to_string(),
            triggered: 0,
            post_id: Some(post_id.to_string()),
            details: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post_at(ts: DateTime<Utc>) -> Post {
        Post {
            id: "p1".into(),
            created_time: ts,
            comments: vec![],
        }
    }

    #[test]
    fn window_disabled_accepts_any_age() {
        let old = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert!(post_at(old).within_window(Utc::now(), None));
    }

    #[test]
    fn window_rejects_stale_post() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let post = post_at(created);
        assert!(!post.within_window(now, Some(60)));
        assert!(post.within_window(now, Some(180)));
    }

    #[test]
    fn trigger_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TriggerType::SystemOn).unwrap(),
            "\"system_on\""
        );
        assert_eq!(TriggerType::Zzz.as_str(), "zzz");
    }
}
