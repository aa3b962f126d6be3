use async_trait::async_trait;
use domain::Post;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("feed fetch failed: {0}")]
    UpstreamFetch(String),
    #[error("reply failed: {0}")]
    Reply(String),
    #[error("notify failed: {0}")]
    Notify(String),
}

// 社交平台侧的读写口。实现方负责在边界上把上游的松散 JSON
// 收敛成 domain::Post / Comment，畸形条目直接丢弃。
#[async_trait]
pub trait FeedClient: Send + Sync {
    // 最新一条贴文及其评论；源里没有可用贴文时返回 None
    async fn latest_post(&self) -> Result<Option<Post>, AdapterError>;

    // 在贴文下发一条顶层回复
    async fn post_reply(&self, post_id: &str, text: &str) -> Result<(), AdapterError>;
}

// 外部自动化 webhook；只发不收，失败不影响其余评论的处理
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, post_id: &str, comment_id: &str) -> Result<(), AdapterError>;
}
