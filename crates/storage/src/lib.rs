mod http;
mod memory;
mod sqlite;

pub use http::HttpTableStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use domain::TriggerRecord;

// 去重表：已处理评论 ID 的持久化集合。检查与插入是两次独立的远程调用，
// 并发调用之间没有事务保证（见 DESIGN.md 的已决开放问题）。
#[async_trait]
pub trait DedupStore: Send + Sync {
    // 空 ID 视为已处理，避免对坏输入重复执行副作用
    async fn is_processed(&self, comment_id: &str) -> anyhow::Result<bool>;

    // 插入一条记录；冲突（记录已存在）不视为错误
    async fn mark_processed(&self, record: &TriggerRecord) -> anyhow::Result<()>;
}
