use crate::DedupStore;
use async_trait::async_trait;
use domain::TriggerRecord;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::{fs, path::Path};

#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn new(db_url: &str) -> anyhow::Result<Self> {
        if db_url.starts_with("sqlite://") && !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://");
            let path = Path::new(path_str);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
        }
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            Sqlite::create_database(db_url).await?;
        }
        let pool = SqlitePoolOptions::new().connect(db_url).await?;
        sqlx::query("PRAGMA journal_mode = WAL;")
            .execute(&pool)
            .await?;
        sqlx::query("PRAGMA synchronous = NORMAL;")
            .execute(&pool)
            .await?;
        sqlx::migrate!("../../migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl DedupStore for SqliteStore {
    async fn is_processed(&self, comment_id: &str) -> anyhow::Result<bool> {
        if comment_id.trim().is_empty() {
            return Ok(true);
        }
        let row = sqlx::query("SELECT 1 FROM triggered_comments WHERE comment_id = ?")
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn mark_processed(&self, record: &TriggerRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO triggered_comments (comment_id, post_id, trigger_type)
            VALUES (?, ?, ?)
            ON CONFLICT(comment_id) DO NOTHING
            "#,
        )
        .bind(&record.comment_id)
        .bind(&record.post_id)
        .bind(record.trigger_type.map(|t| t.as_str()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl SqliteStore {
    // 运维用：已触发总数（不在热路径上，代替进程内计数器）
    pub async fn count(&self) -> anyhow::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM triggered_comments")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::TriggerType;

    async fn store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn mark_then_check() {
        let s = store().await;
        assert!(!s.is_processed("c1").await.unwrap());

        let rec = TriggerRecord::new("c1", "p1", TriggerType::SystemOn);
        s.mark_processed(&rec).await.unwrap();

        assert!(s.is_processed("c1").await.unwrap());
        assert_eq!(s.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_mark_is_harmless() {
        let s = store().await;
        let rec = TriggerRecord::new("c1", "p1", TriggerType::Zzz);
        s.mark_processed(&rec).await.unwrap();
        s.mark_processed(&rec).await.unwrap();
        assert_eq!(s.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_id_reports_processed() {
        let s = store().await;
        assert!(s.is_processed("").await.unwrap());
        assert!(s.is_processed("   ").await.unwrap());
    }
}
