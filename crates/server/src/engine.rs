use adapter::{FeedClient, Notifier};
use chrono::Utc;
use domain::{ActionKind, ActionLog, Comment, Post, RunReport, TriggerRecord, TriggerRules, TriggerType};
use std::sync::Arc;
use storage::DedupStore;
use tracing::{info, warn};

#[derive(Clone)]
pub struct EngineConfig {
    // 粉丝页的 actor id，只有它发的评论才可能触发
    pub page_id: String,
    pub greeting_reply: String,
    pub recency_window_minutes: Option<i64>,
}

// 评论触发引擎：取最新贴文 → 逐条分类 → 查去重表 → 执行动作 → 记录。
// 单次调用内完全顺序执行；跨调用的唯一状态是去重表。
pub struct TriggerEngine {
    feed: Arc<dyn FeedClient>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn DedupStore>,
    rules: TriggerRules,
    config: EngineConfig,
}

impl TriggerEngine {
    pub fn new(
        feed: Arc<dyn FeedClient>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn DedupStore>,
        rules: TriggerRules,
        config: EngineConfig,
    ) -> Self {
        Self {
            feed,
            notifier,
            store,
            rules,
            config,
        }
    }

    pub async fn run(&self) -> RunReport {
        let post = match self.feed.latest_post().await {
            Ok(Some(post)) => post,
            Ok(None) => return RunReport::no_post(),
            Err(e) => {
                // 拉取失败按"无贴文"处理，不算硬错误
                warn!("Feed fetch failed: {}", e);
                return RunReport::no_post();
            }
        };

        if !post.within_window(Utc::now(), self.config.recency_window_minutes) {
            info!(post_id = %post.id, "Post outside recency window, skipping");
            return RunReport::stale(&post.id);
        }

        // 问候守卫：扫描已有的粉丝页评论找标记短语。这是针对问候动作的
        // 独立幂等保护，与去重表无关。
        let mut greeted = post.comments.iter().any(|c| {
            c.author_id == self.config.page_id && c.message.contains(&self.config.greeting_reply)
        });

        let mut details: Vec<ActionLog> = Vec::new();
        let mut triggered: u32 = 0;

        // 贴文内还没有问候时先补发一条（每帖至多一次）
        if !greeted {
            match self.feed.post_reply(&post.id, &self.config.greeting_reply).await {
                Ok(()) => greeted = true,
                Err(e) => warn!(post_id = %post.id, "Initial greeting reply failed: {}", e),
            }
        }

        for comment in &post.comments {
            // 单条评论出错不中断整批
            match self.process_comment(&post, comment, &mut greeted).await {
                Some(log) => {
                    if log.ok {
                        triggered += 1;
                    }
                    details.push(log);
                }
                None => continue,
            }
        }

        let message = if triggered > 0 {
            "triggered".to_string()
        } else {
            "no trigger matched".to_string()
        };
        info!(post_id = %post.id, triggered, "Trigger run finished");
        RunReport {
            message,
            triggered,
            post_id: Some(post.id.clone()),
            details,
        }
    }

    // 返回 None 表示该评论被跳过（非触发对象）；Some(log) 表示执行过动作
    async fn process_comment(
        &self,
        post: &Post,
        comment: &Comment,
        greeted: &mut bool,
    ) -> Option<ActionLog> {
        // 第三方作者的评论一律忽略，防止外部用户伪造关键词
        if comment.author_id != self.config.page_id {
            return None;
        }
        if comment.id.trim().is_empty() {
            return None;
        }

        match self.store.is_processed(&comment.id).await {
            Ok(true) => return None,
            Ok(false) => {}
            Err(e) => {
                warn!(comment_id = %comment.id, "Dedup lookup failed: {}", e);
                return Some(ActionLog {
                    comment_id: comment.id.clone(),
                    action: ActionKind::Skipped,
                    ok: false,
                    detail: Some(e.to_string()),
                });
            }
        }

        let trigger = self.rules.classify(&comment.message)?;

        let (action, result) = match trigger {
            TriggerType::SystemOn => (ActionKind::Greeting, self.ensure_greeting(post, greeted).await),
            TriggerType::Zzz => (
                ActionKind::Notify,
                self.notifier
                    .notify(&post.id, &comment.id)
                    .await
                    .map_err(|e| e.to_string()),
            ),
        };

        match result {
            Ok(()) => {
                // 只有动作确认成功才写去重表；写失败不回滚动作，只留日志
                let record = TriggerRecord::new(comment.id.clone(), &post.id, trigger);
                if let Err(e) = self.store.mark_processed(&record).await {
                    warn!(comment_id = %comment.id, "Dedup insert failed: {}", e);
                }
                Some(ActionLog {
                    comment_id: comment.id.clone(),
                    action,
                    ok: true,
                    detail: None,
                })
            }
            Err(e) => {
                warn!(comment_id = %comment.id, "Trigger action failed: {}", e);
                Some(ActionLog {
                    comment_id: comment.id.clone(),
                    action,
                    ok: false,
                    detail: Some(e),
                })
            }
        }
    }

    // 问候动作：每帖至多一条回复。已经问候过时直接视为成功。
    async fn ensure_greeting(&self, post: &Post, greeted: &mut bool) -> Result<(), String> {
        if *greeted {
            return Ok(());
        }
        self.feed
            .post_reply(&post.id, &self.config.greeting_reply)
            .await
            .map_err(|e| e.to_string())?;
        *greeted = true;
        Ok(())
    }
}
