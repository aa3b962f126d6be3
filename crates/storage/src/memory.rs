use crate::DedupStore;
use async_trait::async_trait;
use domain::TriggerRecord;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// 内存版去重表，用于测试和本地试跑
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, TriggerRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, comment_id: &str) -> bool {
        self.records.lock().unwrap().contains_key(comment_id)
    }

    pub fn get(&self, comment_id: &str) -> Option<TriggerRecord> {
        self.records.lock().unwrap().get(comment_id).cloned()
    }
}

#[async_trait]
impl DedupStore for MemoryStore {
    async fn is_processed(&self, comment_id: &str) -> anyhow::Result<bool> {
        if comment_id.trim().is_empty() {
            return Ok(true);
        }
        Ok(self.records.lock().unwrap().contains_key(comment_id))
    }

    async fn mark_processed(&self, record: &TriggerRecord) -> anyhow::Result<()> {
        self.records
            .lock()
            .unwrap()
            .entry(record.comment_id.clone())
            .or_insert_with(|| record.clone());
        Ok(())
    }
}
