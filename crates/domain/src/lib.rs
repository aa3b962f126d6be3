mod models;
mod rules;

pub use models::{ActionKind, ActionLog, Comment, Post, RunReport, TriggerRecord, TriggerType};
pub use rules::TriggerRules;
