use crate::models::TriggerType;

// 关键词规则表：有序的 (关键词, 触发类型) 列表，统一了各处散落的匹配逻辑。
// 匹配时按顺序取第一个命中项，问候关键词排在 zzz 之前，因此同时包含两类
// 关键词的评论只会触发问候。
#[derive(Debug, Clone)]
pub struct TriggerRules {
    rules: Vec<(String, TriggerType)>,
}

impl TriggerRules {
    pub fn new(greeting_keywords: &[String], notify_keyword: &str) -> Self {
        let mut rules: Vec<(String, TriggerType)> = greeting_keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| (k.to_lowercase(), TriggerType::SystemOn))
            .collect();
        if !notify_keyword.trim().is_empty() {
            rules.push((notify_keyword.to_lowercase(), TriggerType::Zzz));
        }
        Self { rules }
    }

    // 大小写不敏感的子串匹配；空文本永不命中
    pub fn classify(&self, message: &str) -> Option<TriggerType> {
        if message.is_empty() {
            return None;
        }
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .find(|(kw, _)| lowered.contains(kw.as_str()))
            .map(|(_, t)| *t)
    }
}

impl Default for TriggerRules {
    fn default() -> Self {
        Self::new(
            &[
                "系统开始".to_string(),
                "start".to_string(),
                "on".to_string(),
            ],
            "zzz",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_keywords_match_case_insensitive() {
        let rules = TriggerRules::default();
        assert_eq!(rules.classify("系统开始"), Some(TriggerType::SystemOn));
        assert_eq!(rules.classify("START now"), Some(TriggerType::SystemOn));
        assert_eq!(rules.classify("zZz"), Some(TriggerType::Zzz));
        assert_eq!(rules.classify("hello world"), None);
    }

    #[test]
    fn greeting_wins_when_both_keywords_present() {
        let rules = TriggerRules::default();
        assert_eq!(
            rules.classify("start zzz"),
            Some(TriggerType::SystemOn)
        );
        assert_eq!(
            rules.classify("zzz 系统开始"),
            Some(TriggerType::SystemOn)
        );
    }

    #[test]
    fn empty_message_never_matches() {
        let rules = TriggerRules::default();
        assert_eq!(rules.classify(""), None);
    }

    #[test]
    fn blank_keywords_are_dropped() {
        let rules = TriggerRules::new(&["  ".to_string()], "");
        assert_eq!(rules.classify("anything"), None);
    }
}
