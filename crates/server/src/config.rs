use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub graph: GraphSettings,
    pub security: SecuritySettings,
    pub notify: NotifySettings,
    pub store: StoreSettings,
    pub trigger: TriggerSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone)]
pub struct GraphSettings {
    pub api_base: String,
    pub page_id: String,
    pub access_token: String,
}

#[derive(Deserialize, Clone)]
pub struct SecuritySettings {
    // webhook 签名用的 App Secret (sha256=... 证明)
    pub app_secret: String,
    // cron/调试调用的共享密钥
    pub cron_secret: String,
    // 订阅握手的 verify token
    pub verify_token: String,
    // 调试旁路：放过未认证请求（默认关闭）
    pub allow_unauthenticated: bool,
}

#[derive(Deserialize, Clone)]
pub struct NotifySettings {
    pub webhook_url: String,
}

// 去重表驱动：本地 SQLite 或托管 REST 表
#[derive(Deserialize, Clone)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum StoreSettings {
    Sqlite {
        url: String,
    },
    Http {
        base_url: String,
        api_key: String,
        table: String,
    },
}

#[derive(Deserialize, Clone)]
pub struct TriggerSettings {
    pub greeting_keywords: Vec<String>,
    pub notify_keyword: String,
    pub greeting_reply: String,
    // 时效窗口（分钟）；缺省不限制。各历史版本取值不一，故做成配置。
    pub recency_window_minutes: Option<i64>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        let env_map = collect_env_vars();

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("graph.api_base", "https://graph.facebook.com/v19.0")?
            .set_default("graph.page_id", "")?
            .set_default("graph.access_token", "")?
            .set_default("security.app_secret", "change_me_please")?
            .set_default("security.cron_secret", "cron_secret_change_me")?
            .set_default("security.verify_token", "verify_token_change_me")?
            .set_default("security.allow_unauthenticated", false)?
            .set_default("notify.webhook_url", "")?
            .set_default("store.mode", "sqlite")?
            .set_default("store.url", "sqlite://data/system_on.db")?
            .set_default(
                "trigger.greeting_keywords",
                vec!["系统开始".to_string(), "start".to_string(), "on".to_string()],
            )?
            .set_default("trigger.notify_keyword", "zzz")?
            .set_default("trigger.greeting_reply", "系统已开启，欢迎加入 🚀")?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(
                &serde_json::to_string(&env_map)
                    .expect("Environment variables should serialize to JSON"),
                config::FileFormat::Json,
            ))
            .build()?;

        s.try_deserialize()
    }
}

fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("SYSTEMON_"))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches("SYSTEMON_")
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}
