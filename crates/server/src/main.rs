mod auth;
mod config;
mod engine;
mod http;
mod state;

use adapter::{GraphConfig, GraphFeedClient, WebhookNotifier};
use anyhow::Context;
use auth::Authenticator;
use config::{Settings, StoreSettings};
use domain::TriggerRules;
use dotenvy::dotenv;
use engine::{EngineConfig, TriggerEngine};
use http::router::build_router;
use state::AppState;
use std::sync::Arc;
use storage::{DedupStore, HttpTableStore, SqliteStore};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::new().context("Failed to load configuration")?;

    let store: Arc<dyn DedupStore> = match &settings.store {
        StoreSettings::Sqlite { url } => {
            info!("Dedup store: local sqlite at {}", url);
            Arc::new(SqliteStore::new(url).await?)
        }
        StoreSettings::Http {
            base_url,
            api_key,
            table,
        } => {
            info!("Dedup store: hosted table '{}' at {}", table, base_url);
            Arc::new(HttpTableStore::new(base_url, api_key, table)?)
        }
    };

    let feed = Arc::new(GraphFeedClient::new(GraphConfig {
        api_base: settings.graph.api_base.clone(),
        page_id: settings.graph.page_id.clone(),
        access_token: settings.graph.access_token.clone(),
    })?);
    let notifier = Arc::new(WebhookNotifier::new(&settings.notify.webhook_url)?);

    let rules = TriggerRules::new(
        &settings.trigger.greeting_keywords,
        &settings.trigger.notify_keyword,
    );
    let engine = Arc::new(TriggerEngine::new(
        feed,
        notifier,
        store,
        rules,
        EngineConfig {
            page_id: settings.graph.page_id.clone(),
            greeting_reply: settings.trigger.greeting_reply.clone(),
            recency_window_minutes: settings.trigger.recency_window_minutes,
        },
    ));

    let state = AppState {
        engine,
        auth: Authenticator::new(
            &settings.security.app_secret,
            &settings.security.cron_secret,
            settings.security.allow_unauthenticated,
        ),
        verify_token: settings.security.verify_token.clone(),
    };

    let app = build_router(state, &settings.server.cors_origins);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
