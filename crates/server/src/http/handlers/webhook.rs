use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use domain::RunReport;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

// GET /webhook — 平台订阅握手：token 对上就原样回显 challenge。
// 一次性的接入流程，与触发协议无关。
pub async fn verify_subscription(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Result<String, StatusCode> {
    let mode_ok = params.mode.as_deref() == Some("subscribe");
    let token_ok = params.verify_token.as_deref() == Some(state.verify_token.as_str());

    if mode_ok && token_ok {
        info!("Webhook subscription verified");
        return Ok(params.challenge.unwrap_or_default());
    }
    warn!("Webhook subscription verification failed");
    Err(StatusCode::FORBIDDEN)
}

// POST /webhook — 触发调用：可能是平台回调，也可能是 cron 的空请求体。
// 先过认证，再跑引擎；"无贴文"等逻辑结果一律 200。
pub async fn trigger(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RunReport>, (StatusCode, Json<serde_json::Value>)> {
    if !state.auth.authorize(&headers, &body) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "error": "unauthorized" })),
        ));
    }

    let report = state.engine.run().await;
    Ok(Json(report))
}

pub async fn healthz() -> &'static str {
    "ok"
}
