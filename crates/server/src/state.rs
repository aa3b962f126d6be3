use crate::auth::Authenticator;
use crate::engine::TriggerEngine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TriggerEngine>,
    pub auth: Authenticator,
    // 订阅握手用的 verify token，与签名/共享密钥两条认证路径无关
    pub verify_token: String,
}
