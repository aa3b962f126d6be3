use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

type HmacSha256 = Hmac<Sha256>;

// 防时序攻击的等长比较
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

// 入站请求的两种认证证明，按序检查：
// 1. x-hub-signature-256: sha256=<hex(hmac_sha256(body, app_secret))>
// 2. x-cron-secret 与配置值相等
// 都不通过时仅当 allow_unauthenticated 打开才放行。
#[derive(Clone)]
pub struct Authenticator {
    app_secret: String,
    cron_secret: String,
    allow_unauthenticated: bool,
}

impl Authenticator {
    pub fn new(app_secret: &str, cron_secret: &str, allow_unauthenticated: bool) -> Self {
        Self {
            app_secret: app_secret.to_string(),
            cron_secret: cron_secret.to_string(),
            allow_unauthenticated,
        }
    }

    pub fn authorize(&self, headers: &HeaderMap, body: &[u8]) -> bool {
        if let Some(sig) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) {
            if self.verify_signature(sig, body) {
                return true;
            }
            warn!("Webhook signature mismatch");
        }

        if let Some(secret) = headers
            .get(CRON_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            if !self.cron_secret.is_empty()
                && constant_time_eq(secret.as_bytes(), self.cron_secret.as_bytes())
            {
                return true;
            }
            warn!("Cron secret mismatch");
        }

        if self.allow_unauthenticated {
            warn!("Accepting unauthenticated request (debug bypass enabled)");
            return true;
        }
        false
    }

    fn verify_signature(&self, signature: &str, body: &[u8]) -> bool {
        if body.is_empty() {
            return false;
        }
        let mut mac = match HmacSha256::new_from_slice(self.app_secret.as_bytes()) {
            Ok(m) => m,
            Err(_) => return false,
        };
        mac.update(body);
        let expected = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));
        constant_time_eq(signature.as_bytes(), expected.as_bytes())
    }
}
