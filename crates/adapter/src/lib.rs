mod graph;
mod notify;
mod traits;

pub use graph::{GraphConfig, GraphFeedClient};
pub use notify::WebhookNotifier;
pub use traits::{AdapterError, FeedClient, Notifier};

use std::time::Duration;

// 出站调用统一的超时上限，避免上游卡住把请求挂死
pub(crate) const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn build_client() -> anyhow::Result<reqwest::Client> {
    use anyhow::Context;
    reqwest::Client::builder()
        .timeout(OUTBOUND_TIMEOUT)
        .build()
        .context("Failed to build outbound HTTP client")
}
