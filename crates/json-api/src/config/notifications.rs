//! Notifications Config

use std::time::Duration;

use clap::Args;
use reqwest::Url;

/// Where customer notifications go. Without a webhook they are only logged.
#[derive(Debug, Args)]
pub struct NotificationsConfig {
    /// Endpoint that receives each notification as a JSON POST
    #[arg(long, env = "NOTIFY_WEBHOOK_URL")]
    pub webhook_url: Option<Url>,

    /// Webhook request timeout in seconds
    #[arg(long, env = "NOTIFY_WEBHOOK_TIMEOUT_SECONDS", default_value_t = 5_u64)]
    pub webhook_timeout_seconds: u64,
}

impl NotificationsConfig {
    #[must_use]
    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_seconds)
    }
}
