//! Best-effort announcement entry point.

use artweeks_db::models::week::Week;
use artweeks_db::models::work::Work;

use crate::announcement;
use crate::webhook::{DiscordWebhook, WebhookError, WebhookMessage};

/// Default link target for announcements.
const DEFAULT_SITE_URL: &str = "http://localhost:5173";

/// Webhook configuration loaded from environment variables.
#[derive(Debug, Clone, Default)]
pub struct DiscordConfig {
    pub weeks_webhook_url: Option<String>,
    pub works_webhook_url: Option<String>,
    pub site_url: String,
}

impl DiscordConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `DISCORD_WEEKS_WEBHOOK_URL` | unset (disabled)        |
    /// | `DISCORD_WORKS_WEBHOOK_URL` | unset (disabled)        |
    /// | `SITE_URL`                  | `http://localhost:5173` |
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            weeks_webhook_url: non_empty("DISCORD_WEEKS_WEBHOOK_URL"),
            works_webhook_url: non_empty("DISCORD_WORKS_WEBHOOK_URL"),
            site_url: non_empty("SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
        }
    }
}

/// Posts and edits announcements. A missing webhook disables that channel.
///
/// Every method returns the message id that should be stored on the record
/// afterwards and never fails: delivery errors are logged and dropped.
pub struct Notifier {
    weeks: Option<DiscordWebhook>,
    works: Option<DiscordWebhook>,
    site_url: String,
}

impl Notifier {
    pub fn new(config: &DiscordConfig) -> Result<Self, WebhookError> {
        let build = |url: &Option<String>| url.as_deref().map(DiscordWebhook::new).transpose();
        let notifier = Self {
            weeks: build(&config.weeks_webhook_url)?,
            works: build(&config.works_webhook_url)?,
            site_url: config.site_url.clone(),
        };
        tracing::info!(
            weeks = notifier.weeks.is_some(),
            works = notifier.works.is_some(),
            "Discord notifier configured"
        );
        Ok(notifier)
    }

    /// A notifier with both channels off.
    pub fn disabled() -> Self {
        Self {
            weeks: None,
            works: None,
            site_url: DEFAULT_SITE_URL.to_string(),
        }
    }

    /// Announce (or re-announce) a published week.
    pub async fn announce_week(&self, week: &Week) -> Option<String> {
        let message = announcement::week_message(week, &self.site_url);
        deliver(self.weeks.as_ref(), week.discord_id.as_deref(), &message, "week").await
    }

    /// Announce an approved work, or edit its earlier announcement.
    pub async fn announce_work(&self, work: &Work) -> Option<String> {
        let message = announcement::work_message(work, &self.site_url);
        deliver(self.works.as_ref(), work.discord_id.as_deref(), &message, "work").await
    }
}

async fn deliver(
    hook: Option<&DiscordWebhook>,
    existing: Option<&str>,
    message: &WebhookMessage,
    kind: &'static str,
) -> Option<String> {
    let Some(hook) = hook else {
        return existing.map(str::to_string);
    };

    match existing {
        Some(message_id) => {
            if let Err(e) = hook.edit(message_id, message).await {
                tracing::warn!(kind, message_id, error = %e, "Failed to edit Discord announcement");
            }
            Some(message_id.to_string())
        }
        None => match hook.post(message).await {
            Ok(message_id) => {
                tracing::info!(kind, message_id = %message_id, "Discord announcement posted");
                Some(message_id)
            }
            Err(e) => {
                tracing::warn!(kind, error = %e, "Failed to post Discord announcement");
                None
            }
        },
    }
}
