//! Discord webhook announcements for published weeks and approved works.
//!
//! - [`webhook`] -- webhook client (post with `wait=true`, edit by message id).
//! - [`announcement`] -- message builders for weeks and works.
//! - [`Notifier`] -- best-effort entry point used by the API: failures are
//!   logged and never propagated to the triggering request.

pub mod announcement;
pub mod notifier;
pub mod webhook;

pub use notifier::{DiscordConfig, Notifier};
pub use webhook::{DiscordWebhook, WebhookError, WebhookMessage};
