//! Discord webhook client with a short retry.
//!
//! [`DiscordWebhook::post`] creates a message and returns its id (the
//! webhook is called with `?wait=true` so Discord answers with the message
//! body). [`DiscordWebhook::edit`] patches an earlier message in place.
//! Rate limits (429), server errors, and connection failures are retried
//! twice with a growing delay; other failures return immediately.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

/// Retry delays in milliseconds.
const RETRY_DELAYS_MS: [u64; 2] = [500, 1500];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Invalid webhook URL: {0}")]
    InvalidUrl(String),
}

impl WebhookError {
    fn is_retryable(&self) -> bool {
        match self {
            WebhookError::Request(e) => e.is_connect() || e.is_timeout(),
            WebhookError::HttpStatus(status) => *status == 429 || *status >= 500,
            WebhookError::InvalidUrl(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Body of an execute/edit webhook call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WebhookMessage {
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct CreatedMessage {
    id: String,
}

// ---------------------------------------------------------------------------
// DiscordWebhook
// ---------------------------------------------------------------------------

/// One Discord webhook endpoint.
pub struct DiscordWebhook {
    client: reqwest::Client,
    url: Url,
}

impl DiscordWebhook {
    pub fn new(url: &str) -> Result<Self, WebhookError> {
        let url = Url::parse(url).map_err(|e| WebhookError::InvalidUrl(format!("{url}: {e}")))?;
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, url })
    }

    /// Post a new message and return its id.
    pub async fn post(&self, message: &WebhookMessage) -> Result<String, WebhookError> {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("wait", "true");

        let response = self
            .with_retry("post", || self.client.post(url.clone()).json(message).send())
            .await?;
        let created: CreatedMessage = response.json().await?;
        Ok(created.id)
    }

    /// Replace the content of an earlier message.
    pub async fn edit(&self, message_id: &str, message: &WebhookMessage) -> Result<(), WebhookError> {
        let url = self.message_url(message_id)?;
        self.with_retry("edit", || self.client.patch(url.clone()).json(message).send())
            .await?;
        Ok(())
    }

    fn message_url(&self, message_id: &str) -> Result<Url, WebhookError> {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|()| WebhookError::InvalidUrl(self.url.to_string()))?
            .pop_if_empty()
            .extend(["messages", message_id]);
        Ok(url)
    }

    async fn with_retry<F, Fut>(&self, action: &str, send: F) -> Result<reqwest::Response, WebhookError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        loop {
            let err = match send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => status_error(response.status()),
                Err(e) => WebhookError::Request(e),
            };

            match RETRY_DELAYS_MS.get(attempt) {
                Some(delay_ms) if err.is_retryable() => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        action,
                        error = %err,
                        "Discord webhook attempt failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                    attempt += 1;
                }
                _ => return Err(err),
            }
        }
    }
}

fn status_error(status: StatusCode) -> WebhookError {
    WebhookError::HttpStatus(status.as_u16())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://discord.com/api/webhooks/123/token-abc";

    #[test]
    fn message_url_appends_message_id() {
        let hook = DiscordWebhook::new(URL).unwrap();
        assert_eq!(
            hook.message_url("999").unwrap().as_str(),
            "https://discord.com/api/webhooks/123/token-abc/messages/999"
        );
    }

    #[test]
    fn invalid_url_rejected() {
        assert!(matches!(
            DiscordWebhook::new("not a url"),
            Err(WebhookError::InvalidUrl(_))
        ));
    }

    #[test]
    fn webhook_error_display_http_status() {
        let err = WebhookError::HttpStatus(502);
        assert_eq!(err.to_string(), "Webhook returned HTTP 502");
    }

    #[test]
    fn only_rate_limits_and_server_errors_retry() {
        assert!(WebhookError::HttpStatus(429).is_retryable());
        assert!(WebhookError::HttpStatus(503).is_retryable());
        assert!(!WebhookError::HttpStatus(400).is_retryable());
        assert!(!WebhookError::InvalidUrl("x".into()).is_retryable());
    }

    #[test]
    fn empty_embeds_are_omitted() {
        let json = serde_json::to_value(WebhookMessage {
            content: "hi".into(),
            embeds: vec![],
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "content": "hi" }));
    }
}
