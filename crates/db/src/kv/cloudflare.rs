//! Cloudflare Workers KV over the v4 REST API.
//!
//! Lets the server share a namespace with the edge deployment. Keys contain
//! `/`, so each key is pushed as a single percent-encoded path segment.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use super::{KvError, KvStore};

/// Default API root.
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// HTTP timeout for a single KV request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for a Workers KV namespace.
#[derive(Debug, Clone)]
pub struct CloudflareConfig {
    pub api_base: String,
    pub account_id: String,
    pub namespace_id: String,
    pub api_token: String,
}

impl CloudflareConfig {
    /// Load from `CF_ACCOUNT_ID`, `CF_KV_NAMESPACE_ID`, `CF_API_TOKEN` and the
    /// optional `CF_API_BASE`.
    ///
    /// # Panics
    ///
    /// Panics if any required variable is missing.
    pub fn from_env() -> Self {
        let required = |name: &str| {
            std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set for the cloudflare store"))
        };
        Self {
            api_base: std::env::var("CF_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into()),
            account_id: required("CF_ACCOUNT_ID"),
            namespace_id: required("CF_KV_NAMESPACE_ID"),
            api_token: required("CF_API_TOKEN"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    result: Vec<ListedKey>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ListedKey {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    cursor: Option<String>,
}

pub struct CloudflareKvStore {
    client: reqwest::Client,
    namespace_url: Url,
    api_token: String,
}

impl CloudflareKvStore {
    pub fn new(config: &CloudflareConfig) -> Result<Self, KvError> {
        let raw = format!(
            "{}/accounts/{}/storage/kv/namespaces/{}",
            config.api_base.trim_end_matches('/'),
            config.account_id,
            config.namespace_id
        );
        let namespace_url =
            Url::parse(&raw).map_err(|e| KvError::Backend(format!("invalid KV url {raw}: {e}")))?;
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            namespace_url,
            api_token: config.api_token.clone(),
        })
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url, KvError> {
        let mut url = self.namespace_url.clone();
        url.path_segments_mut()
            .map_err(|()| KvError::Backend("KV url cannot be a base".into()))?
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl KvStore for CloudflareKvStore {
    fn backend(&self) -> &'static str {
        "cloudflare"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let response = self
            .client
            .get(self.url_for(&["values", key])?)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.text().await?)),
            status => Err(KvError::HttpStatus {
                status: status.as_u16(),
                key: key.to_string(),
            }),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), KvError> {
        let response = self
            .client
            .put(self.url_for(&["values", key])?)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(value.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(KvError::HttpStatus {
                status: response.status().as_u16(),
                key: key.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        let response = self
            .client
            .delete(self.url_for(&["values", key])?)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(KvError::HttpStatus {
                status: status.as_u16(),
                key: key.to_string(),
            })
        }
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, KvError> {
        let mut keys = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut url = self.url_for(&["keys"])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("prefix", prefix);
                if let Some(c) = &cursor {
                    query.append_pair("cursor", c);
                }
            }

            let response = self
                .client
                .get(url)
                .bearer_auth(&self.api_token)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(KvError::HttpStatus {
                    status: response.status().as_u16(),
                    key: format!("{prefix}*"),
                });
            }

            let page: ListResponse = response.json().await?;
            keys.extend(page.result.into_iter().map(|k| k.name));

            cursor = page
                .result_info
                .and_then(|info| info.cursor)
                .filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        keys.sort();
        Ok(keys)
    }
}
