//! Social-preview thumbnails for link-only work items.
//!
//! Fetches the linked page and pulls the `og:image` (or `twitter:image`)
//! meta tag. Non-HTML responses are not read. Every failure yields `None`.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Url;

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Only the document head matters; stop reading after this many bytes.
const MAX_BODY_BYTES: usize = 256 * 1024;

/// `<meta>` tags, matched case-insensitively.
static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\s[^>]*>").expect("valid regex"));

static PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:property|name)\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

static CONTENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)content\s*=\s*["']([^"']*)["']"#).expect("valid regex"));

const IMAGE_PROPERTIES: [&str; 3] = ["og:image", "og:image:url", "twitter:image"];

pub struct PreviewFetcher {
    client: reqwest::Client,
}

impl PreviewFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("artweeks-preview/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Thumbnail URL for the page at `url`, if one can be found.
    pub async fn thumbnail_for(&self, url: &str) -> Option<String> {
        let page_url = Url::parse(url).ok()?;
        if !matches!(page_url.scheme(), "http" | "https") {
            return None;
        }

        let html = match self.fetch_head(page_url.clone()).await {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(url, error = %e, "Preview fetch failed");
                return None;
            }
        };
        let found = extract_image(&html, &page_url);
        tracing::debug!(url, thumbnail = ?found, "Preview lookup finished");
        found
    }

    async fn fetch_head(&self, url: Url) -> Result<String, reqwest::Error> {
        let mut response = self.client.get(url).send().await?.error_for_status()?;
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("html"));
        if !is_html {
            return Ok(String::new());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() >= MAX_BODY_BYTES {
                body.truncate(MAX_BODY_BYTES);
                break;
            }
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// First image meta tag in `html`, resolved against `base` and limited to
/// http(s) URLs.
pub fn extract_image(html: &str, base: &Url) -> Option<String> {
    META_TAG_RE
        .find_iter(html)
        .filter_map(|tag| {
            let tag = tag.as_str();
            let property = PROPERTY_RE.captures(tag)?.get(1)?.as_str().to_ascii_lowercase();
            if !IMAGE_PROPERTIES.contains(&property.as_str()) {
                return None;
            }
            let content = CONTENT_RE.captures(tag)?.get(1)?.as_str().trim();
            let resolved = base.join(&decode_entities(content)).ok()?;
            matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
        })
        .next()
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}
