//! Presigned upload URLs.
//!
//! The API never proxies file bodies: it hands the browser a short-lived
//! presigned `PUT` URL plus the public URL the object will be served from.
//! Objects are keyed `uploads/{discordId}/{uuid}-{sanitized filename}`.

use std::collections::BTreeMap;
use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::presigning::PresigningConfig;
use serde::Serialize;

/// Default presigned URL lifetime.
const DEFAULT_EXPIRY_SECS: u64 = 900;

/// Longest sanitized filename kept in the object key.
const MAX_FILENAME_CHARS: usize = 100;

/// Accepted MIME type families.
const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/", "video/", "audio/"];

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Unsupported content type '{0}'. Must be an image, video, or audio type")]
    ContentType(String),

    #[error("Failed to presign upload: {0}")]
    Presign(String),
}

/// S3 settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible stores (R2, MinIO). Enables
    /// path-style addressing.
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Base URL objects are served from, e.g. a CDN domain.
    pub public_url_base: Option<String>,
    pub expiry_secs: u64,
}

impl S3Config {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` when `S3_BUCKET` is unset: uploads are then disabled
    /// and `POST /upload` answers 503.
    ///
    /// | Env Var                  | Default              |
    /// |--------------------------|----------------------|
    /// | `S3_BUCKET`              | unset (disabled)     |
    /// | `S3_REGION`              | `us-east-1`          |
    /// | `S3_ENDPOINT`            | AWS                  |
    /// | `S3_ACCESS_KEY_ID`       | default chain        |
    /// | `S3_SECRET_ACCESS_KEY`   | default chain        |
    /// | `S3_PUBLIC_URL_BASE`     | derived from bucket  |
    /// | `UPLOAD_URL_EXPIRY_SECS` | `900`                |
    ///
    /// # Panics
    ///
    /// Panics if `UPLOAD_URL_EXPIRY_SECS` is set but not a valid `u64`.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let bucket = var("S3_BUCKET")?;

        let expiry_secs: u64 = var("UPLOAD_URL_EXPIRY_SECS")
            .map(|v| v.parse().expect("UPLOAD_URL_EXPIRY_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_EXPIRY_SECS);

        Some(Self {
            bucket,
            region: var("S3_REGION").unwrap_or_else(|| "us-east-1".into()),
            endpoint: var("S3_ENDPOINT"),
            access_key_id: var("S3_ACCESS_KEY_ID"),
            secret_access_key: var("S3_SECRET_ACCESS_KEY"),
            public_url_base: var("S3_PUBLIC_URL_BASE"),
            expiry_secs,
        })
    }

    /// Public URL of an object key.
    pub fn public_url(&self, key: &str) -> String {
        match (&self.public_url_base, &self.endpoint) {
            (Some(base), _) => format!("{}/{key}", base.trim_end_matches('/')),
            (None, Some(endpoint)) => {
                format!("{}/{}/{key}", endpoint.trim_end_matches('/'), self.bucket)
            }
            (None, None) => format!("https://{}.s3.{}.amazonaws.com/{key}", self.bucket, self.region),
        }
    }
}

/// What the client needs to perform the upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub method: &'static str,
    pub upload_url: String,
    /// Headers the client must send with the `PUT`.
    pub headers: BTreeMap<String, String>,
    pub key: String,
    pub public_url: String,
    pub expires_in_secs: u64,
}

/// Signs upload URLs against one bucket.
pub struct UploadSigner {
    client: aws_sdk_s3::Client,
    config: S3Config,
}

impl UploadSigner {
    /// Build the S3 client. Static keys are used when both are configured,
    /// otherwise the default AWS credential chain.
    pub async fn new(config: S3Config) -> Self {
        let region = Region::new(config.region.clone());
        let mut builder = match (&config.access_key_id, &config.secret_access_key) {
            (Some(key_id), Some(secret)) => aws_sdk_s3::config::Builder::new()
                .behavior_version(BehaviorVersion::latest())
                .region(region)
                .credentials_provider(Credentials::new(
                    key_id.clone(),
                    secret.clone(),
                    None,
                    None,
                    "artweeks-env",
                )),
            _ => {
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                aws_sdk_s3::config::Builder::from(&shared)
            }
        };
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(
            bucket = %config.bucket,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "Upload signer configured"
        );
        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            config,
        }
    }

    /// Presign a `PUT` for a new object owned by `discord_id`.
    pub async fn presign_put(
        &self,
        discord_id: &str,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadTicket, UploadError> {
        check_content_type(content_type)?;
        let key = object_key(discord_id, filename);

        let presigning = PresigningConfig::expires_in(Duration::from_secs(self.config.expiry_secs))
            .map_err(|e| UploadError::Presign(e.to_string()))?;
        let request = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| UploadError::Presign(e.to_string()))?;

        let headers = request
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Ok(UploadTicket {
            method: "PUT",
            upload_url: request.uri().to_string(),
            headers,
            public_url: self.config.public_url(&key),
            key,
            expires_in_secs: self.config.expiry_secs,
        })
    }
}

pub fn check_content_type(content_type: &str) -> Result<(), UploadError> {
    let lower = content_type.trim().to_ascii_lowercase();
    let family_ok = ALLOWED_CONTENT_TYPES
        .iter()
        .any(|prefix| lower.starts_with(prefix) && lower.len() > prefix.len());
    if family_ok {
        Ok(())
    } else {
        Err(UploadError::ContentType(content_type.to_string()))
    }
}

/// `uploads/{discordId}/{uuid}-{sanitized filename}`.
pub fn object_key(discord_id: &str, filename: &str) -> String {
    format!(
        "uploads/{}/{}-{}",
        sanitize_filename(discord_id),
        uuid::Uuid::new_v4(),
        sanitize_filename(filename)
    )
}

/// Keep `[A-Za-z0-9._-]`, collapse everything else into single dashes.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed: String = out
        .trim_matches(|c| c == '-' || c == '.')
        .chars()
        .take(MAX_FILENAME_CHARS)
        .collect();
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> S3Config {
        S3Config {
            bucket: "art".into(),
            region: "auto".into(),
            endpoint: Some("https://storage.example".into()),
            access_key_id: Some("AKIDEXAMPLE".into()),
            secret_access_key: Some("secret".into()),
            public_url_base: None,
            expiry_secs: 600,
        }
    }

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("my cool art!!.png"), "my-cool-art-.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc-passwd");
        assert_eq!(sanitize_filename("日本"), "file");
    }

    #[test]
    fn object_key_is_scoped_to_artist() {
        let key = object_key("1234", "a b.png");
        assert!(key.starts_with("uploads/1234/"), "{key}");
        assert!(key.ends_with("-a-b.png"), "{key}");
    }

    #[test]
    fn content_type_families() {
        assert!(check_content_type("image/png").is_ok());
        assert!(check_content_type("video/mp4").is_ok());
        assert!(check_content_type("Audio/MPEG").is_ok());
        assert!(check_content_type("image/").is_err());
        assert!(check_content_type("application/pdf").is_err());
    }

    #[test]
    fn public_url_variants() {
        let mut c = config();
        assert_eq!(c.public_url("k"), "https://storage.example/art/k");
        c.public_url_base = Some("https://cdn.example/".into());
        assert_eq!(c.public_url("k"), "https://cdn.example/k");
        c.public_url_base = None;
        c.endpoint = None;
        c.region = "eu-west-1".into();
        assert_eq!(c.public_url("k"), "https://art.s3.eu-west-1.amazonaws.com/k");
    }

    #[tokio::test]
    async fn presign_put_signs_path_style_url() {
        let signer = UploadSigner::new(config()).await;
        let ticket = signer.presign_put("1234", "a.png", "image/png").await.unwrap();

        assert_eq!(ticket.method, "PUT");
        assert!(
            ticket.upload_url.starts_with("https://storage.example/art/uploads/1234/"),
            "{}",
            ticket.upload_url
        );
        assert!(ticket.upload_url.contains("X-Amz-Signature="));
        assert!(ticket.public_url.starts_with("https://storage.example/art/uploads/1234/"));
        assert_eq!(ticket.expires_in_secs, 600);
    }

    #[tokio::test]
    async fn presign_rejects_documents() {
        let signer = UploadSigner::new(config()).await;
        let err = signer.presign_put("1", "a.pdf", "application/pdf").await;
        assert!(matches!(err, Err(UploadError::ContentType(_))));
    }
}
