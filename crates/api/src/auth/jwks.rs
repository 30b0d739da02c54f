//! JWT verification against a (cached) JSON Web Key Set.
//!
//! Tokens are checked for signature, expiry, issuer, and audience. Keys are
//! looked up by the token's `kid`; the key set is cached for the configured
//! TTL and refetched early when a token names a key the cache does not hold
//! (key rotation), at most once per [`MIN_REFRESH_INTERVAL`].

use std::str::FromStr;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

/// Default key cache lifetime.
const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Unknown-`kid` refetches are throttled to one per this interval.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Claims read from a verified token. Issuer and audience are checked by
/// the validator and not kept.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Subject, e.g. `oauth2|discord|123456789012345678`.
    pub sub: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: u64,
}

/// Token verification settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
    pub algorithms: Vec<Algorithm>,
    pub cache_ttl_secs: u64,
}

impl AuthConfig {
    /// Load auth configuration from environment variables.
    ///
    /// Returns `None` when `AUTH_ISSUER` is unset; every caller is then
    /// anonymous.
    ///
    /// | Env Var               | Required            | Default                          |
    /// |-----------------------|---------------------|----------------------------------|
    /// | `AUTH_ISSUER`         | no                  | --                               |
    /// | `AUTH_AUDIENCE`       | with `AUTH_ISSUER`  | --                               |
    /// | `AUTH_JWKS_URL`       | no                  | `{issuer}/.well-known/jwks.json` |
    /// | `AUTH_ALGORITHMS`     | no                  | `RS256`                          |
    /// | `JWKS_CACHE_TTL_SECS` | no                  | `600`                            |
    ///
    /// # Panics
    ///
    /// Panics if `AUTH_AUDIENCE` is missing while `AUTH_ISSUER` is set, or if
    /// an algorithm name or the TTL cannot be parsed.
    pub fn from_env() -> Option<Self> {
        let issuer = std::env::var("AUTH_ISSUER").ok().filter(|v| !v.trim().is_empty())?;
        let audience = std::env::var("AUTH_AUDIENCE")
            .expect("AUTH_AUDIENCE must be set when AUTH_ISSUER is set");

        let jwks_url = std::env::var("AUTH_JWKS_URL")
            .unwrap_or_else(|_| default_jwks_url(&issuer));

        let algorithms = std::env::var("AUTH_ALGORITHMS")
            .unwrap_or_else(|_| "RS256".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|name| {
                Algorithm::from_str(name)
                    .unwrap_or_else(|_| panic!("Unknown algorithm '{name}' in AUTH_ALGORITHMS"))
            })
            .collect();

        let cache_ttl_secs: u64 = std::env::var("JWKS_CACHE_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_CACHE_TTL_SECS.to_string())
            .parse()
            .expect("JWKS_CACHE_TTL_SECS must be a valid u64");

        Some(Self {
            issuer,
            audience,
            jwks_url,
            algorithms,
            cache_ttl_secs,
        })
    }
}

fn default_jwks_url(issuer: &str) -> String {
    format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'))
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("Malformed token: {0}")]
    Malformed(jsonwebtoken::errors::Error),

    #[error("Algorithm {0:?} is not accepted")]
    Algorithm(Algorithm),

    #[error("No signing key matches kid {0:?}")]
    UnknownKey(Option<String>),

    #[error("Failed to fetch JWKS: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Unusable signing key: {0}")]
    Key(jsonwebtoken::errors::Error),

    #[error("Token rejected: {0}")]
    Token(jsonwebtoken::errors::Error),
}

enum KeySource {
    Remote { url: String, client: reqwest::Client },
    /// Fixed key set, never refetched.
    Static,
}

struct CachedKeys {
    set: JwkSet,
    fetched_at: Instant,
}

/// Verifies bearer tokens. Shared across requests behind an `Arc`.
pub struct JwksVerifier {
    source: KeySource,
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    ttl: Duration,
    cache: RwLock<Option<CachedKeys>>,
}

impl JwksVerifier {
    /// Verifier that fetches keys from `config.jwks_url`.
    pub fn new(config: &AuthConfig, client: reqwest::Client) -> Self {
        Self {
            source: KeySource::Remote {
                url: config.jwks_url.clone(),
                client,
            },
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            algorithms: config.algorithms.clone(),
            ttl: Duration::from_secs(config.cache_ttl_secs),
            cache: RwLock::new(None),
        }
    }

    /// Verifier over a fixed key set, e.g. symmetric `oct` keys for local
    /// setups and tests.
    pub fn from_jwk_set(
        set: JwkSet,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        algorithms: Vec<Algorithm>,
    ) -> Self {
        Self {
            source: KeySource::Static,
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms,
            ttl: Duration::MAX,
            cache: RwLock::new(Some(CachedKeys {
                set,
                fetched_at: Instant::now(),
            })),
        }
    }

    /// Verify `token` and return its claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let header = decode_header(token).map_err(VerifyError::Malformed)?;
        if !self.algorithms.contains(&header.alg) {
            return Err(VerifyError::Algorithm(header.alg));
        }

        let jwk = self.find_key(header.kid.as_deref()).await?;
        let key = DecodingKey::from_jwk(&jwk).map_err(VerifyError::Key)?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let data = decode::<Claims>(token, &key, &validation).map_err(VerifyError::Token)?;
        Ok(data.claims)
    }

    async fn find_key(&self, kid: Option<&str>) -> Result<Jwk, VerifyError> {
        let set = self.keys(false).await?;
        if let Some(jwk) = select_key(&set, kid) {
            return Ok(jwk);
        }
        let set = self.keys(true).await?;
        select_key(&set, kid).ok_or_else(|| VerifyError::UnknownKey(kid.map(str::to_string)))
    }

    /// Cached key set; refetched when stale or when `refresh` asks for it
    /// and the throttle allows.
    async fn keys(&self, refresh: bool) -> Result<JwkSet, VerifyError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                let age = cached.fetched_at.elapsed();
                let reuse = match self.source {
                    KeySource::Static => true,
                    KeySource::Remote { .. } if refresh => age < MIN_REFRESH_INTERVAL,
                    KeySource::Remote { .. } => age < self.ttl,
                };
                if reuse {
                    return Ok(cached.set.clone());
                }
            }
        }

        let KeySource::Remote { url, client } = &self.source else {
            return Ok(JwkSet { keys: Vec::new() });
        };
        let set: JwkSet = client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::debug!(keys = set.keys.len(), url = %url, "JWKS refreshed");

        *self.cache.write().await = Some(CachedKeys {
            set: set.clone(),
            fetched_at: Instant::now(),
        });
        Ok(set)
    }
}

/// Key named by `kid`; without a `kid`, the only key of a one-key set.
fn select_key(set: &JwkSet, kid: Option<&str>) -> Option<Jwk> {
    match kid {
        Some(kid) => set.find(kid).cloned(),
        None if set.keys.len() == 1 => set.keys.first().cloned(),
        None => None,
    }
}
