use std::collections::HashSet;

use artweeks_core::types::DiscordId;

use crate::auth::AuthConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Put the raw error text into `_original` of error responses.
    pub expose_error_details: bool,
    /// Discord ids with staff rights.
    pub staff_ids: HashSet<DiscordId>,
    /// Period of the background index rebuild; `0` disables it.
    pub reconcile_interval_secs: u64,
    /// JWT verification settings. `None` leaves every caller anonymous.
    pub auth: Option<AuthConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `EXPOSE_ERROR_DETAILS`    | `false`                 |
    /// | `STAFF_DISCORD_IDS`       | empty                   |
    /// | `RECONCILE_INTERVAL_SECS` | `0`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let expose_error_details = std::env::var("EXPOSE_ERROR_DETAILS")
            .map(|v| parse_bool(&v).expect("EXPOSE_ERROR_DETAILS must be true or false"))
            .unwrap_or(false);

        let staff_ids = split_list(&std::env::var("STAFF_DISCORD_IDS").unwrap_or_default())
            .into_iter()
            .collect();

        let reconcile_interval_secs: u64 = std::env::var("RECONCILE_INTERVAL_SECS")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .expect("RECONCILE_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            expose_error_details,
            staff_ids,
            reconcile_interval_secs,
            auth: AuthConfig::from_env(),
        }
    }

    pub fn is_staff(&self, discord_id: &str) -> bool {
        self.staff_ids.contains(discord_id)
    }
}

/// Comma-separated list with blanks dropped.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(split_list(" 1, ,2,"), vec!["1", "2"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn parse_bool_variants() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
