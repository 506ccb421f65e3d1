// src/config/mod.rs
// Runtime configuration loaded from the environment (and .env when present)

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct EcoConfig {
    // ── Database Configuration
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Server Configuration
    pub host: String,
    pub port: u16,
    pub request_timeout: u64,

    // ── CORS Settings
    pub cors_origin: String,

    // ── Session Configuration
    pub session_ttl_hours: i64,
    pub session_reap_interval: u64,
    pub cookie_secure: bool,

    // ── Identity Provider
    pub identity_secret: String,
    pub admin_emails: Vec<String>,

    // ── API Defaults
    pub page_default_limit: u32,
    pub page_max_limit: u32,

    // ── Logging Configuration
    pub log_level: String,
    pub log_format: String,
}

// A trailing comment starts at a '#' preceded by whitespace; a bare '#' is
// part of the value (secrets, URL fragments).
fn strip_comment(val: &str) -> &str {
    let bytes = val.as_bytes();
    let end = bytes
        .iter()
        .enumerate()
        .position(|(i, &b)| b == b'#' && i > 0 && bytes[i - 1].is_ascii_whitespace())
        .unwrap_or(bytes.len());
    val[..end].trim()
}

// Values may carry trailing comments and whitespace from .env files.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => {
            let clean_val = strip_comment(&val);
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        None => default,
    }
}

fn split_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

impl EcoConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` is this with
    /// `std::env::var`; tests pass a map instead.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let admin_raw: String = parse_or(&lookup, "ECO_ADMIN_EMAILS", String::new());

        Self {
            database_url: parse_or(&lookup, "DATABASE_URL", "sqlite:./ecoaware.db".to_string()),
            sqlite_max_connections: parse_or(&lookup, "SQLITE_MAX_CONNECTIONS", 10),
            host: parse_or(&lookup, "ECO_HOST", "0.0.0.0".to_string()),
            port: parse_or(&lookup, "ECO_PORT", 5000),
            request_timeout: parse_or(&lookup, "ECO_REQUEST_TIMEOUT", 30),
            cors_origin: parse_or(&lookup, "ECO_CORS_ORIGIN", "http://localhost:5173".to_string()),
            session_ttl_hours: parse_or(&lookup, "ECO_SESSION_TTL_HOURS", 168),
            session_reap_interval: parse_or(&lookup, "ECO_SESSION_REAP_INTERVAL", 3600),
            cookie_secure: parse_or(&lookup, "ECO_COOKIE_SECURE", false),
            identity_secret: parse_or(&lookup, "ECO_IDENTITY_SECRET", String::new()),
            admin_emails: split_emails(&admin_raw),
            page_default_limit: parse_or(&lookup, "ECO_PAGE_DEFAULT_LIMIT", 20),
            page_max_limit: parse_or(&lookup, "ECO_PAGE_MAX_LIMIT", 100),
            log_level: parse_or(&lookup, "ECO_LOG_LEVEL", "info".to_string()),
            log_format: parse_or(&lookup, "ECO_LOG_FORMAT", "pretty".to_string()),
        }
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_ttl_secs(&self) -> i64 {
        self.session_ttl_hours * 3600
    }

    pub fn is_admin_email(&self, email: Option<&str>) -> bool {
        match email {
            Some(email) => {
                let email = email.trim().to_lowercase();
                self.admin_emails.iter().any(|a| *a == email)
            }
            None => false,
        }
    }

    /// The identity callback is disabled until a shared secret is configured.
    pub fn identity_enabled(&self) -> bool {
        !self.identity_secret.is_empty()
    }

    pub fn clamp_limit(&self, requested: Option<u32>) -> u32 {
        let max = self.page_max_limit.max(1);
        requested.unwrap_or(self.page_default_limit).clamp(1, max)
    }

    pub fn is_json_logging(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

impl Default for EcoConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<EcoConfig> = Lazy::new(EcoConfig::from_env);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> EcoConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EcoConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = EcoConfig::default();

        assert_eq!(config.port, 5000);
        assert_eq!(config.page_default_limit, 20);
        assert!(!config.identity_enabled());
        assert!(config.admin_emails.is_empty());
        assert_eq!(config.session_ttl_secs(), 168 * 3600);
    }

    #[test]
    fn test_values_with_comments() {
        let config = config_with(&[("ECO_PORT", "8080   # dev port"), ("ECO_COOKIE_SECURE", " true ")]);

        assert_eq!(config.port, 8080);
        assert!(config.cookie_secure);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_hash_inside_value_is_kept() {
        let config = config_with(&[
            ("ECO_IDENTITY_SECRET", "abc#longer-secret-part"),
            ("ECO_CORS_ORIGIN", "https://eco.example.org/#app  # frontend"),
            ("DATABASE_URL", "sqlite:./eco#1.db"),
        ]);

        assert_eq!(config.identity_secret, "abc#longer-secret-part");
        assert_eq!(config.cors_origin, "https://eco.example.org/#app");
        assert_eq!(config.database_url, "sqlite:./eco#1.db");
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("30          # seconds"), "30");
        assert_eq!(strip_comment("a#b"), "a#b");
        assert_eq!(strip_comment("#leading"), "#leading");
        assert_eq!(strip_comment("x\t# tab comment"), "x");
        assert_eq!(strip_comment("   "), "");
    }

    #[test]
    fn test_parse_failure_falls_back() {
        let config = config_with(&[("ECO_PORT", "not-a-port")]);
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn test_admin_emails() {
        let config = config_with(&[("ECO_ADMIN_EMAILS", "Admin@Example.org, ,ops@example.org")]);

        assert_eq!(config.admin_emails.len(), 2);
        assert!(config.is_admin_email(Some("admin@example.org")));
        assert!(config.is_admin_email(Some(" OPS@example.org")));
        assert!(!config.is_admin_email(Some("someone@example.org")));
        assert!(!config.is_admin_email(None));
    }

    #[test]
    fn test_clamp_limit() {
        let config = config_with(&[("ECO_PAGE_MAX_LIMIT", "50")]);

        assert_eq!(config.clamp_limit(None), 20);
        assert_eq!(config.clamp_limit(Some(0)), 1);
        assert_eq!(config.clamp_limit(Some(500)), 50);
        assert_eq!(config.clamp_limit(Some(7)), 7);
    }
}
