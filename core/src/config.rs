//! Backend address configuration.
//!
//! All candidate URLs, timeouts and the explicit override live here and are
//! handed to `BackendLocator` as one value.

use std::env;
use std::time::Duration;

use tracing::warn;

// ── Environment keys ────────────────────────────────────────────────────

pub const ENV_API_URL: &str = "CUREAT_API_URL";
pub const ENV_PROFILE: &str = "CUREAT_PROFILE";
pub const ENV_CANDIDATE_URLS: &str = "CUREAT_CANDIDATE_URLS";
pub const ENV_PROBE_TIMEOUT_MS: &str = "CUREAT_PROBE_TIMEOUT_MS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "CUREAT_REQUEST_TIMEOUT_MS";

// ── Defaults ────────────────────────────────────────────────────────────

/// Probed in this order; the first healthy one wins.
const DEFAULT_CANDIDATES: &[&str] = &[
    "http://192.168.45.20:8000",
    "http://127.0.0.1:8000",
    "http://localhost:8000",
    "http://192.168.1.20:8000",
    "http://10.0.0.20:8000",
];

const DEV_DEFAULT_URL: &str = "http://192.168.45.20:8000";
const PROD_DEFAULT_URL: &str = "https://cureat.onrender.com";

const DEFAULT_HEALTH_PATH: &str = "/health";
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Which hardcoded fallback applies when nothing else resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Development,
    Production,
}

impl Profile {
    pub fn default_url(&self) -> &'static str {
        match self {
            Profile::Development => DEV_DEFAULT_URL,
            Profile::Production => PROD_DEFAULT_URL,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "dev" | "development" => Some(Profile::Development),
            "prod" | "production" => Some(Profile::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Used verbatim when set; disables probing.
    pub explicit_url: Option<String>,
    pub candidates: Vec<String>,
    pub default_url: String,
    pub health_path: String,
    pub probe_timeout: Duration,
    pub request_timeout: Duration,
}

impl BackendConfig {
    /// Built-in settings for `profile` with no explicit override.
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            explicit_url: None,
            candidates: DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            default_url: profile.default_url().to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Settings pointing straight at `url`, as tests and tools use.
    pub fn explicit(url: &str) -> Self {
        Self {
            explicit_url: Some(url.to_string()),
            ..Self::for_profile(Profile::Development)
        }
    }

    /// Read settings from the process environment, loading `.env` first if
    /// one exists.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let profile = match env::var(ENV_PROFILE) {
            Ok(raw) => Profile::parse(&raw).unwrap_or_else(|| {
                warn!(key = ENV_PROFILE, value = %raw, "unknown profile, using development");
                Profile::Development
            }),
            Err(_) => Profile::Development,
        };

        let mut config = Self::for_profile(profile);
        config.explicit_url = env_string(ENV_API_URL);
        if let Some(list) = env_string(ENV_CANDIDATE_URLS) {
            config.candidates = parse_candidates(&list);
        }
        config.probe_timeout = Duration::from_millis(env_u64(ENV_PROBE_TIMEOUT_MS, DEFAULT_PROBE_TIMEOUT_MS));
        config.request_timeout =
            Duration::from_millis(env_u64(ENV_REQUEST_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS));
        config
    }
}

fn parse_candidates(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_string(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => Some(val.trim().to_string()),
        _ => None,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(val) => val.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %val, default, "invalid number, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_defaults_differ() {
        assert_eq!(
            BackendConfig::for_profile(Profile::Development).default_url,
            "http://192.168.45.20:8000"
        );
        assert_eq!(
            BackendConfig::for_profile(Profile::Production).default_url,
            "https://cureat.onrender.com"
        );
    }

    #[test]
    fn built_in_candidates_keep_declared_order() {
        let config = BackendConfig::for_profile(Profile::Development);
        assert_eq!(config.candidates.len(), 5);
        assert_eq!(config.candidates[0], "http://192.168.45.20:8000");
        assert_eq!(config.candidates[1], "http://127.0.0.1:8000");
        assert_eq!(config.explicit_url, None);
        assert_eq!(config.probe_timeout, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn candidate_list_parsing_skips_blanks() {
        assert_eq!(
            parse_candidates(" http://a:1 ,, http://b:2 ,"),
            vec!["http://a:1".to_string(), "http://b:2".to_string()]
        );
    }

    #[test]
    fn profile_parsing() {
        assert_eq!(Profile::parse("Production"), Some(Profile::Production));
        assert_eq!(Profile::parse(" dev "), Some(Profile::Development));
        assert_eq!(Profile::parse("staging"), None);
    }

    #[test]
    fn explicit_config_keeps_url() {
        let config = BackendConfig::explicit("http://10.1.1.1:9000");
        assert_eq!(config.explicit_url.as_deref(), Some("http://10.1.1.1:9000"));
    }
}
