//! Runtime configuration.
//!
//! Everything environment-dependent (database path, provider endpoints, API
//! keys) is collected once into a `Config` and handed to the constructors that
//! need it. `.env` files are honoured via `dotenvy`.

use std::path::PathBuf;

use tracing::debug;

pub const DEFAULT_DB_PATH: &str = "yields.db";
pub const DEFAULT_FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
pub const DEFAULT_BOE_BASE_URL: &str =
    "https://www.bankofengland.co.uk/boeapps/database/_iadb-fromshowcolumns.asp";

#[derive(Debug, Clone, PartialEq)]
pub struct FredConfig {
    /// Required for ingestion only; queries never touch FRED.
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoeConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub fred: FredConfig,
    pub boe: BoeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            fred: FredConfig {
                api_key: None,
                base_url: DEFAULT_FRED_BASE_URL.to_string(),
            },
            boe: BoeConfig {
                base_url: DEFAULT_BOE_BASE_URL.to_string(),
            },
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read configuration from the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let config = Config {
            db_path: get("YC_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            fred: FredConfig {
                api_key: get("FRED_API_KEY"),
                base_url: get("FRED_BASE_URL").unwrap_or(defaults.fred.base_url),
            },
            boe: BoeConfig {
                base_url: get("BOE_BASE_URL").unwrap_or(defaults.boe.base_url),
            },
        };
        debug!(
            db_path = %config.db_path.display(),
            fred_key = config.fred.api_key.is_some(),
            "loaded configuration"
        );
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn environment_overrides_defaults() {
        let env: HashMap<&str, &str> = [
            ("YC_DB_PATH", "/var/lib/yc/yields.db"),
            ("FRED_API_KEY", "abc123"),
            ("BOE_BASE_URL", "http://localhost:9000/boe"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/var/lib/yc/yields.db"));
        assert_eq!(config.fred.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.fred.base_url, DEFAULT_FRED_BASE_URL);
        assert_eq!(config.boe.base_url, "http://localhost:9000/boe");
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = Config::from_lookup(|k| (k == "FRED_API_KEY").then(|| "  ".to_string()));
        assert_eq!(config.fred.api_key, None);
    }
}
