use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const ENV_PREFIX: &str = "CERTVERIFY_";

/// Process configuration. Defaults are overlaid by `CERTVERIFY_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// sqlx SQLite URL, e.g. `sqlite:certificates.db`. Required.
    pub database_url: String,
    pub listen_addr: String,
    pub loglevel: String,
    /// Origins allowed to make credentialed cross-origin requests.
    pub allowed_origins: Vec<String>,
    /// Also match the verify query against `iqama`.
    pub match_iqama: bool,
    pub store_timeout_secs: u64,
    /// JSON file or directory of certificates inserted at startup.
    pub seed_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            match_iqama: true,
            store_timeout_secs: 5,
            seed_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        self.origins()?;
        Ok(())
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Allowed origins reduced to `scheme://host[:port]`.
    pub fn origins(&self) -> Result<Vec<String>, ConfigError> {
        self.allowed_origins
            .iter()
            .map(|raw| normalize_origin(raw).ok_or_else(|| ConfigError::InvalidOrigin(raw.clone())))
            .collect()
    }
}

/// Reduce a URL to its ASCII origin. Returns `None` for opaque origins like `file:`.
pub fn normalize_origin(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    #[test]
    fn database_url_is_required() {
        let err = Config::from_figment(figment()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDatabaseUrl));
    }

    #[test]
    fn overrides_merge_over_defaults() {
        let cfg = Config::from_figment(
            figment()
                .merge(Serialized::default("database_url", "sqlite::memory:"))
                .merge(Serialized::default("match_iqama", false)),
        )
        .unwrap();
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert!(!cfg.match_iqama);
        assert_eq!(cfg.store_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn origins_drop_paths_and_default_ports() {
        assert_eq!(
            normalize_origin("https://standerarabia.vercel.app/verification").as_deref(),
            Some("https://standerarabia.vercel.app")
        );
        assert_eq!(
            normalize_origin("https://example.com:443/").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            normalize_origin("http://localhost:3000").as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(normalize_origin("not a url"), None);
    }

    #[test]
    fn invalid_origin_fails_validation() {
        let err = Config::from_figment(
            figment()
                .merge(Serialized::default("database_url", "sqlite::memory:"))
                .merge(Serialized::default("allowed_origins", vec!["nope"])),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOrigin(o) if o == "nope"));
    }
}
