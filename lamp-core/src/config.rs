use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::error::LampError;

/// Base URL used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Path of the decision endpoint, relative to the base URL.
pub const CONTROL_LAMP_PATH: &str = "/api/control_lamp";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "http://lamp-gateway.local:5000"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Scheme, host and port of the lamp service, e.g. "http://127.0.0.1:5000".
    pub base_url: Option<String>,
}

impl Config {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: Some(base_url.into()) }
    }

    /// Configured base URL, or [`DEFAULT_BASE_URL`].
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Full URL of `POST /api/control_lamp` for this configuration.
    pub fn endpoint(&self) -> crate::Result<Url> {
        endpoint_for(self.base_url())
    }

    /// Store a base URL after checking that it yields a usable endpoint.
    pub fn set_base_url(&mut self, base_url: &str) -> crate::Result<()> {
        let trimmed = base_url.trim();
        endpoint_for(trimmed)?;
        self.base_url = Some(trimmed.trim_end_matches('/').to_string());
        Ok(())
    }

    /// Load config from the platform config dir, or return the default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Save config to the platform config dir.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Write config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "street-lamp", "lamp-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn endpoint_for(base_url: &str) -> crate::Result<Url> {
    let invalid = |reason: String| LampError::Config { url: base_url.to_string(), reason };

    let mut url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("base URL must not carry a query or fragment".to_string()));
    }

    url.path_segments_mut()
        .map_err(|_| invalid("URL cannot be used as a base".to_string()))?
        .pop_if_empty()
        .extend(CONTROL_LAMP_PATH.trim_start_matches('/').split('/'));

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_is_local_service() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(
            cfg.endpoint().unwrap().as_str(),
            "http://127.0.0.1:5000/api/control_lamp"
        );
    }

    #[test]
    fn configured_base_url_keeps_its_path_prefix() {
        let cfg = Config::with_base_url("https://gateway.example/lamps/");
        assert_eq!(
            cfg.endpoint().unwrap().as_str(),
            "https://gateway.example/lamps/api/control_lamp"
        );
    }

    #[test]
    fn set_base_url_rejects_garbage() {
        let mut cfg = Config::default();

        let err = cfg.set_base_url("not a url").unwrap_err();
        assert!(matches!(err, LampError::Config { .. }));

        let err = cfg.set_base_url("ftp://127.0.0.1").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn base_url_with_query_or_fragment_is_rejected() {
        let err = Config::with_base_url("http://h:5000?x=1").endpoint().unwrap_err();
        assert!(err.to_string().contains("query or fragment"));

        let err = Config::with_base_url("http://h:5000/#top").endpoint().unwrap_err();
        assert!(matches!(err, LampError::Config { .. }));

        let mut cfg = Config::default();
        assert!(cfg.set_base_url("http://h:5000/?x=1").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_base_url_trims_trailing_slash() {
        let mut cfg = Config::default();
        cfg.set_base_url(" http://10.0.0.7:5000/ ").unwrap();
        assert_eq!(cfg.base_url(), "http://10.0.0.7:5000");
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_from_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config::with_base_url("http://192.168.1.20:5000");
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn unparsable_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
