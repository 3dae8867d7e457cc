use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::abi::DEFAULT_SIGNER_CLI;
use crate::domain::network::{KnownHosts, Network, DEFAULT_MAINNET_URL, DEFAULT_TESTNET_URL};
use crate::domain::session::SessionSettings;
use crate::domain::table::{BrowseLimits, DEFAULT_PAGE_LIMIT, DEFAULT_SCOPE_LIMIT};
use crate::infrastructure::chain::DEFAULT_REQUEST_TIMEOUT_MS;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mainnet_url: String,
    pub testnet_url: String,
    pub default_network: Network,
    /// Used when `default_network = "custom"` and no endpoint is given on the command line
    pub custom_url: Option<String>,
    pub page_limit: u32,
    pub scope_limit: u32,
    pub request_timeout_ms: u64,
    /// Binary named in generated commands
    pub signer_cli: String,
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mainnet_url: DEFAULT_MAINNET_URL.to_string(),
            testnet_url: DEFAULT_TESTNET_URL.to_string(),
            default_network: Network::Mainnet,
            custom_url: None,
            page_limit: DEFAULT_PAGE_LIMIT,
            scope_limit: DEFAULT_SCOPE_LIMIT,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            signer_cli: DEFAULT_SIGNER_CLI.to_string(),
            history_limit: 50,
        }
    }
}

impl Config {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            hosts: KnownHosts {
                mainnet: self.mainnet_url.clone(),
                testnet: self.testnet_url.clone(),
            },
            limits: BrowseLimits {
                page_limit: self.page_limit.max(1),
                scope_limit: self.scope_limit.max(1),
            },
            signer_cli: if self.signer_cli.trim().is_empty() {
                DEFAULT_SIGNER_CLI.to_string()
            } else {
                self.signer_cli.trim().to_string()
            },
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    parse(&content)
}

/// Invalid files fall back to defaults
pub fn parse(content: &str) -> Config {
    match toml::from_str::<Config>(content) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("ignoring invalid config: {}", err);
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("TABLESCOPE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("tablescope").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("tablescope").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "tablescope", "tablescope")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("tablescope"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("tablescope"));
    }
    directories::ProjectDirs::from("io", "tablescope", "tablescope")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn history_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("history.sqlite3"))
}

pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("tablescope.log"))
}

pub fn exports_dir() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("exports"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse(
            r#"
            default_network = "testnet"
            page_limit = 50
            signer_cli = "clio"
            "#,
        );
        assert_eq!(config.default_network, Network::Testnet);
        assert_eq!(config.page_limit, 50);
        assert_eq!(config.scope_limit, DEFAULT_SCOPE_LIMIT);
        assert_eq!(config.mainnet_url, DEFAULT_MAINNET_URL);

        let settings = config.session_settings();
        assert_eq!(settings.limits.page_limit, 50);
        assert_eq!(settings.signer_cli, "clio");
    }

    #[test]
    fn test_invalid_file_falls_back() {
        assert_eq!(parse("page_limit = \"lots\""), Config::default());
    }

    #[test]
    fn test_zero_limits_are_clamped() {
        let config = parse("page_limit = 0\nrequest_timeout_ms = 0");
        assert_eq!(config.session_settings().limits.page_limit, 1);
        assert_eq!(config.request_timeout(), Duration::from_millis(1));
    }
}
