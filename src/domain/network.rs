//! Network selection and endpoint resolution

use serde::Deserialize;

use super::error::{ExplorerError, ExplorerResult};

pub const DEFAULT_MAINNET_URL: &str = "https://lb.libre.org";
pub const DEFAULT_TESTNET_URL: &str = "https://testnet.libre.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Custom,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Custom];

    pub fn slug(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Custom => "custom",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Network::Mainnet => "Mainnet",
            Network::Testnet => "Testnet",
            Network::Custom => "Custom",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Some(Network::Mainnet),
            "testnet" | "test" => Some(Network::Testnet),
            "custom" => Some(Network::Custom),
            _ => None,
        }
    }
}

/// Well-known hosts for the fixed networks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownHosts {
    pub mainnet: String,
    pub testnet: String,
}

impl Default for KnownHosts {
    fn default() -> Self {
        Self {
            mainnet: DEFAULT_MAINNET_URL.to_string(),
            testnet: DEFAULT_TESTNET_URL.to_string(),
        }
    }
}

impl KnownHosts {
    /// Resolve the API base URL for a network.
    ///
    /// `custom` must be non-empty for [`Network::Custom`].
    pub fn resolve(&self, network: Network, custom: Option<&str>) -> ExplorerResult<String> {
        match network {
            Network::Mainnet => Ok(normalize_endpoint(&self.mainnet)),
            Network::Testnet => Ok(normalize_endpoint(&self.testnet)),
            Network::Custom => {
                let raw = custom.map(str::trim).unwrap_or_default();
                if raw.is_empty() {
                    return Err(ExplorerError::InvalidEndpoint(
                        "custom network requires a URL".to_string(),
                    ));
                }
                let normalized = normalize_endpoint(raw);
                let host = normalized.split_once("://").map(|(_, host)| host);
                if host.map_or(true, str::is_empty) {
                    return Err(ExplorerError::InvalidEndpoint(raw.to_string()));
                }
                Ok(normalized)
            }
        }
    }
}

/// Add `https://` when no scheme is given and strip trailing slashes
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    with_scheme.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_networks() {
        let hosts = KnownHosts::default();
        assert_eq!(
            hosts.resolve(Network::Mainnet, None).unwrap(),
            DEFAULT_MAINNET_URL
        );
        assert_eq!(
            hosts.resolve(Network::Testnet, Some("ignored")).unwrap(),
            DEFAULT_TESTNET_URL
        );
    }

    #[test]
    fn test_custom_endpoint_normalization() {
        let hosts = KnownHosts::default();
        assert_eq!(
            hosts.resolve(Network::Custom, Some("node.example.com/")).unwrap(),
            "https://node.example.com"
        );
        assert_eq!(
            hosts
                .resolve(Network::Custom, Some("http://127.0.0.1:8888//"))
                .unwrap(),
            "http://127.0.0.1:8888"
        );
    }

    #[test]
    fn test_custom_endpoint_required() {
        let hosts = KnownHosts::default();
        assert!(matches!(
            hosts.resolve(Network::Custom, Some("   ")),
            Err(ExplorerError::InvalidEndpoint(_))
        ));
        assert!(hosts.resolve(Network::Custom, None).is_err());
        assert!(hosts.resolve(Network::Custom, Some("https://")).is_err());
    }

    #[test]
    fn test_network_slugs() {
        for network in Network::ALL {
            assert_eq!(Network::from_slug(network.slug()), Some(network));
        }
        assert_eq!(Network::from_slug("MAIN"), Some(Network::Mainnet));
        assert_eq!(Network::from_slug("devnet"), None);
    }
}
