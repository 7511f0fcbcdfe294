//! Client configuration

use serde::{Deserialize, Serialize};

/// Configuration for the CLI client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the HTTP API
    pub api_base: String,

    /// Base URL of the push channel
    pub ws_base: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080".to_string(),
            ws_base: "ws://localhost:8080".to_string(),
        }
    }
}

impl ClientConfig {
    /// Derive both base URLs from one `host:port`.
    pub fn for_server(address: &str) -> Self {
        Self {
            api_base: format!("http://{}", address),
            ws_base: format!("ws://{}", address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_server_builds_both_schemes() {
        let config = ClientConfig::for_server("example.com:9000");
        assert_eq!(config.api_base, "http://example.com:9000");
        assert_eq!(config.ws_base, "ws://example.com:9000");
    }
}
