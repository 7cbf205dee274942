#[cfg(feature = "cli")]
pub mod cli;
pub mod lambda;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_resolved_secret, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_DEV_HOSTS: [&str; 3] = ["lrs-2-dev.vercel.app", "localhost", "127.0.0.1"];
pub const DEFAULT_PROD_HOSTS: [&str; 1] = ["lorry-bay-system.vercel.app"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("DEV"),
            Environment::Production => f.write_str("PROD"),
        }
    }
}

/// Substring allowlists used to classify a host name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMarkers {
    pub development: Vec<String>,
    pub production: Vec<String>,
}

impl Default for HostMarkers {
    fn default() -> Self {
        Self {
            development: DEFAULT_DEV_HOSTS.iter().map(|h| h.to_string()).collect(),
            production: DEFAULT_PROD_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl HostMarkers {
    /// 開發清單優先，兩者都不符合時回到開發環境
    pub fn classify(&self, host: &str) -> Environment {
        let host = host.to_lowercase();
        let matches = |markers: &[String]| {
            markers
                .iter()
                .any(|marker| host.contains(&marker.to_lowercase()))
        };

        if matches(&self.development) {
            Environment::Development
        } else if matches(&self.production) {
            Environment::Production
        } else {
            Environment::Development
        }
    }
}

pub fn resolve_environment(host: &str) -> Environment {
    HostMarkers::default().classify(host)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointProfile {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct EndpointProfiles {
    pub development: EndpointProfile,
    pub production: EndpointProfile,
    pub hosts: HostMarkers,
    pub request_timeout: Option<Duration>,
}

impl EndpointProfiles {
    pub fn resolve(&self, host: &str) -> ResolvedConfig {
        let environment = self.hosts.classify(host);
        let profile = match environment {
            Environment::Development => &self.development,
            Environment::Production => &self.production,
        };

        tracing::info!("Environment: {}", environment);
        ResolvedConfig {
            environment,
            endpoint_url: profile.url.clone(),
            api_key: profile.key.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

/// The profile selected for this process. Passed by value to whatever needs it.
#[derive(Clone)]
pub struct ResolvedConfig {
    pub environment: Environment,
    pub endpoint_url: String,
    pub api_key: String,
    pub request_timeout: Option<Duration>,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("environment", &self.environment)
            .field("endpoint_url", &self.endpoint_url)
            .field("api_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ConfigProvider for ResolvedConfig {
    fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

impl Validate for ResolvedConfig {
    fn validate(&self) -> Result<()> {
        validate_url("endpoint_url", &self.endpoint_url)?;
        validate_resolved_secret("api_key", &self.api_key)?;
        tracing::debug!("✅ {} profile validation passed", self.environment);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles() -> EndpointProfiles {
        EndpointProfiles {
            development: EndpointProfile {
                url: "https://dev.example.co".to_string(),
                key: "dev-key".to_string(),
            },
            production: EndpointProfile {
                url: "https://prod.example.co".to_string(),
                key: "prod-key".to_string(),
            },
            hosts: HostMarkers::default(),
            request_timeout: None,
        }
    }

    #[test]
    fn test_development_hosts() {
        for host in [
            "localhost",
            "127.0.0.1",
            "lrs-2-dev.vercel.app",
            "LOCALHOST",
            "preview.lrs-2-dev.vercel.app",
        ] {
            assert_eq!(resolve_environment(host), Environment::Development, "{}", host);
        }
    }

    #[test]
    fn test_production_host() {
        assert_eq!(
            resolve_environment("lorry-bay-system.vercel.app"),
            Environment::Production
        );
        assert_eq!(
            resolve_environment("Lorry-Bay-System.Vercel.App"),
            Environment::Production
        );
    }

    #[test]
    fn test_unknown_host_defaults_to_development() {
        assert_eq!(resolve_environment("example.com"), Environment::Development);
        assert_eq!(resolve_environment(""), Environment::Development);
    }

    #[test]
    fn test_development_marker_wins_over_production() {
        // 兩份清單同時符合時取開發環境
        assert_eq!(
            resolve_environment("lorry-bay-system.vercel.app.localhost"),
            Environment::Development
        );
    }

    #[test]
    fn test_resolve_selects_profile() {
        let resolved = profiles().resolve("lorry-bay-system.vercel.app");
        assert_eq!(resolved.environment, Environment::Production);
        assert_eq!(resolved.endpoint_url(), "https://prod.example.co");
        assert_eq!(resolved.api_key(), "prod-key");

        let resolved = profiles().resolve("localhost:8080");
        assert_eq!(resolved.environment, Environment::Development);
        assert_eq!(resolved.api_key(), "dev-key");
    }

    #[test]
    fn test_debug_redacts_key() {
        let resolved = profiles().resolve("localhost");
        assert!(!format!("{:?}", resolved).contains("dev-key"));
    }
}
