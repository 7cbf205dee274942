use crate::config::{EndpointProfile, EndpointProfiles, HostMarkers};
use crate::utils::error::{Result, YardError};
use crate::utils::validation::{validate_range, validate_resolved_secret, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YardConfig {
    pub profiles: ProfilesConfig,
    pub hosts: Option<HostMarkers>,
    pub http: Option<HttpConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilesConfig {
    pub development: EndpointProfile,
    pub production: EndpointProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
}

impl YardConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(YardError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| YardError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 沒有設定檔時，從 YARD_* 環境變數組出兩組端點
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            std::env::var(name).map_err(|_| YardError::MissingConfigError {
                field: name.to_string(),
            })
        };

        Ok(Self {
            profiles: ProfilesConfig {
                development: EndpointProfile {
                    url: required("YARD_DEV_URL")?,
                    key: required("YARD_DEV_KEY")?,
                },
                production: EndpointProfile {
                    url: required("YARD_PROD_URL")?,
                    key: required("YARD_PROD_KEY")?,
                },
            },
            hosts: None,
            http: None,
        })
    }

    /// 替換環境變數 (例如 ${YARD_DEV_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| YardError::ConfigError {
            message: format!("Invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.http
            .as_ref()
            .and_then(|http| http.timeout_seconds)
            .map(Duration::from_secs)
    }

    pub fn into_profiles(self) -> EndpointProfiles {
        let request_timeout = self.request_timeout();
        EndpointProfiles {
            development: self.profiles.development,
            production: self.profiles.production,
            hosts: self.hosts.unwrap_or_default(),
            request_timeout,
        }
    }
}

impl Validate for YardConfig {
    fn validate(&self) -> Result<()> {
        validate_url("profiles.development.url", &self.profiles.development.url)?;
        validate_resolved_secret("profiles.development.key", &self.profiles.development.key)?;
        validate_url("profiles.production.url", &self.profiles.production.url)?;
        validate_resolved_secret("profiles.production.key", &self.profiles.production.key)?;

        if let Some(timeout) = self.http.as_ref().and_then(|http| http.timeout_seconds) {
            validate_range("http.timeout_seconds", timeout, 1, 300)?;
        }

        Ok(())
    }
}
