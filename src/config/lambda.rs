use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, YardError};
use crate::utils::validation::{validate_resolved_secret, validate_url, Validate};
use std::env;
use std::time::Duration;

/// Settings of the scheduled sweep function, read from its environment.
#[derive(Clone)]
pub struct LambdaConfig {
    pub endpoint_url: String,
    pub service_role_key: String,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            endpoint_url: env::var("SUPABASE_URL").map_err(|_| YardError::ConfigError {
                message: "SUPABASE_URL environment variable is required".to_string(),
            })?,
            service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY").map_err(|_| {
                YardError::ConfigError {
                    message: "SUPABASE_SERVICE_ROLE_KEY environment variable is required"
                        .to_string(),
                }
            })?,
        })
    }
}

impl ConfigProvider for LambdaConfig {
    fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    fn api_key(&self) -> &str {
        &self.service_role_key
    }

    fn request_timeout(&self) -> Option<Duration> {
        None
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        validate_url("SUPABASE_URL", &self.endpoint_url)?;
        validate_resolved_secret("SUPABASE_SERVICE_ROLE_KEY", &self.service_role_key)?;

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}
