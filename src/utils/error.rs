use thiserror::Error;

#[derive(Error, Debug)]
pub enum YardError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    /// `message` is the parsed error text, `body` the response as received.
    #[error("Backend returned {status}: {message}")]
    BackendError {
        status: u16,
        message: String,
        body: String,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Vehicle {id} is {status}, cannot {action}")]
    InvalidTransition {
        id: String,
        status: String,
        action: String,
    },

    #[error("Prebooking sweep failed: {message}")]
    SweepError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Backend,
    Configuration,
    Data,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl YardError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        YardError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            YardError::ApiError(_) => ErrorCategory::Network,
            YardError::BackendError { .. } | YardError::SweepError { .. } => ErrorCategory::Backend,
            YardError::ConfigError { .. }
            | YardError::MissingConfigError { .. }
            | YardError::InvalidConfigValueError { .. }
            | YardError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            YardError::CsvError(_) | YardError::IoError(_) | YardError::SerializationError(_) => {
                ErrorCategory::Data
            }
            YardError::NotFound { .. }
            | YardError::ValidationError { .. }
            | YardError::InvalidTransition { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Backend | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the network connection and re-run the command",
            ErrorCategory::Backend => {
                "Inspect the backend error text; the action can be re-run safely"
            }
            ErrorCategory::Configuration => {
                "Check the config file and the YARD_* / SUPABASE_* environment variables"
            }
            ErrorCategory::Data => "The backend returned data in an unexpected shape",
            ErrorCategory::Input => "Check the vehicle id and the supplied fields",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            YardError::ApiError(_) => "Could not reach the yard database".to_string(),
            YardError::NotFound { entity, id } => format!("No {} with id {}", entity, id),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, YardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let missing = YardError::not_found("vehicle", "v-1");
        assert_eq!(missing.category(), ErrorCategory::Input);
        assert_eq!(missing.severity(), ErrorSeverity::Low);

        let backend = YardError::BackendError {
            status: 409,
            message: "duplicate key".to_string(),
            body: String::new(),
        };
        assert_eq!(backend.severity(), ErrorSeverity::High);

        let config = YardError::MissingConfigError {
            field: "SUPABASE_URL".to_string(),
        };
        assert_eq!(config.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_user_friendly_message() {
        let missing = YardError::not_found("vehicle", "v-9");
        assert_eq!(missing.user_friendly_message(), "No vehicle with id v-9");
    }

    #[test]
    fn test_invalid_transition_is_input_error() {
        let err = YardError::InvalidTransition {
            id: "v-1".to_string(),
            status: "released".to_string(),
            action: "notify".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.to_string(), "Vehicle v-1 is released, cannot notify");
    }
}
