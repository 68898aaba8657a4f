use std::fmt;
use thiserror::Error;

/// The external collaborator an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Geocoding,
    Reachability,
    Routing,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Geocoding => "geocoding",
            Provider::Reachability => "isochrone",
            Provider::Routing => "directions",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum MeetError {
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("{provider} provider rejected credentials ({context})")]
    ProviderAuth { provider: Provider, context: String },

    #[error("{provider} provider rate limit exceeded ({context})")]
    ProviderRateLimited { provider: Provider, context: String },

    #[error("{provider} provider unavailable ({context}): {message}")]
    ProviderUnavailable {
        provider: Provider,
        context: String,
        message: String,
    },

    #[error("{provider} provider found no match ({context})")]
    ProviderNotFound { provider: Provider, context: String },

    #[error("{provider} provider rejected request with status {status} ({context})")]
    ProviderRejected {
        provider: Provider,
        status: u16,
        context: String,
    },

    #[error("Isochrone geometry was empty ({context})")]
    EmptyGeometry { context: String },

    #[error("Directions response missing duration ({context})")]
    MissingDuration { context: String },

    #[error("Internal invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required configuration field: {field}")]
    MissingConfig { field: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, MeetError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Provider,
    Internal,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MeetError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        MeetError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        MeetError::InvariantViolation {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MeetError::InvalidInput { .. } => ErrorCategory::Input,
            MeetError::ProviderAuth { .. }
            | MeetError::ProviderRateLimited { .. }
            | MeetError::ProviderUnavailable { .. }
            | MeetError::ProviderNotFound { .. }
            | MeetError::ProviderRejected { .. }
            | MeetError::EmptyGeometry { .. }
            | MeetError::MissingDuration { .. }
            | MeetError::Http(_) => ErrorCategory::Provider,
            MeetError::InvariantViolation { .. }
            | MeetError::Serialization(_)
            | MeetError::Io(_) => ErrorCategory::Internal,
            MeetError::Config { .. }
            | MeetError::MissingConfig { .. }
            | MeetError::InvalidConfigValue { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MeetError::ProviderRateLimited { .. } | MeetError::ProviderUnavailable { .. } => {
                ErrorSeverity::Medium
            }
            MeetError::Http(e) if e.is_timeout() || e.is_connect() => ErrorSeverity::Medium,
            MeetError::InvariantViolation { .. } | MeetError::Io(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Whether repeating the same request later could plausibly succeed.
    /// The engine itself never retries; this is advice for the caller.
    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MeetError::InvalidInput { .. } => "Check the addresses, profile, objective and minutes",
            MeetError::ProviderAuth { .. } => "Verify the MAPBOX_TOKEN value and its scopes",
            MeetError::ProviderRateLimited { .. } => "Wait a moment before sending more requests",
            MeetError::ProviderUnavailable { .. } | MeetError::Http(_) => {
                "Check network connectivity and retry later"
            }
            MeetError::ProviderNotFound { .. } => "Spell the address out in full or add a city hint",
            MeetError::ProviderRejected { .. } => "Inspect the request parameters sent to the provider",
            MeetError::EmptyGeometry { .. } | MeetError::MissingDuration { .. } => {
                "The provider returned an incomplete answer; retry or pick other addresses"
            }
            MeetError::InvariantViolation { .. } => "This is a bug; please report it",
            MeetError::Serialization(_) | MeetError::Io(_) => "Retry; report if it persists",
            MeetError::Config { .. }
            | MeetError::MissingConfig { .. }
            | MeetError::InvalidConfigValue { .. } => "Fix the configuration file or CLI flags",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MeetError::ProviderNotFound { context, .. } => {
                format!("Address not found: {}", context)
            }
            MeetError::ProviderAuth { .. } => "Invalid Mapbox token".to_string(),
            MeetError::ProviderRateLimited { .. } => "Mapbox rate limit exceeded".to_string(),
            MeetError::ProviderUnavailable { provider, .. } => {
                format!("Mapbox {} service error", provider)
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_errors_carry_context() {
        let err = MeetError::ProviderNotFound {
            provider: Provider::Geocoding,
            context: "address 'Nowhere 1'".to_string(),
        };
        assert!(err.to_string().contains("Nowhere 1"));
        assert_eq!(err.category(), ErrorCategory::Provider);
        assert_eq!(err.user_friendly_message(), "Address not found: address 'Nowhere 1'");
    }

    #[test]
    fn test_severity_and_retryability() {
        let limited = MeetError::ProviderRateLimited {
            provider: Provider::Routing,
            context: "(1, 2)".to_string(),
        };
        assert!(limited.is_retryable());

        let bug = MeetError::invariant("no regions");
        assert_eq!(bug.severity(), ErrorSeverity::Critical);
        assert!(!bug.is_retryable());

        let input = MeetError::invalid_input("addresses", "empty");
        assert_eq!(input.category(), ErrorCategory::Input);
        assert_eq!(input.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_serialization_errors_are_internal() {
        let err: MeetError = serde_json::from_str::<u8>("not json").unwrap_err().into();
        assert!(matches!(err, MeetError::Serialization(_)));
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
