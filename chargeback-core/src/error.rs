//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type ChargebackResult<T> = Result<T, ChargebackError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the Chargeback console
#[derive(Error, Debug)]
pub enum ChargebackError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        context: ErrorContext,
    },

    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChargebackError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ChargebackError::Network { context, .. } => Some(context),
            ChargebackError::Api { context, .. } => Some(context),
            ChargebackError::Authentication { context, .. } => Some(context),
            ChargebackError::Storage { context, .. } => Some(context),
            ChargebackError::Config { context, .. } => Some(context),
            ChargebackError::Validation { context, .. } => Some(context),
            ChargebackError::Timeout { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Check if error is recoverable
    ///
    /// Network and timeout failures are absorbed at the service boundary with
    /// permissive fallbacks; credential and configuration problems are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ChargebackError::Network { .. } => true,
            ChargebackError::Timeout { .. } => true,
            ChargebackError::Api { status, .. } => *status >= 500,
            ChargebackError::Authentication { .. } => false,
            ChargebackError::Config { .. } => false,
            ChargebackError::Validation { .. } => false,
            _ => false,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            ChargebackError::Network { .. } | ChargebackError::Timeout { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Network or timeout error (may be recoverable)"
                );
            }
            ChargebackError::Config { .. } | ChargebackError::Validation { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Configuration or validation error"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! network_error {
    ($msg:expr, $component:expr) => {
        ChargebackError::Network {
            message: $msg.to_string(),
            source: None,
            context: ErrorContext::new($component)
                .with_suggestion("Check that the billing API is reachable"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        ChargebackError::Network {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: ErrorContext::new($component)
                .with_suggestion("Check that the billing API is reachable"),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        ChargebackError::Config {
            message: $msg.to_string(),
            source: None,
            context: ErrorContext::new($component)
                .with_suggestion("Check your console configuration file"),
        }
    };
}

#[macro_export]
macro_rules! storage_error {
    ($msg:expr, $component:expr, $source:expr) => {
        ChargebackError::Storage {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: ErrorContext::new($component)
                .with_suggestion("Check that the state directory exists and is writable"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_recoverable_credential_failures_are_not() {
        let network = network_error!("connection refused", "api");
        assert!(network.is_recoverable());

        let auth = ChargebackError::Authentication {
            message: "invalid credentials".to_string(),
            context: ErrorContext::new("session"),
        };
        assert!(!auth.is_recoverable());

        let server = ChargebackError::Api {
            status: 503,
            message: "maintenance".to_string(),
            context: ErrorContext::new("api"),
        };
        assert!(server.is_recoverable());

        let client = ChargebackError::Api {
            status: 404,
            message: "not found".to_string(),
            context: ErrorContext::new("api"),
        };
        assert!(!client.is_recoverable());
    }

    #[test]
    fn context_carries_component_and_suggestions() {
        let err = config_error!("missing base_url", "config");
        let context = err.context().unwrap();
        assert_eq!(context.component, "config");
        assert!(!context.recovery_suggestions.is_empty());
        assert!(!context.error_id.is_empty());
    }
}
