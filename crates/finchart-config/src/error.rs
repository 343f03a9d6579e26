//! Error types for finchart-config

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigErrorCode {
    FileNotFound,
    InvalidYaml,
    MissingField,
    InvalidValue,
    IoError,
    ValidationError,
}

impl std::fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigErrorCode::FileNotFound => write!(f, "FILE_NOT_FOUND"),
            ConfigErrorCode::InvalidYaml => write!(f, "INVALID_YAML"),
            ConfigErrorCode::MissingField => write!(f, "MISSING_FIELD"),
            ConfigErrorCode::InvalidValue => write!(f, "INVALID_VALUE"),
            ConfigErrorCode::IoError => write!(f, "IO_ERROR"),
            ConfigErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
        }
    }
}

/// Severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigErrorSeverity {
    Warning,
    Error,
}

/// Serializable description of a configuration failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigErrorDetails {
    pub code: ConfigErrorCode,
    pub message: String,
    /// Offending field path, e.g. "chart.plot_end"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ConfigErrorDetails {
    pub fn new(code: ConfigErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            field: None,
            suggestions: vec![],
        }
    }

    pub fn with_field(mut self, field: String) -> Self {
        self.field = Some(field);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ConfigErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, "\nField: {}", field)?;
        }
        for suggestion in &self.suggestions {
            write!(f, "\n  - {}", suggestion)?;
        }
        Ok(())
    }
}

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid YAML format")]
    InvalidYaml,

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field value: {field} - {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("IO error occurred")]
    IoError,

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// Get the error code
    pub fn code(&self) -> ConfigErrorCode {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorCode::FileNotFound,
            ConfigError::InvalidYaml => ConfigErrorCode::InvalidYaml,
            ConfigError::MissingField { .. } => ConfigErrorCode::MissingField,
            ConfigError::InvalidValue { .. } => ConfigErrorCode::InvalidValue,
            ConfigError::IoError => ConfigErrorCode::IoError,
            ConfigError::ValidationError { .. } => ConfigErrorCode::ValidationError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ConfigErrorSeverity {
        match self {
            ConfigError::ValidationError { .. } => ConfigErrorSeverity::Warning,
            _ => ConfigErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ConfigErrorDetails {
        let details = ConfigErrorDetails::new(self.code(), self.to_string());

        match self {
            ConfigError::FileNotFound { .. } => details
                .with_suggestion("Use --config to point at an existing file.".to_string())
                .with_suggestion(
                    "Run with --print-default-config to get a starting template.".to_string(),
                ),
            ConfigError::MissingField { field } => details
                .with_field(field.clone())
                .with_suggestion(format!("Add the '{}' field to your config file.", field)),
            ConfigError::InvalidValue { field, reason } => details
                .with_field(field.clone())
                .with_suggestion(reason.clone()),
            ConfigError::ValidationError { message } => details.with_suggestion(message.clone()),
            _ => details,
        }
    }
}

/// Result type with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
