//! Error types for finchart-core
//!
//! This module provides error handling for the statistics model and the
//! chart engine, including error codes, detailed messages, and suggestions.
//! Every error raised while rendering is fatal for that render: the engine
//! drops its current chart and hands the error to the hosting page.

use finchart_codec::CodecError;
use finchart_config::{Granularity, Metric};
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Backing statistics miss required fields
    MalformedStatistics,
    /// No converter for the requested granularity
    UnsupportedPeriod,
    /// A series does not line up with the axis labels
    SeriesLabelMismatch,
    /// A node was handed to a converter for another granularity
    GranularityMismatch,
    /// Engine configured without any series
    NoSeries,
    /// Statistics document not found
    StatisticsNotFound,
    /// Document could not be decoded
    CodecError,
    /// IO error
    IoError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::MalformedStatistics => write!(f, "MALFORMED_STATISTICS"),
            ErrorCode::UnsupportedPeriod => write!(f, "UNSUPPORTED_PERIOD"),
            ErrorCode::SeriesLabelMismatch => write!(f, "SERIES_LABEL_MISMATCH"),
            ErrorCode::GranularityMismatch => write!(f, "GRANULARITY_MISMATCH"),
            ErrorCode::NoSeries => write!(f, "NO_SERIES"),
            ErrorCode::StatisticsNotFound => write!(f, "STATISTICS_NOT_FOUND"),
            ErrorCode::CodecError => write!(f, "CODEC_ERROR"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - indicates a programming error
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Detailed error information for the hosting page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Main error type for finchart-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Malformed statistics at {path}: {reason}")]
    MalformedStatistics { path: String, reason: String },

    #[error("Unsupported period: {granularity}")]
    UnsupportedPeriod { granularity: Granularity },

    #[error("Series '{metric}' has {values} values for {labels} labels")]
    SeriesLabelMismatch {
        metric: Metric,
        labels: usize,
        values: usize,
    },

    #[error("Expected a {expected} node, got a {actual} node")]
    GranularityMismatch {
        expected: Granularity,
        actual: Granularity,
    },

    #[error("Chart needs at least one data series")]
    NoSeries,

    #[error("Statistics not found: {path}")]
    StatisticsNotFound { path: String },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("IO error occurred")]
    IoError,
}

impl CoreError {
    /// Build a `MalformedStatistics` error for a document path
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::MalformedStatistics {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::MalformedStatistics { .. } => ErrorCode::MalformedStatistics,
            CoreError::UnsupportedPeriod { .. } => ErrorCode::UnsupportedPeriod,
            CoreError::SeriesLabelMismatch { .. } => ErrorCode::SeriesLabelMismatch,
            CoreError::GranularityMismatch { .. } => ErrorCode::GranularityMismatch,
            CoreError::NoSeries => ErrorCode::NoSeries,
            CoreError::StatisticsNotFound { .. } => ErrorCode::StatisticsNotFound,
            CoreError::Codec(_) => ErrorCode::CodecError,
            CoreError::IoError => ErrorCode::IoError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::MalformedStatistics { .. } => ErrorSeverity::Error,
            CoreError::UnsupportedPeriod { .. } => ErrorSeverity::Critical,
            CoreError::SeriesLabelMismatch { .. } => ErrorSeverity::Critical,
            CoreError::GranularityMismatch { .. } => ErrorSeverity::Critical,
            CoreError::NoSeries => ErrorSeverity::Critical,
            CoreError::StatisticsNotFound { .. } => ErrorSeverity::Info,
            CoreError::Codec(_) => ErrorSeverity::Error,
            CoreError::IoError => ErrorSeverity::Error,
        }
    }

    /// Whether the hosting page may try again with other data
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::StatisticsNotFound { .. } | CoreError::IoError
        )
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::MalformedStatistics { path, reason } => {
                details = details.with_detail(serde_json::json!({ "path": path, "reason": reason }));
                details = details.with_suggestion(
                    "Check that every bucket carries income and expenses totals.".to_string(),
                );
            }
            CoreError::UnsupportedPeriod { granularity } => {
                details = details.with_suggestion(format!(
                    "No label converter is registered for '{}'.",
                    granularity
                ));
            }
            CoreError::SeriesLabelMismatch {
                metric,
                labels,
                values,
            } => {
                details = details.with_detail(serde_json::json!({
                    "metric": metric,
                    "labels": labels,
                    "values": values,
                }));
                details = details.with_suggestion(
                    "The data converter must yield one value per calendar bucket.".to_string(),
                );
            }
            CoreError::StatisticsNotFound { .. } => {
                details = details.with_suggestion(
                    "List the available years before selecting one.".to_string(),
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(_error: io::Error) -> Self {
        CoreError::IoError
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            data: serde_json::json!({}),
        }
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::error!(
            target: "finchart::error",
            "ERROR [{}] {} - Operation: {} - Data: {}",
            error.code(),
            error.to_details(),
            context.operation,
            context.data
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::MalformedStatistics.to_string(), "MALFORMED_STATISTICS");
        assert_eq!(ErrorCode::UnsupportedPeriod.to_string(), "UNSUPPORTED_PERIOD");
        assert_eq!(ErrorCode::SeriesLabelMismatch.to_string(), "SERIES_LABEL_MISMATCH");
    }

    #[test]
    fn test_taxonomy_is_not_recoverable() {
        let errors = [
            CoreError::malformed("months.3.income", "missing"),
            CoreError::UnsupportedPeriod {
                granularity: Granularity::Day,
            },
            CoreError::SeriesLabelMismatch {
                metric: Metric::Income,
                labels: 12,
                values: 11,
            },
        ];
        for error in &errors {
            assert!(!error.is_recoverable());
            assert!(matches!(
                error.severity(),
                ErrorSeverity::Error | ErrorSeverity::Critical
            ));
        }
        assert!(CoreError::IoError.is_recoverable());
    }

    #[test]
    fn test_error_severity() {
        assert_eq!(
            CoreError::UnsupportedPeriod { granularity: Granularity::Day }.severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(CoreError::malformed("income", "missing").severity(), ErrorSeverity::Error);
        assert_eq!(ErrorSeverity::Critical.to_string(), "critical");
    }

    #[test]
    fn test_error_details_malformed() {
        let error = CoreError::malformed("months.3.weeks.1.expenses", "missing total");
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::MalformedStatistics);
        assert!(details.message.contains("months.3.weeks.1.expenses"));
        assert!(details.details.is_some());
        assert!(!details.suggestions.is_empty());
    }

    #[test]
    fn test_error_details_mismatch() {
        let error = CoreError::SeriesLabelMismatch {
            metric: Metric::Expenses,
            labels: 7,
            values: 5,
        };
        assert_eq!(error.to_string(), "Series 'expenses' has 5 values for 7 labels");
        let details = error.to_details();
        assert_eq!(details.details.unwrap()["labels"], 7);
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("render")
            .with_data("granularity", serde_json::json!("month"));

        assert_eq!(context.operation, "render");
        assert_eq!(context.data["granularity"], "month");
    }

    #[test]
    fn test_codec_error_conversion() {
        let codec = CodecError::InvalidDocument {
            message: "bad".to_string(),
        };
        let error: CoreError = codec.into();
        assert_eq!(error.code(), ErrorCode::CodecError);
    }
}
