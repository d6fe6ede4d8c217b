//! Error types for expensebot-core
//!
//! Ingestion failures are reported through [`CoreError`]; each variant
//! carries a stable code, a severity and user-facing suggestions.

use expensebot_parser::ParseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Header row lacks required columns
    MissingColumns,
    /// CSV framing or encoding problem
    ParseError,
    /// Amount rejected by the ingest policy
    InvalidAmount,
    /// Amounts too large to aggregate
    AmountOverflow,
    /// IO error
    IoError,
    /// Upload is not a CSV file
    UnsupportedFile,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::MissingColumns => write!(f, "MISSING_COLUMNS"),
            ErrorCode::ParseError => write!(f, "PARSE_ERROR"),
            ErrorCode::InvalidAmount => write!(f, "INVALID_AMOUNT"),
            ErrorCode::AmountOverflow => write!(f, "AMOUNT_OVERFLOW"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::UnsupportedFile => write!(f, "UNSUPPORTED_FILE"),
        }
    }
}

/// Detailed error information for API responses and logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    /// Line number in the uploaded file (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            suggestions: vec![],
            line: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }

    pub fn with_line(mut self, line: u64) -> Self {
        self.line = Some(line);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        for suggestion in &self.suggestions {
            write!(f, "\n  - {}", suggestion)?;
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// The request was wrong; the service is fine
    Warning,
    /// Operation failed
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for expensebot-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("Parse error: {message}")]
    ParseError { line: u64, message: String },

    #[error("Invalid amount {value:?} at line {line}")]
    InvalidAmount { line: u64, value: String },

    #[error("Amounts are too large to add up")]
    AmountOverflow,

    #[error("IO error occurred")]
    IoError,

    #[error("Unsupported file: {name}")]
    UnsupportedFile { name: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::MissingColumns { .. } => ErrorCode::MissingColumns,
            CoreError::ParseError { .. } => ErrorCode::ParseError,
            CoreError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            CoreError::AmountOverflow => ErrorCode::AmountOverflow,
            CoreError::IoError => ErrorCode::IoError,
            CoreError::UnsupportedFile { .. } => ErrorCode::UnsupportedFile,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::MissingColumns { .. } => ErrorSeverity::Warning,
            CoreError::InvalidAmount { .. } => ErrorSeverity::Warning,
            CoreError::AmountOverflow => ErrorSeverity::Warning,
            CoreError::UnsupportedFile { .. } => ErrorSeverity::Warning,
            CoreError::ParseError { .. } => ErrorSeverity::Warning,
            CoreError::IoError => ErrorSeverity::Error,
        }
    }

    /// Whether the uploader can fix this by changing the file
    pub fn is_client_error(&self) -> bool {
        self.severity() == ErrorSeverity::Warning
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::MissingColumns { .. } => {
                details = details.with_suggestion(
                    "The header row must contain Date, Account, Category, Note and Amount.".to_string()
                );
            }
            CoreError::ParseError { line, .. } => {
                details = details.with_line(*line);
                details = details.with_suggestion(
                    "Check that the file is UTF-8 encoded and every quote is closed.".to_string()
                );
            }
            CoreError::InvalidAmount { line, .. } => {
                details = details.with_line(*line);
                details = details.with_suggestion(
                    "Fix the Amount cell, or set ingest.invalid_amount to skip or zero.".to_string()
                );
            }
            CoreError::AmountOverflow => {
                details = details.with_suggestion(
                    "Check the Amount column for values with too many digits.".to_string()
                );
            }
            CoreError::UnsupportedFile { .. } => {
                details = details.with_suggestion("Only .csv files are accepted.".to_string());
            }
            CoreError::IoError => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<ParseError> for CoreError {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::MissingColumns { columns } => CoreError::MissingColumns { columns },
            ParseError::Csv { line, message } => CoreError::ParseError { line, message },
            ParseError::InvalidAmount { line, value } => CoreError::InvalidAmount { line, value },
            ParseError::IoError(e) => {
                log::error!(target: "expensebot::error", "ingestion read failed: {}", e);
                CoreError::IoError
            }
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::AmountOverflow.to_string(), "AMOUNT_OVERFLOW");
        assert_eq!(ErrorCode::MissingColumns.to_string(), "MISSING_COLUMNS");
        assert_eq!(ErrorCode::UnsupportedFile.to_string(), "UNSUPPORTED_FILE");
    }

    #[test]
    fn test_core_error_severity() {
        assert!(CoreError::UnsupportedFile { name: "a.txt".to_string() }.is_client_error());
        assert!(CoreError::MissingColumns { columns: vec!["Amount".to_string()] }.is_client_error());
        assert!(CoreError::ParseError { line: 3, message: "bad quote".to_string() }.is_client_error());
        assert!(!CoreError::IoError.is_client_error());
        assert!(CoreError::AmountOverflow.is_client_error());
        assert_eq!(CoreError::IoError.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_from_parse_error() {
        let error: CoreError = ParseError::MissingColumns {
            columns: vec!["Note".to_string(), "Amount".to_string()],
        }
        .into();
        assert_eq!(error.code(), ErrorCode::MissingColumns);
        assert_eq!(error.to_string(), "Missing required columns: Note, Amount");

        let error: CoreError = ParseError::IoError(std::io::Error::new(std::io::ErrorKind::Other, "disk gone")).into();
        assert!(matches!(error, CoreError::IoError));
    }

    #[test]
    fn test_error_details_invalid_amount() {
        let error = CoreError::InvalidAmount { line: 7, value: "abc".to_string() };
        let details = error.to_details();
        assert_eq!(details.code, ErrorCode::InvalidAmount);
        assert_eq!(details.line, Some(7));
        assert!(!details.suggestions.is_empty());
        assert!(details.to_string().contains("(line 7)"));
    }
}
