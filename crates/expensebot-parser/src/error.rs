//! Error types for expensebot-parser

use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("Malformed CSV at line {line}: {message}")]
    Csv { line: u64, message: String },

    #[error("Invalid amount at line {line}: {value:?}")]
    InvalidAmount { line: u64, value: String },

    #[error("IO error")]
    IoError(#[from] io::Error),
}

impl From<csv::Error> for ParseError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|p| p.line()).unwrap_or(0);
        let message = error.to_string();
        match error.into_kind() {
            csv::ErrorKind::Io(e) => ParseError::IoError(e),
            _ => ParseError::Csv { line, message },
        }
    }
}
