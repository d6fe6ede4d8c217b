//! Expense CSV parser
//!
//! Reads the `Date, Account, Category, Note, Amount` upload format into
//! typed rows and applies the configured invalid-amount policy.

use async_trait::async_trait;
use expensebot_config::InvalidAmountPolicy;
use std::path::PathBuf;
use std::sync::Arc;

pub mod error;
pub mod types;
pub mod parser;

pub use error::ParseError;
pub use parser::{CsvExpenseParser, parse_amount, parse_date};

pub use types::{
    AmountField, ExpenseRecord, ParsedRecords, RawRow, RowWarning, WarningKind, REQUIRED_COLUMNS,
};

// ==================== Parser Trait ====================

/// Parser reference type
pub type ParserRef = Arc<dyn ExpenseParserTrait>;

/// Trait for expense file parsers
#[async_trait]
pub trait ExpenseParserTrait: Send + Sync {
    /// Parse in-memory file content into records
    async fn parse(&self, content: &[u8], policy: InvalidAmountPolicy) -> Result<ParsedRecords, ParseError>;

    /// Parse a file on disk into records
    async fn parse_file(&self, path: PathBuf, policy: InvalidAmountPolicy) -> Result<ParsedRecords, ParseError>;
}

/// Default parser implementation
#[derive(Debug, Default)]
pub struct DefaultExpenseParser;

#[async_trait]
impl ExpenseParserTrait for DefaultExpenseParser {
    async fn parse(&self, content: &[u8], policy: InvalidAmountPolicy) -> Result<ParsedRecords, ParseError> {
        let rows = CsvExpenseParser::parse(content)?;
        CsvExpenseParser::apply_policy(rows, policy)
    }

    async fn parse_file(&self, path: PathBuf, policy: InvalidAmountPolicy) -> Result<ParsedRecords, ParseError> {
        let content = tokio::fs::read(&path).await?;
        log::debug!("Read {} bytes from {}", content.len(), path.display());
        self.parse(&content, policy).await
    }
}
