//! Common types for the expense parser

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Column names every upload must carry
pub const REQUIRED_COLUMNS: [&str; 5] = ["Date", "Account", "Category", "Note", "Amount"];

/// One expense row of an uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// `None` when the source text could not be read as a date
    pub date: Option<NaiveDate>,
    pub account: String,
    pub category: String,
    /// Display-only
    pub note: String,
    pub amount: Decimal,
}

/// Result of reading the `Amount` cell
#[derive(Debug, Clone, PartialEq)]
pub enum AmountField {
    /// The whole cell is a number
    Exact(Decimal),
    /// Only a leading numeric prefix could be read; `rest` was ignored
    Prefix { value: Decimal, rest: String },
    /// No numeric prefix at all
    Invalid(String),
}

/// A row as read from the file, before the ingest policy is applied
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the source file
    pub line: u64,
    pub date: Option<NaiveDate>,
    pub date_text: String,
    pub account: String,
    pub category: String,
    pub note: String,
    pub amount: AmountField,
}

/// Kind of per-row anomaly found during ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Row dropped because the amount was not numeric
    SkippedRow,
    /// Non-numeric amount replaced by zero
    ZeroedAmount,
    /// Trailing text after the numeric amount was ignored
    TruncatedAmount,
    /// Date text was not recognised; the row is kept with an invalid date
    InvalidDate,
}

impl WarningKind {
    /// Whether the row was dropped or its amount changed
    pub fn adjusts_amount(&self) -> bool {
        !matches!(self, WarningKind::InvalidDate)
    }
}

/// Per-row warning surfaced to the uploader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowWarning {
    pub line: u64,
    pub kind: WarningKind,
    pub message: String,
}

/// Records that survived the ingest policy, with the warnings it produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRecords {
    pub records: Vec<ExpenseRecord>,
    pub warnings: Vec<RowWarning>,
}

impl ParsedRecords {
    /// Number of rows dropped by the policy
    pub fn skipped(&self) -> usize {
        self.warnings.iter().filter(|w| w.kind == WarningKind::SkippedRow).count()
    }
}
