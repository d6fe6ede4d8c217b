//! Expense statistics, chat intent resolution and dataset state
//!
//! - stats: aggregation over one record set
//! - intent: keyword classification and reply rendering
//! - store: the current dataset and its replacement on upload
//! - reports: JSON summary structures

pub mod error;
pub mod intent;
pub mod reports;
pub mod stats;
pub mod store;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use intent::{CategoryQuery, CategoryTrigger, Intent, IntentResolver, NOT_LOADED_REPLY};
pub use reports::{CategorySummary, DatasetSummary, ExpenseSummary, StatisticsSummary};
pub use stats::{CategoryTotal, StatisticsSnapshot, StatsView};
pub use store::{Dataset, DatasetStore};

pub use expensebot_parser::{DefaultExpenseParser, ExpenseRecord, ParserRef, RowWarning};
