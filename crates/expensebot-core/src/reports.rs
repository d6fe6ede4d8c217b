//! Report structures for API responses

use chrono::{DateTime, Utc};
use expensebot_config::CurrencyConfig;
use expensebot_utils::{display_date, format_amount};
use serde::{Deserialize, Serialize};

use crate::stats::StatisticsSnapshot;
use crate::store::Dataset;

/// One expense row as shown in a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub date: String,
    pub category: String,
    pub note: String,
    pub amount: String,
}

/// Category line for the summary report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub total: String,
    pub average: String,
    pub count: usize,
}

/// Statistics figures, formatted to the configured decimal places
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub total_expenses: String,
    pub average_expense: String,
    pub median_expense: String,
    pub highest_expense: ExpenseSummary,
    pub lowest_expense: ExpenseSummary,
    pub categories: Vec<CategorySummary>,
}

/// Dataset summary (JSON API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub loaded: bool,
    pub version: u64,
    pub source: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub record_count: usize,
    pub warning_count: usize,
    pub currency: String,
    pub statistics: Option<StatisticsSummary>,
}

impl DatasetSummary {
    pub fn new(dataset: Option<&Dataset>, currency: &CurrencyConfig) -> Self {
        let Some(dataset) = dataset else {
            return Self {
                loaded: false,
                version: 0,
                source: None,
                loaded_at: None,
                record_count: 0,
                warning_count: 0,
                currency: currency.code.clone(),
                statistics: None,
            };
        };

        Self {
            loaded: true,
            version: dataset.version,
            source: Some(dataset.source.clone()),
            loaded_at: Some(dataset.loaded_at),
            record_count: dataset.records.len(),
            warning_count: dataset.warnings.len(),
            currency: currency.code.clone(),
            statistics: dataset
                .snapshot
                .as_ref()
                .map(|snapshot| StatisticsSummary::new(snapshot, currency.decimal_places)),
        }
    }
}

impl StatisticsSummary {
    fn new(snapshot: &StatisticsSnapshot, dp: u32) -> Self {
        let expense = |record: &expensebot_parser::ExpenseRecord| ExpenseSummary {
            date: display_date(record.date),
            category: record.category.clone(),
            note: record.note.clone(),
            amount: format_amount(record.amount, dp),
        };

        Self {
            total_expenses: format_amount(snapshot.total_expenses, dp),
            average_expense: format_amount(snapshot.average_expense, dp),
            median_expense: format_amount(snapshot.median_expense, dp),
            highest_expense: expense(&snapshot.highest_expense),
            lowest_expense: expense(&snapshot.lowest_expense),
            categories: snapshot
                .top_categories(snapshot.category_totals.len())
                .into_iter()
                .map(|(name, totals)| CategorySummary {
                    name,
                    total: format_amount(totals.total, dp),
                    average: format_amount(totals.average(), dp),
                    count: totals.count,
                })
                .collect(),
        }
    }
}
