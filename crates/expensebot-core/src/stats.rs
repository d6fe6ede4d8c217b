//! Statistics aggregation over one record set

use expensebot_parser::ExpenseRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};

/// Running total and row count for one category
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub total: Decimal,
    pub count: usize,
}

impl CategoryTotal {
    pub fn average(&self) -> Decimal {
        if self.count == 0 {
            Decimal::ZERO
        } else {
            self.total / Decimal::from(self.count)
        }
    }

    fn merge(&mut self, total: Decimal, count: usize) -> CoreResult<()> {
        self.total = self.total.checked_add(total).ok_or(CoreError::AmountOverflow)?;
        self.count += count;
        Ok(())
    }
}

/// Derived, read-only statistics for one record set
///
/// Category maps are keyed by the category text exactly as it appeared in
/// the upload; case folding only happens in [`StatisticsSnapshot::category_lookup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub record_count: usize,
    pub total_expenses: Decimal,
    pub highest_expense: ExpenseRecord,
    pub lowest_expense: ExpenseRecord,
    pub average_expense: Decimal,
    pub median_expense: Decimal,
    pub category_totals: BTreeMap<String, CategoryTotal>,
    pub category_averages: BTreeMap<String, Decimal>,
    /// `category_totals` merged by lower-cased name
    pub normalized_totals: BTreeMap<String, CategoryTotal>,
}

impl StatisticsSnapshot {
    /// Compute statistics for `records`; an empty set has no statistics
    ///
    /// Fails with [`CoreError::AmountOverflow`] when a sum leaves the
    /// `Decimal` range.
    pub fn compute(records: &[ExpenseRecord]) -> CoreResult<Option<Self>> {
        let Some(first) = records.first() else {
            return Ok(None);
        };
        let count = Decimal::from(records.len());

        let total_expenses = checked_sum(records.iter().map(|r| r.amount))?;

        // strict comparisons: the earliest record wins a tie
        let mut highest = first;
        let mut lowest = first;
        for record in &records[1..] {
            if record.amount > highest.amount {
                highest = record;
            }
            if record.amount < lowest.amount {
                lowest = record;
            }
        }

        let mut category_totals: BTreeMap<String, CategoryTotal> = BTreeMap::new();
        for record in records {
            category_totals
                .entry(record.category.clone())
                .or_default()
                .merge(record.amount, 1)?;
        }
        let category_averages = category_totals
            .iter()
            .map(|(name, totals)| (name.clone(), totals.average()))
            .collect();

        // case variants are merged so totals and counts add up and the
        // average covers the combined rows
        let mut normalized_totals: BTreeMap<String, CategoryTotal> = BTreeMap::new();
        for (name, totals) in &category_totals {
            normalized_totals
                .entry(name.to_lowercase())
                .or_default()
                .merge(totals.total, totals.count)?;
        }

        Ok(Some(Self {
            record_count: records.len(),
            total_expenses,
            highest_expense: highest.clone(),
            lowest_expense: lowest.clone(),
            average_expense: total_expenses / count,
            median_expense: median(records),
            category_totals,
            category_averages,
            normalized_totals,
        }))
    }

    /// Category totals keyed by lower-cased name
    pub fn normalized_categories(&self) -> &BTreeMap<String, CategoryTotal> {
        &self.normalized_totals
    }

    /// Case-insensitive category lookup
    pub fn category_lookup(&self, name: &str) -> Option<CategoryTotal> {
        self.normalized_totals.get(&name.trim().to_lowercase()).copied()
    }

    /// Categories ordered by total, largest first
    pub fn top_categories(&self, limit: usize) -> Vec<(String, CategoryTotal)> {
        let mut categories: Vec<(String, CategoryTotal)> = self
            .category_totals
            .iter()
            .map(|(name, totals)| (name.clone(), *totals))
            .collect();
        categories.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(&b.0)));
        categories.truncate(limit);
        categories
    }
}

fn checked_sum(mut amounts: impl Iterator<Item = Decimal>) -> CoreResult<Decimal> {
    amounts.try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).ok_or(CoreError::AmountOverflow)
    })
}

fn median(records: &[ExpenseRecord]) -> Decimal {
    let mut amounts: Vec<Decimal> = records.iter().map(|r| r.amount).collect();
    amounts.sort();

    let middle = amounts.len() / 2;
    if amounts.len() % 2 == 0 {
        let (a, b) = (amounts[middle - 1], amounts[middle]);
        match a.checked_add(b) {
            Some(sum) => sum / Decimal::TWO,
            // only same-sign pairs overflow, so the difference fits
            None => a + (b - a) / Decimal::TWO,
        }
    } else {
        amounts[middle]
    }
}

/// What the resolver can see of the current dataset
#[derive(Debug, Clone, Copy)]
pub enum StatsView<'a> {
    /// Nothing has been uploaded yet
    NotLoaded,
    /// The last upload produced no usable records
    Empty,
    Ready(&'a StatisticsSnapshot),
}

impl<'a> StatsView<'a> {
    pub fn snapshot(&self) -> Option<&'a StatisticsSnapshot> {
        match *self {
            StatsView::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn record(category: &str, amount: &str, day: u32) -> ExpenseRecord {
        ExpenseRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day),
            account: "Cash".to_string(),
            category: category.to_string(),
            note: String::new(),
            amount: Decimal::from_str(amount).unwrap(),
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_empty_set_has_no_snapshot() {
        assert!(StatisticsSnapshot::compute(&[]).unwrap().is_none());
    }

    #[test]
    fn test_median_odd_and_even() {
        let odd = vec![record("A", "30", 1), record("A", "10", 2), record("A", "20", 3)];
        assert_eq!(StatisticsSnapshot::compute(&odd).unwrap().unwrap().median_expense, dec("20"));

        let even = vec![
            record("A", "40", 1),
            record("A", "10", 2),
            record("A", "30", 3),
            record("A", "20", 4),
        ];
        assert_eq!(StatisticsSnapshot::compute(&even).unwrap().unwrap().median_expense, dec("25"));
    }

    #[test]
    fn test_average_is_total_over_count() {
        let records = vec![record("A", "10.10", 1), record("B", "20.20", 2), record("C", "0.70", 3)];
        let stats = StatisticsSnapshot::compute(&records).unwrap().unwrap();
        assert_eq!(stats.total_expenses, dec("31.00"));
        assert_eq!(stats.average_expense, stats.total_expenses / Decimal::from(stats.record_count));
        assert_eq!(stats.record_count, 3);
    }

    #[test]
    fn test_extrema_first_occurrence_wins() {
        let records = vec![
            record("First", "50", 1),
            record("Low", "5", 2),
            record("Second", "50", 3),
            record("LowAgain", "5", 4),
        ];
        let stats = StatisticsSnapshot::compute(&records).unwrap().unwrap();
        assert_eq!(stats.highest_expense.category, "First");
        assert_eq!(stats.lowest_expense.category, "Low");
    }

    #[test]
    fn test_negative_amounts_order_numerically() {
        let records = vec![record("Refund", "-15", 1), record("Food", "3", 2)];
        let stats = StatisticsSnapshot::compute(&records).unwrap().unwrap();
        assert_eq!(stats.lowest_expense.category, "Refund");
        assert_eq!(stats.highest_expense.category, "Food");
        assert_eq!(stats.total_expenses, dec("-12"));
    }

    #[test]
    fn test_categories_keep_original_case() {
        let records = vec![record("Food", "5", 1), record("food", "7", 2)];
        let stats = StatisticsSnapshot::compute(&records).unwrap().unwrap();
        assert_eq!(stats.category_totals.len(), 2);
        assert_eq!(stats.category_totals["Food"], CategoryTotal { total: dec("5"), count: 1 });
        assert_eq!(stats.category_totals["food"], CategoryTotal { total: dec("7"), count: 1 });
        assert_eq!(stats.category_averages["food"], dec("7"));
    }

    #[test]
    fn test_category_lookup_merges_case_variants() {
        let records = vec![record("Food", "5", 1), record("food", "7", 2), record("Travel", "9", 3)];
        let stats = StatisticsSnapshot::compute(&records).unwrap().unwrap();

        let food = stats.category_lookup("FOOD").unwrap();
        assert_eq!(food.total, dec("12"));
        assert_eq!(food.count, 2);
        assert_eq!(food.average(), dec("6"));

        assert!(stats.category_lookup(" travel ").is_some());
        assert!(stats.category_lookup("rent").is_none());
    }

    #[test]
    fn test_overflowing_total_is_an_error() {
        let max = Decimal::MAX.to_string();
        let records = vec![record("Huge", &max, 1), record("Huge", &max, 2)];
        let err = StatisticsSnapshot::compute(&records).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow));
    }

    #[test]
    fn test_category_overflow_is_an_error() {
        // the grand total fits but the positive category alone does not
        let max = Decimal::MAX.to_string();
        let min = Decimal::MIN.to_string();
        let records = vec![
            record("Big", &max, 1),
            record("Refund", &min, 2),
            record("Big", &max, 3),
        ];
        let err = StatisticsSnapshot::compute(&records).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow));
    }

    #[test]
    fn test_median_of_two_maximum_amounts() {
        let max = Decimal::MAX.to_string();
        let records = vec![record("A", &max, 1), record("B", &max, 2), record("C", "-1", 3)];
        // odd count, no pair sum needed
        assert_eq!(median(&records), Decimal::MAX);
        let pair = vec![record("A", &max, 1), record("B", &max, 2)];
        assert_eq!(median(&pair), Decimal::MAX);
    }

    #[test]
    fn test_top_categories() {
        let records = vec![
            record("Rent", "900", 1),
            record("Food", "50", 2),
            record("Food", "60", 3),
            record("Fun", "110", 4),
        ];
        let stats = StatisticsSnapshot::compute(&records).unwrap().unwrap();
        let top = stats.top_categories(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, "Rent");
        // ties are ordered by name
        assert_eq!(top[1].0, "Food");
    }

    #[test]
    fn test_stats_view_snapshot() {
        let stats = StatisticsSnapshot::compute(&[record("A", "1", 1)]).unwrap().unwrap();
        assert!(StatsView::Ready(&stats).snapshot().is_some());
        assert!(StatsView::Empty.snapshot().is_none());
        assert!(StatsView::NotLoaded.snapshot().is_none());
    }
}
