//! CSV expense parser implementation

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use expensebot_config::InvalidAmountPolicy;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ParseError;
use crate::types::{
    AmountField, ExpenseRecord, ParsedRecords, RawRow, RowWarning, WarningKind, REQUIRED_COLUMNS,
};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

const DATE_FORMATS: [&str; 6] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %b %Y", "%b %d %Y", "%B %d, %Y"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Positions of the required columns in the header row
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    date: usize,
    account: usize,
    category: usize,
    note: usize,
    amount: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, ParseError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| find(**name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ParseError::MissingColumns { columns: missing });
        }

        // every column was found above
        let at = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            date: at("Date"),
            account: at("Account"),
            category: at("Category"),
            note: at("Note"),
            amount: at("Amount"),
        })
    }

    fn read_row(&self, record: &csv::StringRecord, line: u64) -> RawRow {
        let cell = |i: usize| record.get(i).unwrap_or("").to_string();
        let date_text = cell(self.date);

        RawRow {
            line,
            date: parse_date(&date_text),
            date_text,
            account: cell(self.account),
            category: cell(self.category),
            note: cell(self.note),
            amount: parse_amount(&cell(self.amount)),
        }
    }
}

/// Stateless CSV reader for expense files
pub struct CsvExpenseParser;

impl CsvExpenseParser {
    /// Read every data row of an expense CSV, in file order
    ///
    /// Cell-level problems never fail the parse; they show up in the
    /// returned [`RawRow`]s. Broken framing, invalid UTF-8 and I/O errors
    /// abort the whole read.
    pub fn parse(content: &[u8]) -> Result<Vec<RawRow>, ParseError> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content);

        let headers = reader.headers()?.clone();
        let columns = ColumnIndex::from_headers(&headers)?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            rows.push(columns.read_row(&record, line));
        }

        Ok(rows)
    }

    /// Turn raw rows into records according to `policy`
    pub fn apply_policy(rows: Vec<RawRow>, policy: InvalidAmountPolicy) -> Result<ParsedRecords, ParseError> {
        let mut parsed = ParsedRecords::default();

        for row in rows {
            if row.date.is_none() {
                parsed.warnings.push(RowWarning {
                    line: row.line,
                    kind: WarningKind::InvalidDate,
                    message: format!("unrecognised date {:?}", row.date_text),
                });
            }

            let amount = match row.amount {
                AmountField::Exact(value) => value,
                AmountField::Prefix { value, rest } => {
                    parsed.warnings.push(RowWarning {
                        line: row.line,
                        kind: WarningKind::TruncatedAmount,
                        message: format!("ignored {:?} after amount {}", rest, value),
                    });
                    value
                }
                AmountField::Invalid(raw) => match policy {
                    InvalidAmountPolicy::Reject => {
                        return Err(ParseError::InvalidAmount { line: row.line, value: raw });
                    }
                    InvalidAmountPolicy::Skip => {
                        parsed.warnings.push(RowWarning {
                            line: row.line,
                            kind: WarningKind::SkippedRow,
                            message: format!("skipped row with non-numeric amount {:?}", raw),
                        });
                        continue;
                    }
                    InvalidAmountPolicy::Zero => {
                        parsed.warnings.push(RowWarning {
                            line: row.line,
                            kind: WarningKind::ZeroedAmount,
                            message: format!("non-numeric amount {:?} counted as 0", raw),
                        });
                        Decimal::ZERO
                    }
                },
            };

            parsed.records.push(ExpenseRecord {
                date: row.date,
                account: row.account,
                category: row.category,
                note: row.note,
                amount,
            });
        }

        for warning in &parsed.warnings {
            log::debug!("line {}: {}", warning.line, warning.message);
        }

        Ok(parsed)
    }
}

/// Read an amount with parse-float semantics: the leading numeric prefix
/// is consumed and anything after it is reported as ignored
pub fn parse_amount(text: &str) -> AmountField {
    static NUMBER_PREFIX: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let number_regex = NUMBER_PREFIX.get_or_init(|| {
        regex::Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap()
    });

    let trimmed = text.trim();
    let Some(m) = number_regex.find(trimmed) else {
        return AmountField::Invalid(trimmed.to_string());
    };

    let Some(value) = decimal_from_literal(m.as_str()) else {
        return AmountField::Invalid(trimmed.to_string());
    };

    let rest = trimmed[m.end()..].trim();
    if rest.is_empty() {
        AmountField::Exact(value)
    } else {
        AmountField::Prefix { value, rest: rest.to_string() }
    }
}

fn decimal_from_literal(literal: &str) -> Option<Decimal> {
    let (negative, unsigned) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };

    let mut digits = String::with_capacity(unsigned.len() + 2);
    if negative {
        digits.push('-');
    }
    if unsigned.starts_with('.') {
        digits.push('0');
    }
    digits.push_str(unsigned);

    // "12." and "12.e3" are valid float text
    let digits = digits.replace(".e", "e").replace(".E", "E");
    let digits = digits.strip_suffix('.').unwrap_or(&digits);

    if digits.contains(['e', 'E']) {
        Decimal::from_scientific(digits).ok()
    } else {
        Decimal::from_str(digits).ok()
    }
}

/// Read a date from any of the supported layouts; unrecognised text yields `None`
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive())
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_simple_file() {
        let input = "Date,Account,Category,Note,Amount\n\
                     2024-01-15,Cash,Food,Lunch,120.50\n\
                     2024-01-16,Card,Transport,Cab,80\n";
        let rows = CsvExpenseParser::parse(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Food");
        assert_eq!(rows[0].amount, AmountField::Exact(dec("120.50")));
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].note, "Cab");
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn test_parse_reordered_and_extra_columns() {
        let input = "Amount,Ignored,Note,Category,Account,Date\n5,x,Tea,Food,Cash,2024-02-01\n";
        let rows = CsvExpenseParser::parse(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].account, "Cash");
        assert_eq!(rows[0].amount, AmountField::Exact(dec("5")));
    }

    #[test]
    fn test_parse_strips_bom_and_whitespace() {
        let input = "\u{feff}Date, Account ,Category,Note,Amount\n 2024-01-15 , Cash ,Food, , 10 \n";
        let rows = CsvExpenseParser::parse(input.as_bytes()).unwrap();
        assert_eq!(rows[0].account, "Cash");
        assert_eq!(rows[0].note, "");
        assert_eq!(rows[0].amount, AmountField::Exact(dec("10")));
    }

    #[test]
    fn test_parse_missing_columns() {
        let input = "Date,Category,Amount\n2024-01-15,Food,10\n";
        let err = CsvExpenseParser::parse(input.as_bytes()).unwrap_err();
        match err {
            ParseError::MissingColumns { columns } => assert_eq!(columns, vec!["Account", "Note"]),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_short_row_is_tolerated() {
        let input = "Date,Account,Category,Note,Amount\n2024-01-15,Cash,Food\n";
        let rows = CsvExpenseParser::parse(input.as_bytes()).unwrap();
        assert_eq!(rows[0].amount, AmountField::Invalid(String::new()));
    }

    #[test]
    fn test_parse_invalid_utf8_is_fatal() {
        let mut input = b"Date,Account,Category,Note,Amount\n2024-01-15,Cash,".to_vec();
        input.extend_from_slice(&[0xff, 0xfe]);
        input.extend_from_slice(b",Lunch,10\n");
        assert!(matches!(CsvExpenseParser::parse(&input), Err(ParseError::Csv { .. })));
    }

    #[test]
    fn test_parse_amount_forms() {
        assert_eq!(parse_amount("42"), AmountField::Exact(dec("42")));
        assert_eq!(parse_amount("-3.75"), AmountField::Exact(dec("-3.75")));
        assert_eq!(parse_amount("+.5"), AmountField::Exact(dec("0.5")));
        assert_eq!(parse_amount("12."), AmountField::Exact(dec("12")));
        assert_eq!(parse_amount("1.5e2"), AmountField::Exact(dec("150")));
        assert_eq!(
            parse_amount("12abc"),
            AmountField::Prefix { value: dec("12"), rest: "abc".to_string() }
        );
        assert_eq!(
            parse_amount("1,200.50"),
            AmountField::Prefix { value: dec("1"), rest: ",200.50".to_string() }
        );
        assert_eq!(parse_amount("abc"), AmountField::Invalid("abc".to_string()));
        assert_eq!(parse_amount(""), AmountField::Invalid(String::new()));
        assert_eq!(parse_amount("-"), AmountField::Invalid("-".to_string()));
    }

    #[test]
    fn test_parse_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(parse_date("2024-03-09"), expected);
        assert_eq!(parse_date("2024/03/09"), expected);
        assert_eq!(parse_date("03/09/2024"), expected);
        assert_eq!(parse_date("9 Mar 2024"), expected);
        assert_eq!(parse_date("Mar 9 2024"), expected);
        assert_eq!(parse_date("March 9, 2024"), expected);
        assert_eq!(parse_date("2024-03-09 18:30:00"), expected);
        assert_eq!(parse_date("2024-03-09T18:30:00"), expected);
        assert_eq!(parse_date("2024-03-09T18:30:00+05:30"), expected);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    fn raw(line: u64, amount: AmountField) -> RawRow {
        RawRow {
            line,
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            date_text: "2024-01-01".to_string(),
            account: "Cash".to_string(),
            category: "Food".to_string(),
            note: String::new(),
            amount,
        }
    }

    #[test]
    fn test_policy_skip() {
        let rows = vec![
            raw(2, AmountField::Exact(dec("10"))),
            raw(3, AmountField::Invalid("n/a".to_string())),
        ];
        let parsed = CsvExpenseParser::apply_policy(rows, InvalidAmountPolicy::Skip).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.skipped(), 1);
        assert_eq!(parsed.warnings[0].line, 3);
    }

    #[test]
    fn test_policy_zero() {
        let rows = vec![raw(2, AmountField::Invalid("n/a".to_string()))];
        let parsed = CsvExpenseParser::apply_policy(rows, InvalidAmountPolicy::Zero).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].amount, Decimal::ZERO);
        assert_eq!(parsed.warnings[0].kind, WarningKind::ZeroedAmount);
    }

    #[test]
    fn test_policy_reject() {
        let rows = vec![
            raw(2, AmountField::Exact(dec("10"))),
            raw(3, AmountField::Invalid("n/a".to_string())),
        ];
        let err = CsvExpenseParser::apply_policy(rows, InvalidAmountPolicy::Reject).unwrap_err();
        assert!(matches!(err, ParseError::InvalidAmount { line: 3, .. }));
    }

    #[test]
    fn test_policy_keeps_prefix_and_invalid_date() {
        let mut row = raw(2, AmountField::Prefix { value: dec("7"), rest: "rs".to_string() });
        row.date = None;
        row.date_text = "someday".to_string();
        let parsed = CsvExpenseParser::apply_policy(vec![row], InvalidAmountPolicy::Skip).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].amount, dec("7"));
        assert_eq!(parsed.records[0].date, None);
        let kinds: Vec<WarningKind> = parsed.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WarningKind::InvalidDate, WarningKind::TruncatedAmount]);
        let adjusted: Vec<bool> = kinds.iter().map(|k| k.adjusts_amount()).collect();
        assert_eq!(adjusted, vec![false, true]);
    }
}
