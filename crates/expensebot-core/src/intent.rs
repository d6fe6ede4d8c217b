//! Keyword intent matching for chat messages
//!
//! A message is lower-cased and checked against an ordered list of rules;
//! the first rule with any matching keyword wins. Matching is plain
//! substring search, so a keyword also matches inside longer words.

use expensebot_config::CurrencyConfig;
use expensebot_utils::{display_date, format_money};
use rust_decimal::Decimal;

use crate::stats::{StatisticsSnapshot, StatsView};

const TOTAL_KEYWORDS: &[&str] = &["total expenses", "total spent", "total expense", "total"];
const HIGHEST_KEYWORDS: &[&str] = &["highest expense", "most expensive", "most", "highest"];
const LOWEST_KEYWORDS: &[&str] = &["lowest expense", "least expensive", "cheapest", "minimum", "lowest"];
const AVERAGE_KEYWORDS: &[&str] = &["average expense", "average spent", "average"];
const MEDIAN_KEYWORDS: &[&str] = &["median expense", "median"];
const GRATITUDE_KEYWORDS: &[&str] = &["thanks", "thank you"];
const HELP_KEYWORDS: &[&str] = &["help"];
const GREETING_KEYWORDS: &[&str] = &["hi", "hello", "hey"];
const FAREWELL_KEYWORDS: &[&str] = &["bye", "goodbye"];

pub const GRATITUDE_REPLY: &str = "You're welcome! If you have any more questions, feel free to ask.";
pub const HELP_REPLY: &str = "I can help you with your expenses! You can ask me things like 'What is my total expense?', 'What is my highest expense?', or 'How much have I spent on food?'.";
pub const GREETING_REPLY: &str = "Hello! How can I help you with your expenses today?";
pub const FAREWELL_REPLY: &str = "Goodbye! Have a great day!";
pub const FALLBACK_REPLY: &str = "I'm not sure how to respond to that. You can ask me about your total expenses, the highest or lowest expense, or how much you've spent on a specific category.";
pub const NOT_LOADED_REPLY: &str = "No expense data loaded yet. Please upload a CSV file of your expenses first.";
pub const EMPTY_DATASET_REPLY: &str = "The uploaded file did not contain any usable expense records.";

/// Phrase that introduced a category name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryTrigger {
    SpentOn,
    SpendOn,
    Category,
}

impl CategoryTrigger {
    const ALL: [CategoryTrigger; 3] = [CategoryTrigger::SpentOn, CategoryTrigger::SpendOn, CategoryTrigger::Category];

    pub fn phrase(&self) -> &'static str {
        match self {
            CategoryTrigger::SpentOn => "spent on",
            CategoryTrigger::SpendOn => "spend on",
            CategoryTrigger::Category => "category",
        }
    }
}

/// A category question split into its trigger phrase and the requested name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuery {
    pub trigger: CategoryTrigger,
    /// Lower-cased, trimmed category name; may be empty
    pub name: String,
}

impl CategoryQuery {
    /// Find the earliest trigger phrase in `message` and take the rest as the name
    pub fn extract(message: &str) -> Option<Self> {
        let lower = message.to_lowercase();

        let (position, trigger) = CategoryTrigger::ALL
            .iter()
            .filter_map(|t| lower.find(t.phrase()).map(|pos| (pos, *t)))
            .min_by_key(|(pos, _)| *pos)?;

        let remainder = &lower[position + trigger.phrase().len()..];
        let name = remainder
            .trim()
            .trim_start_matches(':')
            .trim_end_matches(['?', '!', '.', ','])
            .trim();

        Some(Self {
            trigger,
            name: name.to_string(),
        })
    }
}

/// Recognised kinds of chat message, in matching priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Total,
    Highest,
    Lowest,
    Average,
    Median,
    Gratitude,
    Category(CategoryQuery),
    Help,
    Greeting,
    Farewell,
    Unknown,
}

impl Intent {
    /// Classify a message; never fails
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        let matches = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

        if matches(TOTAL_KEYWORDS) {
            Intent::Total
        } else if matches(HIGHEST_KEYWORDS) {
            Intent::Highest
        } else if matches(LOWEST_KEYWORDS) {
            Intent::Lowest
        } else if matches(AVERAGE_KEYWORDS) {
            Intent::Average
        } else if matches(MEDIAN_KEYWORDS) {
            Intent::Median
        } else if matches(GRATITUDE_KEYWORDS) {
            Intent::Gratitude
        } else if let Some(query) = CategoryQuery::extract(&lower) {
            Intent::Category(query)
        } else if matches(HELP_KEYWORDS) {
            Intent::Help
        } else if matches(GREETING_KEYWORDS) {
            Intent::Greeting
        } else if matches(FAREWELL_KEYWORDS) {
            Intent::Farewell
        } else {
            Intent::Unknown
        }
    }

    /// Whether answering needs a loaded dataset
    pub fn needs_data(&self) -> bool {
        matches!(
            self,
            Intent::Total
                | Intent::Highest
                | Intent::Lowest
                | Intent::Average
                | Intent::Median
                | Intent::Category(_)
        )
    }
}

/// Turns chat messages into replies against the current statistics
#[derive(Debug, Clone)]
pub struct IntentResolver {
    currency: String,
    decimal_places: u32,
}

impl Default for IntentResolver {
    fn default() -> Self {
        Self::new(&CurrencyConfig::default())
    }
}

impl IntentResolver {
    pub fn new(currency: &CurrencyConfig) -> Self {
        Self {
            currency: currency.code.clone(),
            decimal_places: currency.decimal_places,
        }
    }

    /// Classify `message` and answer it
    pub fn resolve(&self, message: &str, view: StatsView<'_>) -> String {
        let intent = Intent::classify(message);
        log::debug!("chat message classified as {:?}", intent);
        self.respond(&intent, view)
    }

    /// Build the reply for an already classified intent
    pub fn respond(&self, intent: &Intent, view: StatsView<'_>) -> String {
        match intent {
            Intent::Gratitude => GRATITUDE_REPLY.to_string(),
            Intent::Help => HELP_REPLY.to_string(),
            Intent::Farewell => FAREWELL_REPLY.to_string(),
            Intent::Greeting => match view {
                StatsView::NotLoaded => format!("{} {}", GREETING_REPLY, NOT_LOADED_REPLY),
                _ => GREETING_REPLY.to_string(),
            },
            _ if intent.needs_data() => match view {
                StatsView::NotLoaded => NOT_LOADED_REPLY.to_string(),
                StatsView::Empty => EMPTY_DATASET_REPLY.to_string(),
                StatsView::Ready(stats) => self.answer(intent, stats),
            },
            _ => FALLBACK_REPLY.to_string(),
        }
    }

    fn answer(&self, intent: &Intent, stats: &StatisticsSnapshot) -> String {
        match intent {
            Intent::Total => format!("Your total expenses are {}.", self.money(stats.total_expenses)),
            Intent::Highest => format!(
                "Your highest expense is {} for {} on {}.",
                self.money(stats.highest_expense.amount),
                stats.highest_expense.category,
                display_date(stats.highest_expense.date)
            ),
            Intent::Lowest => format!(
                "Your lowest expense is {} for {} on {}.",
                self.money(stats.lowest_expense.amount),
                stats.lowest_expense.category,
                display_date(stats.lowest_expense.date)
            ),
            Intent::Average => format!("Your average expense is {}.", self.money(stats.average_expense)),
            Intent::Median => format!("Your median expense is {}.", self.money(stats.median_expense)),
            Intent::Category(query) => match stats.category_lookup(&query.name) {
                Some(found) => format!(
                    "You have spent {} on {}, with an average of {} per expense.",
                    self.money(found.total),
                    query.name,
                    self.money(found.average())
                ),
                None => format!(
                    "No expenses found for the category \"{}\". Please ensure the category name is correct.",
                    query.name
                ),
            },
            // data-independent intents are answered in `respond`
            _ => FALLBACK_REPLY.to_string(),
        }
    }

    fn money(&self, amount: Decimal) -> String {
        format_money(&self.currency, amount, self.decimal_places)
    }
}

// ==================== Tests ====================
