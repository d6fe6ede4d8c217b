//! The single current dataset and its replacement on upload

use chrono::{DateTime, Utc};
use expensebot_config::Config;
use expensebot_parser::{ExpenseRecord, ParseError, ParsedRecords, ParserRef, RowWarning};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

use crate::error::{CoreError, CoreResult};
use crate::reports::DatasetSummary;
use crate::stats::{StatisticsSnapshot, StatsView};

/// One uploaded record set together with the statistics derived from it
#[derive(Debug)]
pub struct Dataset {
    /// Increases by one with every successful upload
    pub version: u64,
    /// Original file name of the upload
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub records: Vec<ExpenseRecord>,
    /// `None` when the upload had no usable records
    pub snapshot: Option<StatisticsSnapshot>,
    pub warnings: Vec<RowWarning>,
}

impl Dataset {
    pub fn stats_view(&self) -> StatsView<'_> {
        match &self.snapshot {
            Some(snapshot) => StatsView::Ready(snapshot),
            None => StatsView::Empty,
        }
    }
}

/// Holder of the current dataset
///
/// Readers clone the current `Arc<Dataset>`, so a reader always sees records
/// and statistics from the same upload. Loads are serialized: a second upload
/// waits for the first to finish and then replaces it.
pub struct DatasetStore {
    config: Config,
    parser: ParserRef,
    current: RwLock<Option<Arc<Dataset>>>,
    writer: Mutex<()>,
}

impl DatasetStore {
    pub fn new(config: Config, parser: ParserRef) -> Self {
        Self {
            config,
            parser,
            current: RwLock::new(None),
            writer: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The dataset queries should read, if any upload has succeeded
    pub fn current(&self) -> Option<Arc<Dataset>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Run `f` against a view of the current statistics
    pub fn stats_view<R>(&self, f: impl FnOnce(StatsView<'_>) -> R) -> R {
        match self.current() {
            Some(dataset) => f(dataset.stats_view()),
            None => f(StatsView::NotLoaded),
        }
    }

    /// Version of the current dataset, 0 before the first upload
    pub fn version(&self) -> u64 {
        self.current().map(|d| d.version).unwrap_or(0)
    }

    /// Summary of the current dataset for the JSON API
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::new(self.current().as_deref(), &self.config.currency)
    }

    /// Parse a spooled upload and make it the current dataset
    ///
    /// On error the previous dataset stays current.
    pub async fn load_file(&self, path: PathBuf, source: &str) -> CoreResult<Arc<Dataset>> {
        let _writer = self.writer.lock().await;
        log::info!("Loading expenses from {} ({})", source, path.display());
        let parsed = self.parser.parse_file(path, self.config.ingest.invalid_amount).await;
        self.install(source, parsed)
    }

    /// Parse in-memory file content and make it the current dataset
    pub async fn load_bytes(&self, content: &[u8], source: &str) -> CoreResult<Arc<Dataset>> {
        let _writer = self.writer.lock().await;
        log::info!("Loading expenses from {} ({} bytes)", source, content.len());
        let parsed = self.parser.parse(content, self.config.ingest.invalid_amount).await;
        self.install(source, parsed)
    }

    fn install(&self, source: &str, parsed: Result<ParsedRecords, ParseError>) -> CoreResult<Arc<Dataset>> {
        let parsed = parsed.map_err(|e| {
            let error = CoreError::from(e);
            log::error!(target: "expensebot::error", "Failed to load {}: {}", source, error.to_details());
            error
        })?;

        for warning in &parsed.warnings {
            log::warn!("{} line {}: {}", source, warning.line, warning.message);
        }

        let snapshot = StatisticsSnapshot::compute(&parsed.records).map_err(|error| {
            log::error!(target: "expensebot::error", "Failed to load {}: {}", source, error.to_details());
            error
        })?;
        let dataset = Arc::new(Dataset {
            version: self.version() + 1,
            source: source.to_string(),
            loaded_at: Utc::now(),
            records: parsed.records,
            snapshot,
            warnings: parsed.warnings,
        });

        *self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::clone(&dataset));

        log::info!(
            "Dataset v{} installed from {}: {} records, {} warnings",
            dataset.version,
            dataset.source,
            dataset.records.len(),
            dataset.warnings.len()
        );

        Ok(dataset)
    }
}

// ==================== Tests ====================
