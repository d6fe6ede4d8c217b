//! CSV upload endpoint
//!
//! Expects a multipart form with a `file` field holding a `.csv` file.
//! The bytes are spooled to a temporary file in the configured spool
//! directory, ingested, and the spool file is removed when the handler
//! returns.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use expensebot_core::{CoreError, Dataset};
use std::path::Path;
use tempfile::NamedTempFile;

use super::ChatResponse;
use crate::{ApiError, AppState};

pub const ACKNOWLEDGEMENT: &str = "CSV file is being processed. Please wait a moment.....Done!! Now you can ask me about - Total Expense, Highest Expense, Lowest Expense, Average Expense, and Median Expense.";
pub const NO_FILE: &str = "No file uploaded.";
pub const NOT_CSV: &str = "Please upload a CSV file.";

/// A file field pulled out of the multipart form
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

/// POST /upload-csv
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ChatResponse>, ApiError> {
    let upload = read_upload(&mut multipart).await?.ok_or_else(|| ApiError::bad_request(NO_FILE))?;

    log::info!("Upload received: {} ({} bytes)", upload.file_name, upload.bytes.len());

    if !is_csv(&upload.file_name) {
        log::warn!("Rejected non-CSV upload {}", upload.file_name);
        return Err(CoreError::UnsupportedFile { name: upload.file_name }.into());
    }

    // removed on drop, whichever way ingestion goes
    let spool = spool_upload(&state.config.upload.spool_dir, &upload.bytes).await?;
    let dataset = state
        .store
        .load_file(spool.path().to_path_buf(), &upload.file_name)
        .await?;

    Ok(Json(ChatResponse {
        response: acknowledgement(&dataset),
    }))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Option<Upload>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some(Upload {
            file_name,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

fn multipart_error(error: MultipartError) -> ApiError {
    log::warn!("Malformed upload: {}", error);
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::bad_request(format!("Failed to read upload: {}", error))
    }
}

/// Whether the file name carries a `.csv` extension, in any case
pub fn is_csv(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

async fn spool_upload(dir: &Path, bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    tokio::fs::create_dir_all(dir).await?;
    let spool = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(".csv")
        .tempfile_in(dir)?;
    tokio::fs::write(spool.path(), bytes).await?;
    log::debug!("Spooled {} bytes to {}", bytes.len(), spool.path().display());
    Ok(spool)
}

fn acknowledgement(dataset: &Dataset) -> String {
    if dataset.records.is_empty() {
        return format!("{} Note: the file did not contain any usable expense records.", ACKNOWLEDGEMENT);
    }
    let adjusted = dataset.warnings.iter().filter(|w| w.kind.adjusts_amount()).count();
    match adjusted {
        0 => ACKNOWLEDGEMENT.to_string(),
        1 => format!("{} Note: 1 row was skipped or adjusted.", ACKNOWLEDGEMENT),
        n => format!("{} Note: {} rows were skipped or adjusted.", ACKNOWLEDGEMENT, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_csv() {
        assert!(is_csv("expenses.csv"));
        assert!(is_csv("EXPENSES.CSV"));
        assert!(is_csv("my.data.Csv"));
        assert!(!is_csv("expenses.txt"));
        assert!(!is_csv("csv"));
        assert!(!is_csv("expenses.csv.exe"));
    }
}
