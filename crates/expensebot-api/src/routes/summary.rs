//! Dataset summary endpoint

use axum::extract::State;
use axum::Json;
use expensebot_core::DatasetSummary;

use crate::AppState;

/// Get dataset summary (JSON API)
pub async fn api_summary(State(state): State<AppState>) -> Json<DatasetSummary> {
    Json(state.store.summary())
}
