//! Chat endpoint

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::ChatResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Answer one chat message against the current dataset
pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Json<ChatResponse> {
    let response = state
        .store
        .stats_view(|view| state.resolver.resolve(&request.message, view));

    Json(ChatResponse { response })
}
