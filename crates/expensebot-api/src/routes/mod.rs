//! Route modules for the API server
//!
//! - upload: CSV upload and ingestion
//! - chat: chat messages answered from the current dataset
//! - summary: JSON summary of the current dataset

pub mod chat;
pub mod summary;
pub mod upload;

use serde::{Deserialize, Serialize};

/// Body of every upload and chat reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
