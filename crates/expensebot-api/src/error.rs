//! Error types for expensebot-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use expensebot_core::CoreError;
use thiserror::Error;

use crate::routes::upload::NOT_CSV;
use crate::routes::ChatResponse;

/// Reply sent when ingestion fails on the server side
pub const PROCESSING_FAILED: &str = "Failed to process the CSV file. Please try again.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    Unprocessable { message: String },

    #[error("The uploaded file is too large.")]
    PayloadTooLarge,

    #[error("{message}")]
    InternalError { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ChatResponse { response: self.to_string() };
        (self.status(), Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::UnsupportedFile { .. } => ApiError::bad_request(NOT_CSV),
            CoreError::ParseError { .. } | CoreError::InvalidAmount { .. } | CoreError::AmountOverflow => {
                ApiError::Unprocessable {
                    message: error.to_string(),
                }
            }
            _ if error.is_client_error() => ApiError::BadRequest {
                message: error.to_string(),
            },
            _ => ApiError::InternalError {
                message: PROCESSING_FAILED.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(error: std::io::Error) -> Self {
        log::error!(target: "expensebot::error", "upload spool failed: {}", error);
        ApiError::InternalError {
            message: PROCESSING_FAILED.to_string(),
        }
    }
}
