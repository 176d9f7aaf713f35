// src/error.rs
use axum::http::StatusCode as AxumStatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::manage_client::ManageError;

// --- Core aggregation errors ---
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Entry {entry_id} has an invalid {field} '{value}'")]
    InvalidDate {
        entry_id: i64,
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

// --- Application-level errors ---
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Schedule API client error")]
    Manage(#[from] ManageError),
    #[error("Schedule aggregation failed")]
    Schedule(#[from] ScheduleError),
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        error!("Error occurred: {:?}", self);
        let (status_code, error_message) = match &self {
            AppError::Config(_) => (
                AxumStatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error.".to_string(),
            ),
            AppError::BadRequest(msg) => (AxumStatusCode::BAD_REQUEST, msg.clone()),
            AppError::Manage(manage_err) => match manage_err {
                ManageError::RateLimitExceeded => (
                    AxumStatusCode::TOO_MANY_REQUESTS,
                    "Schedule API rate limit exceeded. Please try again later.".to_string(),
                ),
                ManageError::ApiError { status, message } => {
                    error!("Schedule API Error: Status={}, Msg={}", status, message);
                    (
                        AxumStatusCode::BAD_GATEWAY,
                        "An error occurred while communicating with the schedule API.".to_string(),
                    )
                }
                ManageError::ConfigError(_) => (
                    AxumStatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error.".to_string(),
                ),
                _ => (
                    AxumStatusCode::BAD_GATEWAY,
                    "Failed to fetch schedule entries.".to_string(),
                ),
            },
            AppError::Schedule(ScheduleError::UnknownTimezone(tz)) => (
                AxumStatusCode::BAD_REQUEST,
                format!("Unknown timezone: {}", tz),
            ),
            AppError::Schedule(schedule_err @ ScheduleError::InvalidDate { .. }) => (
                AxumStatusCode::BAD_GATEWAY,
                format!("Schedule API returned malformed data: {}", schedule_err),
            ),
            AppError::Io(_) | AppError::Csv(_) => (
                AxumStatusCode::INTERNAL_SERVER_ERROR,
                "Server file I/O error.".to_string(),
            ),
            AppError::TlsConfig(_) => (
                AxumStatusCode::INTERNAL_SERVER_ERROR,
                "Server TLS configuration error.".to_string(),
            ),
        };

        (status_code, Json(json!({ "error": error_message }))).into_response()
    }
}
