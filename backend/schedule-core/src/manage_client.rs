// src/manage_client.rs

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use chrono::NaiveDate;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::ManageConfig;
use crate::schedule_entry::RawEntry;

pub const SCHEDULE_ENTRIES_ENDPOINT: &str = "/schedule/entries";
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const CLIENT_ID_HEADER: &str = "clientId";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// --- Schedule API Error Type ---
#[derive(Error, Debug)]
pub enum ManageError {
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    #[error("JSON processing error")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error")]
    UrlParse(#[from] url::ParseError),

    #[error("Rate limit exceeded (Status 429)")]
    RateLimitExceeded,

    // Use this for non-429 API errors
    #[error("Schedule API error: Status={status}, Message='{message}'")]
    ApiError { status: StatusCode, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// Error body returned by the API on non-success responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageErrorPayload {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Source of schedule entries for one member.
///
/// One call returns one page; callers do not paginate or retry.
#[async_trait]
pub trait ScheduleQuery: Send + Sync {
    async fn schedule_entries(
        &self,
        conditions: &str,
        page_size: u32,
    ) -> Result<Vec<RawEntry>, ManageError>;
}

/// Filter expression selecting a member's entries from `start_date` onwards.
///
/// The date is pulled back one day so entries that start late on the previous
/// UTC day but fall on `start_date` locally are still returned.
pub fn build_conditions(member_identifier: &str, start_date: NaiveDate) -> String {
    let from = start_date.pred_opt().unwrap_or(start_date);
    let member = member_identifier.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "member/identifier = \"{}\" AND dateStart >= [{}]",
        member,
        from.format("%Y-%m-%d")
    )
}

pub fn basic_auth_value(config: &ManageConfig) -> String {
    let credentials = format!(
        "{}+{}:{}",
        config.company_id, config.public_key, config.private_key
    );
    format!("Basic {}", BASE64_STANDARD.encode(credentials))
}

#[derive(Clone)]
pub struct ManageClient {
    config: Arc<ManageConfig>,
    http_client: Client,
    auth_header: String,
}

impl ManageClient {
    pub fn new(config: ManageConfig) -> Result<Self, ManageError> {
        if config.base_url.is_empty() {
            return Err(ManageError::ConfigError(
                "Schedule API base URL is empty".to_string(),
            ));
        }
        // Fail early on a base URL that can never produce a request
        Url::parse(&config.base_url)?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let auth_header = basic_auth_value(&config);

        Ok(Self {
            config: Arc::new(config),
            http_client,
            auth_header,
        })
    }

    pub fn endpoint_url(
        &self,
        endpoint: &str,
        query_params: &[(&str, String)],
    ) -> Result<Url, ManageError> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Ok(Url::parse_with_params(&url, query_params)?)
    }

    pub fn build_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(AUTHORIZATION, &self.auth_header)
            .header(CLIENT_ID_HEADER, &self.config.client_id)
            .header(ACCEPT, "application/json")
    }

    pub async fn send_and_deserialize<T: DeserializeOwned>(
        &self,
        request_builder: RequestBuilder,
        context_msg: &str,
    ) -> Result<T, ManageError> {
        let request = request_builder.build()?;
        let request_url = request.url().to_string();
        debug!(
            "Sending request for '{}' to URL: {}",
            context_msg, request_url
        );

        let resp = match self.http_client.execute(request).await {
            Ok(resp) => resp,
            Err(e) => {
                // Network, DNS, timeout etc.
                error!(
                    "HTTP execution failed before receiving response for '{}' (URL: {}): {}",
                    context_msg, request_url, e
                );
                return Err(ManageError::Request(e));
            }
        };

        let status = resp.status();
        info!(
            "Received response for '{}' (URL: {}): Status={}",
            context_msg, request_url, status
        );

        if status.is_success() {
            let bytes = resp.bytes().await?;
            return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                error!(
                    "JSON deserialization failed for '{}' (URL: {}): {}",
                    context_msg, request_url, e
                );
                ManageError::Json(e)
            });
        }

        let error_body = resp
            .text()
            .await
            .unwrap_or_else(|e| format!("Failed to read error body: {}", e));
        error!(
            "API Error Response: Status={}, Body='{}' for URL: {}",
            status, error_body, request_url
        );

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(
                "Rate limit exceeded for '{}' (URL: {})",
                context_msg, request_url
            );
            return Err(ManageError::RateLimitExceeded);
        }

        Err(ManageError::ApiError {
            status,
            message: error_message(&error_body),
        })
    }
}

// Prefer the API's own message, fall back to the raw body
pub fn error_message(error_body: &str) -> String {
    match serde_json::from_str::<ManageErrorPayload>(error_body) {
        Ok(ManageErrorPayload {
            message: Some(message),
            ..
        }) => message,
        _ => error_body.to_string(),
    }
}

#[async_trait]
impl ScheduleQuery for ManageClient {
    async fn schedule_entries(
        &self,
        conditions: &str,
        page_size: u32,
    ) -> Result<Vec<RawEntry>, ManageError> {
        let url = self.endpoint_url(
            SCHEDULE_ENTRIES_ENDPOINT,
            &[
                ("conditions", conditions.to_string()),
                ("pageSize", page_size.to_string()),
            ],
        )?;
        let request = self.build_request(Method::GET, url);
        let entries: Vec<RawEntry> = self
            .send_and_deserialize(request, "schedule entries")
            .await?;
        debug!("Fetched {} schedule entries", entries.len());
        Ok(entries)
    }
}
