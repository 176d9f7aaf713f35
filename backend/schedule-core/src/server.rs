// src/server.rs
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::normalizer::parse_timezone;
use crate::schedule_service::{ScheduleReport, ScheduleService};

#[derive(Clone)]
pub struct AppState {
    pub schedule_service: Arc<ScheduleService>,
    pub default_timezone: Tz,
}

#[derive(Deserialize, Debug)]
pub struct ScheduleParams {
    pub member: String,
    pub start_date: NaiveDate,
    pub timezone: Option<String>,
}

impl ScheduleParams {
    fn resolve_timezone(&self, default_timezone: Tz) -> Result<Tz, AppError> {
        match &self.timezone {
            Some(name) => Ok(parse_timezone(name)?),
            None => Ok(default_timezone),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/schedule", get(handle_get_schedule))
        .route("/schedule/ticket-hours", get(handle_get_ticket_hours));

    Router::new()
        .nest("/api", api_routes)
        .route("/status", get(handle_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fetch_report(state: &AppState, params: &ScheduleParams) -> Result<ScheduleReport, AppError> {
    if params.member.trim().is_empty() {
        return Err(AppError::BadRequest("member must not be empty".to_string()));
    }
    let timezone = params.resolve_timezone(state.default_timezone)?;
    state
        .schedule_service
        .get_schedule(&params.member, params.start_date, timezone)
        .await
}

async fn handle_get_schedule(
    State(state): State<AppState>,
    Query(params): Query<ScheduleParams>,
) -> Result<Json<ScheduleReport>, AppError> {
    info!("Handling schedule request for member {}", params.member);
    Ok(Json(fetch_report(&state, &params).await?))
}

async fn handle_get_ticket_hours(
    State(state): State<AppState>,
    Query(params): Query<ScheduleParams>,
) -> Result<Json<BTreeMap<i64, f64>>, AppError> {
    info!("Handling ticket hours request for member {}", params.member);
    Ok(Json(fetch_report(&state, &params).await?.ticket_hours))
}

async fn handle_status() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Serves `app` over TLS when a certificate and key are configured, plain HTTP otherwise.
pub async fn serve(app: Router, config: &ServerConfig) -> Result<(), AppError> {
    let addr = config.socket_addr()?;

    match config.tls_paths() {
        Some((cert_path, key_path)) => {
            let tls_config = RustlsConfig::from_pem_file(&cert_path, &key_path)
                .await
                .map_err(|e| {
                    let err_msg = format!("Failed to load TLS cert/key: {}", e);
                    error!("{}", err_msg);
                    AppError::TlsConfig(err_msg)
                })?;
            info!(
                "TLS configuration loaded from {} and {}",
                cert_path.display(),
                key_path.display()
            );
            info!("Starting server on https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("Starting server on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
