use std::path::PathBuf;
use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use chrono::SecondsFormat;
use serde::Serialize;
use crate::config::Config;
use crate::render::template;
use crate::render::view::DashboardView;
use crate::status::aggregator;
use shared::protocol::{API_SERVICES_PATH, DASHBOARD_PATH, HEALTH_PATH};
use shared::types::{OperationalStatus, ServiceStatus};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Dashboard template candidates, re-read on every page request
    pub template_paths: Arc<Vec<PathBuf>>,
}

impl AppState {
    pub fn new(config: Config, template_paths: Vec<PathBuf>) -> Self {
        Self {
            config: Arc::new(config),
            template_paths: Arc::new(template_paths),
        }
    }
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub services: Vec<ServiceStatus>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
    pub operational: OperationalStatus,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(DASHBOARD_PATH, get(get_dashboard))
        .route(API_SERVICES_PATH, get(get_services))
        .route(HEALTH_PATH, get(get_health))
        .with_state(state)
}

async fn get_dashboard(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, String)> {
    let snapshot = aggregator::aggregate(&state.config.services, state.config.probe_timeout()).await;
    let view = DashboardView::new(state.config.title.clone(), &snapshot);

    let template = template::locate(&state.template_paths).map_err(|e| {
        tracing::error!("Failed to load dashboard template: {:#}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    template.render(&view).map(Html).map_err(|e| {
        tracing::error!("Failed to render dashboard: {:#}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Template execution error: {}", e),
        )
    })
}

async fn get_services(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = aggregator::aggregate(&state.config.services, state.config.probe_timeout()).await;

    Json(StatusResponse {
        services: snapshot.services().to_vec(),
        last_updated: snapshot
            .generated_at()
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        operational: snapshot.operational_status(),
    })
}

async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
