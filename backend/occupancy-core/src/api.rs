// src/api.rs
//
// HTTP surface over the engine. Handlers lock the shared state, call into
// the engine, and write the snapshot after mutations.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::dashboard::{
    consultant_occupancy, team_overview, trend_series, ConsultantFilter, ConsultantOccupancy, TeamOverview,
    TrendPoint,
};
use crate::export::{planning_csv, planning_file_name, ExportError};
use crate::insights::{InsightsClient, InsightsError, OccupancySummary};
use crate::model::{
    new_record_id, Absence, AppSettings, Assignment, Consultant, DefaultView, PeriodRecord, Project,
};
use crate::period::{Period, PeriodInfo, PeriodParseError};
use crate::planning::{CopySummary, ResetSummary};
use crate::remote::{copy_period_synced, reset_period_synced, RecordStore, StoreError};
use crate::state::{AppState, StateError};

// --- Error Handling ---

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidInput(String),
    #[error("Invalid period: {0}")]
    Period(#[from] PeriodParseError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Insights(#[from] InsightsError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::Period(_) => StatusCode::BAD_REQUEST,
            AppError::State(StateError::RecordNotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::State(StateError::DuplicateId { .. }) => StatusCode::CONFLICT,
            AppError::State(StateError::InvalidSettings(_)) => StatusCode::BAD_REQUEST,
            AppError::State(StateError::Io(_)) | AppError::State(StateError::Json(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Store(_) => StatusCode::BAD_GATEWAY,
            AppError::Insights(InsightsError::MissingApiKey) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Insights(_) => StatusCode::BAD_GATEWAY,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

// --- Shared State ---

#[derive(Clone)]
pub struct ApiState {
    pub state: Arc<Mutex<AppState>>,
    pub snapshot_path: Option<PathBuf>,
    pub insights: Option<Arc<InsightsClient>>,
    pub remote: Option<Arc<dyn RecordStore>>,
}

impl ApiState {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            snapshot_path: None,
            insights: None,
            remote: None,
        }
    }

    pub fn with_snapshot_path(mut self, path: PathBuf) -> Self {
        self.snapshot_path = Some(path);
        self
    }

    pub fn with_insights(mut self, client: InsightsClient) -> Self {
        self.insights = Some(Arc::new(client));
        self
    }

    pub fn with_remote(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.remote = Some(store);
        self
    }

    /// Write the snapshot after a mutation. A failed write is logged and the
    /// request still succeeds; the in-memory state stays authoritative.
    fn persist(&self, state: &AppState) {
        if let Some(path) = &self.snapshot_path {
            if let Err(e) = state.save_snapshot(path) {
                error!("Failed to persist state to {}: {}", path.display(), e);
            }
        }
    }
}

pub fn router(api_state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/settings", get(handle_get_settings).put(handle_put_settings))
        .route("/consultants", get(handle_list_consultants).post(handle_create_consultant))
        .route(
            "/consultants/{id}",
            put(handle_update_consultant).delete(handle_delete_consultant),
        )
        .route("/consultants/{id}/occupancy", get(handle_consultant_occupancy))
        .route("/projects", get(handle_list_projects).post(handle_create_project))
        .route("/projects/{id}", put(handle_update_project).delete(handle_delete_project))
        .route("/assignments", get(handle_list_assignments).post(handle_create_assignment))
        .route(
            "/assignments/{id}",
            put(handle_update_assignment).delete(handle_delete_assignment),
        )
        .route("/absences", get(handle_list_absences).post(handle_create_absence))
        .route("/absences/{id}", put(handle_update_absence).delete(handle_delete_absence))
        .route("/periods/format", get(handle_format_period))
        .route("/periods/reset", post(handle_reset_period))
        .route("/periods/copy", post(handle_copy_period))
        .route("/occupancy", get(handle_team_occupancy))
        .route("/trend", get(handle_trend))
        .route("/planning/{period}/export.csv", get(handle_export_planning))
        .route("/insights", post(handle_insights));

    Router::new()
        .route("/status", get(handle_status))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(api_state)
}

// --- Helpers ---

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Explicit period key, or the current period in the configured default view.
fn resolve_period(raw: Option<&str>, settings: &AppSettings) -> Result<Period, AppError> {
    match raw {
        Some(key) => Ok(key.parse()?),
        None => Ok(Period::from_date(
            today(),
            settings.default_view == DefaultView::Weekly,
            None,
        )),
    }
}

fn parse_period(raw: &str) -> Result<Period, AppError> {
    Ok(raw.parse()?)
}

fn ensure_id(id: &mut String) {
    if id.is_empty() {
        *id = new_record_id();
    }
}

// --- Status ---

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: String,
    pub server_time: String,
    pub consultants: usize,
    pub projects: usize,
    pub assignments: usize,
    pub absences: usize,
    pub remote_store: bool,
    pub insights: bool,
}

async fn handle_status(State(api): State<ApiState>) -> Json<StatusResponse> {
    info!("Handling /status request");
    let state = api.state.lock().await;
    Json(StatusResponse {
        status: "ok".to_string(),
        server_time: Local::now().to_rfc3339(),
        consultants: state.consultants.len(),
        projects: state.projects.len(),
        assignments: state.assignments.len(),
        absences: state.absences.len(),
        remote_store: api.remote.is_some(),
        insights: api.insights.is_some(),
    })
}

// --- Settings ---

async fn handle_get_settings(State(api): State<ApiState>) -> Json<AppSettings> {
    Json(api.state.lock().await.settings.clone())
}

async fn handle_put_settings(
    State(api): State<ApiState>,
    Json(settings): Json<AppSettings>,
) -> Result<Json<AppSettings>, AppError> {
    let mut state = api.state.lock().await;
    state.save_settings(settings)?;
    api.persist(&state);
    Ok(Json(state.settings.clone()))
}

// --- Consultants ---

async fn handle_list_consultants(State(api): State<ApiState>) -> Json<Vec<Consultant>> {
    Json(api.state.lock().await.consultants.clone())
}

async fn handle_create_consultant(
    State(api): State<ApiState>,
    Json(mut consultant): Json<Consultant>,
) -> Result<(StatusCode, Json<Consultant>), AppError> {
    ensure_id(&mut consultant.id);
    let mut state = api.state.lock().await;
    state.add_consultant(consultant.clone())?;
    info!("Created consultant {} ({})", consultant.id, consultant.name);
    api.persist(&state);
    Ok((StatusCode::CREATED, Json(consultant)))
}

async fn handle_update_consultant(
    State(api): State<ApiState>,
    Path(id): Path<String>,
    Json(mut consultant): Json<Consultant>,
) -> Result<Json<Consultant>, AppError> {
    consultant.id = id;
    let mut state = api.state.lock().await;
    state.update_consultant(consultant.clone())?;
    api.persist(&state);
    Ok(Json(consultant))
}

async fn handle_delete_consultant(
    State(api): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut state = api.state.lock().await;
    let removed = state.remove_consultant(&id)?;
    info!("Removed consultant {} ({})", removed.id, removed.name);
    api.persist(&state);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewQuery {
    pub period: Option<String>,
    pub weekly: Option<bool>,
    pub include_tentative: Option<bool>,
}

async fn handle_consultant_occupancy(
    State(api): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<ConsultantOccupancy>, AppError> {
    let state = api.state.lock().await;
    let consultant = state.consultant(&id).ok_or_else(|| StateError::RecordNotFound {
        kind: "consultant",
        id: id.clone(),
    })?;
    let period = resolve_period(query.period.as_deref(), &state.settings)?;
    let is_weekly = query.weekly.unwrap_or_else(|| period.is_week());
    let include_tentative = query
        .include_tentative
        .unwrap_or(state.settings.include_tentative_by_default);
    Ok(Json(consultant_occupancy(
        &state,
        consultant,
        &period,
        is_weekly,
        include_tentative,
    )))
}

// --- Projects ---

async fn handle_list_projects(State(api): State<ApiState>) -> Json<Vec<Project>> {
    Json(api.state.lock().await.projects.clone())
}

async fn handle_create_project(
    State(api): State<ApiState>,
    Json(mut project): Json<Project>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    ensure_id(&mut project.id);
    let mut state = api.state.lock().await;
    state.add_project(project.clone())?;
    info!("Created project {} ({})", project.id, project.name);
    api.persist(&state);
    Ok((StatusCode::CREATED, Json(project)))
}

async fn handle_update_project(
    State(api): State<ApiState>,
    Path(id): Path<String>,
    Json(mut project): Json<Project>,
) -> Result<Json<Project>, AppError> {
    project.id = id;
    let mut state = api.state.lock().await;
    state.update_project(project.clone())?;
    api.persist(&state);
    Ok(Json(project))
}

async fn handle_delete_project(
    State(api): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut state = api.state.lock().await;
    state.remove_project(&id)?;
    api.persist(&state);
    Ok(StatusCode::NO_CONTENT)
}

// --- Assignments & Absences ---

#[derive(Debug, Default, Deserialize)]
pub struct PeriodFilter {
    pub period: Option<String>,
}

/// Records filed under exactly the requested period, or all of them.
fn filter_by_period<R: PeriodRecord>(records: &[R], filter: &PeriodFilter) -> Result<Vec<R>, AppError> {
    match filter.period.as_deref() {
        None => Ok(records.to_vec()),
        Some(raw) => {
            let period = parse_period(raw)?;
            Ok(records.iter().filter(|r| *r.period() == period).cloned().collect())
        }
    }
}

async fn handle_list_assignments(
    State(api): State<ApiState>,
    Query(filter): Query<PeriodFilter>,
) -> Result<Json<Vec<Assignment>>, AppError> {
    let state = api.state.lock().await;
    Ok(Json(filter_by_period(&state.assignments, &filter)?))
}

async fn handle_create_assignment(
    State(api): State<ApiState>,
    Json(mut assignment): Json<Assignment>,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    ensure_id(&mut assignment.id);
    let mut state = api.state.lock().await;
    state.add_assignment(assignment.clone())?;
    info!(
        "Created assignment {} ({}h of {} on {} in {})",
        assignment.id, assignment.hours, assignment.consultant_id, assignment.project_id, assignment.period
    );
    api.persist(&state);
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn handle_update_assignment(
    State(api): State<ApiState>,
    Path(id): Path<String>,
    Json(mut assignment): Json<Assignment>,
) -> Result<Json<Assignment>, AppError> {
    assignment.id = id;
    let mut state = api.state.lock().await;
    state.update_assignment(assignment.clone())?;
    api.persist(&state);
    Ok(Json(assignment))
}

async fn handle_delete_assignment(
    State(api): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut state = api.state.lock().await;
    state.remove_assignment(&id)?;
    api.persist(&state);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_list_absences(
    State(api): State<ApiState>,
    Query(filter): Query<PeriodFilter>,
) -> Result<Json<Vec<Absence>>, AppError> {
    let state = api.state.lock().await;
    Ok(Json(filter_by_period(&state.absences, &filter)?))
}

async fn handle_create_absence(
    State(api): State<ApiState>,
    Json(mut absence): Json<Absence>,
) -> Result<(StatusCode, Json<Absence>), AppError> {
    ensure_id(&mut absence.id);
    let mut state = api.state.lock().await;
    state.add_absence(absence.clone())?;
    info!(
        "Created absence {} ({}h {:?} for {} in {})",
        absence.id, absence.hours, absence.category, absence.consultant_id, absence.period
    );
    api.persist(&state);
    Ok((StatusCode::CREATED, Json(absence)))
}

async fn handle_update_absence(
    State(api): State<ApiState>,
    Path(id): Path<String>,
    Json(mut absence): Json<Absence>,
) -> Result<Json<Absence>, AppError> {
    absence.id = id;
    let mut state = api.state.lock().await;
    state.update_absence(absence.clone())?;
    api.persist(&state);
    Ok(Json(absence))
}

async fn handle_delete_absence(
    State(api): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut state = api.state.lock().await;
    state.remove_absence(&id)?;
    api.persist(&state);
    Ok(StatusCode::NO_CONTENT)
}

// --- Periods ---

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    pub date: NaiveDate,
    #[serde(default)]
    pub weekly: bool,
    pub week: Option<u32>,
}

async fn handle_format_period(Query(query): Query<FormatQuery>) -> Result<Json<PeriodInfo>, AppError> {
    let period = Period::try_from_date(query.date, query.weekly, query.week)?;
    Ok(Json(period.info()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    pub period: Period,
    pub is_weekly: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRequest {
    pub from: Period,
    pub to: Period,
    pub is_weekly: Option<bool>,
}

async fn handle_reset_period(
    State(api): State<ApiState>,
    Json(request): Json<ResetRequest>,
) -> Result<Json<ResetSummary>, AppError> {
    let is_weekly = request.is_weekly.unwrap_or_else(|| request.period.is_week());
    let mut state = api.state.lock().await;
    let summary = match &api.remote {
        Some(store) => reset_period_synced(&mut state, store.as_ref(), &request.period, is_weekly).await?,
        None => state.reset_period(&request.period, is_weekly),
    };
    api.persist(&state);
    Ok(Json(summary))
}

async fn handle_copy_period(
    State(api): State<ApiState>,
    Json(request): Json<CopyRequest>,
) -> Result<Json<CopySummary>, AppError> {
    if request.from.is_week() != request.to.is_week() {
        return Err(AppError::InvalidInput(format!(
            "cannot copy between a month and a week ({} -> {})",
            request.from, request.to
        )));
    }
    let is_weekly = request.is_weekly.unwrap_or_else(|| request.from.is_week());
    let mut state = api.state.lock().await;
    let summary = match &api.remote {
        Some(store) => {
            copy_period_synced(&mut state, store.as_ref(), &request.from, &request.to, is_weekly).await?
        }
        None => state.copy_period(&request.from, &request.to, is_weekly),
    };
    api.persist(&state);
    Ok(Json(summary))
}

// --- Dashboard ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyQuery {
    pub period: Option<String>,
    pub weekly: Option<bool>,
    pub include_tentative: Option<bool>,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub only_overloaded: bool,
    #[serde(default)]
    pub only_available: bool,
}

async fn handle_team_occupancy(
    State(api): State<ApiState>,
    Query(query): Query<OccupancyQuery>,
) -> Result<Json<TeamOverview>, AppError> {
    let state = api.state.lock().await;
    let period = resolve_period(query.period.as_deref(), &state.settings)?;
    let is_weekly = query.weekly.unwrap_or_else(|| period.is_week());
    let include_tentative = query
        .include_tentative
        .unwrap_or(state.settings.include_tentative_by_default);
    let filter = ConsultantFilter {
        search: query.search,
        only_overloaded: query.only_overloaded,
        only_available: query.only_available,
    };
    Ok(Json(team_overview(&state, &period, is_weekly, include_tentative, &filter)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendQuery {
    pub date: Option<NaiveDate>,
    pub weekly: Option<bool>,
    pub include_tentative: Option<bool>,
    /// Comma-separated consultant ids.
    #[serde(default)]
    pub consultants: String,
}

async fn handle_trend(
    State(api): State<ApiState>,
    Query(query): Query<TrendQuery>,
) -> Json<Vec<TrendPoint>> {
    let state = api.state.lock().await;
    let anchor = query.date.unwrap_or_else(today);
    let is_weekly = query
        .weekly
        .unwrap_or(state.settings.default_view == DefaultView::Weekly);
    let include_tentative = query
        .include_tentative
        .unwrap_or(state.settings.include_tentative_by_default);
    let selected: Vec<String> = query
        .consultants
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    Json(trend_series(&state, anchor, is_weekly, include_tentative, &selected))
}

// --- Export ---

async fn handle_export_planning(
    State(api): State<ApiState>,
    Path(raw_period): Path<String>,
) -> Result<Response, AppError> {
    let period = parse_period(&raw_period)?;
    let body = {
        let state = api.state.lock().await;
        planning_csv(&state, &period)?
    };
    info!("Exported planning sheet for {}", period);
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", planning_file_name(&period)),
        ),
    ];
    Ok((headers, body).into_response())
}

// --- Insights ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest {
    pub period: Option<String>,
    pub is_weekly: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub summary: serde_json::Value,
    pub text: String,
}

async fn handle_insights(
    State(api): State<ApiState>,
    Json(request): Json<InsightsRequest>,
) -> Result<Json<InsightsResponse>, AppError> {
    let client = api.insights.clone().ok_or(InsightsError::MissingApiKey)?;
    // Lock released before the outbound call.
    let summary = {
        let state = api.state.lock().await;
        let period = resolve_period(request.period.as_deref(), &state.settings)?;
        let is_weekly = request.is_weekly.unwrap_or_else(|| period.is_week());
        OccupancySummary::from_state(&state, &period, is_weekly)
    };
    let text = client.occupancy_insights(&summary).await?;
    let summary = serde_json::to_value(&summary).map_err(InsightsError::from)?;
    Ok(Json(InsightsResponse { summary, text }))
}
