//! Health check, directories, search and the dashboard.

use crate::error::{ApiResult, ErrorBody};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::Json;
use portal_core::dashboard::DashboardSummary;
use portal_core::search::SearchResults;
use portal_core::DirectoryEntry;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Keyword; blank matches everything.
    #[serde(default)]
    pub q: String,
}

#[utoipa::path(get, path = "/health",
    responses((status = 200, description = "Health check response", body = HealthRes)))]
pub async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Portal REST API is alive".into(),
    })
}

#[utoipa::path(get, path = "/api/directory/patients",
    responses((status = 200, description = "Patient names by email", body = [DirectoryEntry])))]
pub async fn patient_directory(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DirectoryEntry>>> {
    state.signed_in().await?;
    Ok(Json(state.data.lock().await.patient_directory()))
}

#[utoipa::path(get, path = "/api/directory/doctors",
    responses((status = 200, description = "Doctor names by email", body = [DirectoryEntry])))]
pub async fn doctor_directory(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DirectoryEntry>>> {
    state.signed_in().await?;
    Ok(Json(state.data.lock().await.doctor_directory()))
}

#[utoipa::path(get, path = "/api/search", params(SearchQuery),
    responses((status = 200, description = "Matches per collection", body = SearchResults)))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResults>> {
    let viewer = state.signed_in().await?.viewer();
    Ok(Json(state.data.lock().await.search(&viewer, &query.q)))
}

#[utoipa::path(get, path = "/api/dashboard",
    responses(
        (status = 200, description = "Figures as of today", body = DashboardSummary),
        (status = 403, description = "Administrators only", body = ErrorBody)
    ))]
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardSummary>> {
    state.signed_in().await?;
    let today = chrono::Local::now().date_naive();
    Ok(Json(state.data.lock().await.dashboard(today)))
}
