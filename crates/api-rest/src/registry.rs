//! Reference data: hospitals, doctors, services and locations.
//!
//! Every signed-in role may read these; writes are for administrators.

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use portal_core::repositories::doctors::{Doctor, DoctorPatch, NewDoctor};
use portal_core::repositories::hospitals::{Hospital, HospitalPatch, NewHospital};
use portal_core::repositories::locations::{Location, LocationPatch, NewLocation};
use portal_core::repositories::services::{NewService, Service, ServicePatch};
use portal_core::HospitalRemoval;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DoctorQuery {
    /// Only doctors attached to this hospital.
    pub hospital_id: Option<String>,
}

#[utoipa::path(get, path = "/api/hospitals",
    responses((status = 200, description = "All hospitals", body = [Hospital])))]
pub async fn list_hospitals(State(state): State<AppState>) -> ApiResult<Json<Vec<Hospital>>> {
    state.signed_in().await?;
    Ok(Json(state.data.lock().await.hospitals().all().to_vec()))
}

#[utoipa::path(get, path = "/api/hospitals/{id}",
    params(("id" = String, Path, description = "Hospital id, e.g. H001")),
    responses(
        (status = 200, description = "The hospital", body = Hospital),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn get_hospital(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Hospital>> {
    state.signed_in().await?;
    let data = state.data.lock().await;
    data.hospitals()
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Hospital", &id))
}

#[utoipa::path(post, path = "/api/hospitals", request_body = NewHospital,
    responses(
        (status = 201, description = "Created", body = Hospital),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 409, description = "Name already used", body = ErrorBody)
    ))]
pub async fn create_hospital(
    State(state): State<AppState>,
    Json(req): Json<NewHospital>,
) -> ApiResult<(StatusCode, Json<Hospital>)> {
    let viewer = state.signed_in().await?.viewer();
    let created = state.data.lock().await.create_hospital(&viewer, req)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/hospitals/{id}", request_body = HospitalPatch,
    params(("id" = String, Path, description = "Hospital id")),
    responses(
        (status = 200, description = "Updated", body = Hospital),
        (status = 404, description = "Unknown id", body = ErrorBody),
        (status = 409, description = "Name already used", body = ErrorBody)
    ))]
pub async fn update_hospital(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<HospitalPatch>,
) -> ApiResult<Json<Hospital>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state.data.lock().await.update_hospital(&viewer, &id, req)?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/api/hospitals/{id}",
    params(("id" = String, Path, description = "Hospital id")),
    responses(
        (status = 200, description = "Removed; attached doctors were detached", body = HospitalRemoval),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn delete_hospital(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<HospitalRemoval>> {
    let viewer = state.signed_in().await?.viewer();
    let removal = state.data.lock().await.delete_hospital(&viewer, &id)?;
    Ok(Json(removal))
}

#[utoipa::path(get, path = "/api/doctors", params(DoctorQuery),
    responses((status = 200, description = "Doctors", body = [Doctor])))]
pub async fn list_doctors(
    State(state): State<AppState>,
    Query(query): Query<DoctorQuery>,
) -> ApiResult<Json<Vec<Doctor>>> {
    state.signed_in().await?;
    let data = state.data.lock().await;
    let doctors = match query.hospital_id.as_deref().map(str::trim) {
        Some(hospital_id) if !hospital_id.is_empty() => data
            .doctors()
            .by_hospital(hospital_id)
            .into_iter()
            .cloned()
            .collect(),
        _ => data.doctors().all().to_vec(),
    };
    Ok(Json(doctors))
}

#[utoipa::path(get, path = "/api/doctors/{id}",
    params(("id" = String, Path, description = "Doctor id, e.g. D001")),
    responses(
        (status = 200, description = "The doctor", body = Doctor),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Doctor>> {
    state.signed_in().await?;
    let data = state.data.lock().await;
    data.doctors()
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Doctor", &id))
}

#[utoipa::path(post, path = "/api/doctors", request_body = NewDoctor,
    responses(
        (status = 201, description = "Created", body = Doctor),
        (status = 400, description = "Invalid input or unknown hospital", body = ErrorBody),
        (status = 409, description = "Email already used", body = ErrorBody)
    ))]
pub async fn create_doctor(
    State(state): State<AppState>,
    Json(req): Json<NewDoctor>,
) -> ApiResult<(StatusCode, Json<Doctor>)> {
    let viewer = state.signed_in().await?.viewer();
    let created = state.data.lock().await.create_doctor(&viewer, req)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/doctors/{id}", request_body = DoctorPatch,
    params(("id" = String, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Updated", body = Doctor),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DoctorPatch>,
) -> ApiResult<Json<Doctor>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state.data.lock().await.update_doctor(&viewer, &id, req)?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/api/doctors/{id}",
    params(("id" = String, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Removed", body = Doctor),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn delete_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Doctor>> {
    let viewer = state.signed_in().await?.viewer();
    let removed = state.data.lock().await.delete_doctor(&viewer, &id)?;
    Ok(Json(removed))
}

#[utoipa::path(get, path = "/api/services",
    responses((status = 200, description = "All services", body = [Service])))]
pub async fn list_services(State(state): State<AppState>) -> ApiResult<Json<Vec<Service>>> {
    state.signed_in().await?;
    Ok(Json(state.data.lock().await.services().all().to_vec()))
}

#[utoipa::path(get, path = "/api/services/{id}",
    params(("id" = String, Path, description = "Service id, e.g. S001")),
    responses(
        (status = 200, description = "The service", body = Service),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Service>> {
    state.signed_in().await?;
    let data = state.data.lock().await;
    data.services()
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Service", &id))
}

#[utoipa::path(post, path = "/api/services", request_body = NewService,
    responses(
        (status = 201, description = "Created", body = Service),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 409, description = "Name already used", body = ErrorBody)
    ))]
pub async fn create_service(
    State(state): State<AppState>,
    Json(req): Json<NewService>,
) -> ApiResult<(StatusCode, Json<Service>)> {
    let viewer = state.signed_in().await?.viewer();
    let created = state.data.lock().await.create_service(&viewer, req)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/services/{id}", request_body = ServicePatch,
    params(("id" = String, Path, description = "Service id")),
    responses(
        (status = 200, description = "Updated", body = Service),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ServicePatch>,
) -> ApiResult<Json<Service>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state.data.lock().await.update_service(&viewer, &id, req)?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/api/services/{id}",
    params(("id" = String, Path, description = "Service id")),
    responses(
        (status = 200, description = "Removed", body = Service),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Service>> {
    let viewer = state.signed_in().await?.viewer();
    let removed = state.data.lock().await.delete_service(&viewer, &id)?;
    Ok(Json(removed))
}

#[utoipa::path(get, path = "/api/locations",
    responses((status = 200, description = "All locations", body = [Location])))]
pub async fn list_locations(State(state): State<AppState>) -> ApiResult<Json<Vec<Location>>> {
    state.signed_in().await?;
    Ok(Json(state.data.lock().await.locations().all().to_vec()))
}

#[utoipa::path(get, path = "/api/locations/{id}",
    params(("id" = String, Path, description = "Location id, e.g. L001")),
    responses(
        (status = 200, description = "The location", body = Location),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Location>> {
    state.signed_in().await?;
    let data = state.data.lock().await;
    data.locations()
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Location", &id))
}

#[utoipa::path(post, path = "/api/locations", request_body = NewLocation,
    responses(
        (status = 201, description = "Created", body = Location),
        (status = 400, description = "A level is missing", body = ErrorBody)
    ))]
pub async fn create_location(
    State(state): State<AppState>,
    Json(req): Json<NewLocation>,
) -> ApiResult<(StatusCode, Json<Location>)> {
    let viewer = state.signed_in().await?.viewer();
    let created = state.data.lock().await.create_location(&viewer, req)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/locations/{id}", request_body = LocationPatch,
    params(("id" = String, Path, description = "Location id")),
    responses(
        (status = 200, description = "Updated", body = Location),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<LocationPatch>,
) -> ApiResult<Json<Location>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state.data.lock().await.update_location(&viewer, &id, req)?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/api/locations/{id}",
    params(("id" = String, Path, description = "Location id")),
    responses(
        (status = 200, description = "Removed", body = Location),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Location>> {
    let viewer = state.signed_in().await?.viewer();
    let removed = state.data.lock().await.delete_location(&viewer, &id)?;
    Ok(Json(removed))
}
