use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use portal_core::repositories::patients::{NewPatient, Patient, PatientPatch};

#[utoipa::path(get, path = "/api/patients",
    responses((status = 200, description = "Patients visible to the caller", body = [Patient])))]
/// Administrators see every patient, doctors their assigned patients, patients themselves.
pub async fn list_patients(State(state): State<AppState>) -> ApiResult<Json<Vec<Patient>>> {
    let viewer = state.signed_in().await?.viewer();
    let data = state.data.lock().await;
    Ok(Json(
        data.patients_for(&viewer).into_iter().cloned().collect(),
    ))
}

#[utoipa::path(get, path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient id, e.g. P001")),
    responses(
        (status = 200, description = "The patient", body = Patient),
        (status = 404, description = "Unknown or not visible", body = ErrorBody)
    ))]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Patient>> {
    let viewer = state.signed_in().await?.viewer();
    let data = state.data.lock().await;
    data.patient_for(&viewer, &id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Patient", &id))
}

#[utoipa::path(post, path = "/api/patients", request_body = NewPatient,
    responses(
        (status = 201, description = "Registered", body = Patient),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 403, description = "Only staff register patients", body = ErrorBody),
        (status = 409, description = "Email already used", body = ErrorBody)
    ))]
/// A doctor registering a patient without naming a doctor is assigned to that patient.
pub async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<NewPatient>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    let viewer = state.signed_in().await?.viewer();
    let created = state.data.lock().await.create_patient(&viewer, req)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/patients/{id}", request_body = PatientPatch,
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Updated", body = Patient),
        (status = 403, description = "Not the assigned doctor", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody),
        (status = 409, description = "Email already used", body = ErrorBody)
    ))]
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PatientPatch>,
) -> ApiResult<Json<Patient>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state.data.lock().await.update_patient(&viewer, &id, req)?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Removed", body = Patient),
        (status = 403, description = "Administrators only", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Patient>> {
    let viewer = state.signed_in().await?.viewer();
    let removed = state.data.lock().await.delete_patient(&viewer, &id)?;
    Ok(Json(removed))
}
