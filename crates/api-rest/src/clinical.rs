//! Appointments, medical records and prescriptions.
//!
//! Listings and lookups are limited to what the signed-in user may see; an id outside that scope
//! answers 404 just like an unknown one.

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use portal_auth::SessionUser;
use portal_core::repositories::appointments::{
    Appointment, AppointmentPatch, AppointmentStatus, NewAppointment, Reschedule,
};
use portal_core::repositories::medical_records::{
    MedicalRecord, MedicalRecordPatch, NewMedicalRecord,
};
use portal_core::repositories::prescriptions::{
    NewPrescription, Prescription, PrescriptionPatch, PrescriptionStatus,
};
use portal_types::{normalize_email, Role};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct AppointmentQuery {
    pub status: Option<AppointmentStatus>,
}

#[derive(Deserialize, IntoParams)]
pub struct PrescriptionQuery {
    pub status: Option<PrescriptionStatus>,
}

/// A doctor writing their own record is named as shown in their session.
fn doctor_name_from_session(user: &SessionUser, doctor_email: &str, doctor_name: &mut String) {
    let own = doctor_email.trim().is_empty() || normalize_email(doctor_email) == user.email;
    if user.role == Role::Doctor && own && doctor_name.trim().is_empty() {
        *doctor_name = user.name.clone();
    }
}

#[utoipa::path(get, path = "/api/appointments", params(AppointmentQuery),
    responses((status = 200, description = "Appointments visible to the caller", body = [Appointment])))]
pub async fn list_appointments(
    State(state): State<AppState>,
    Query(query): Query<AppointmentQuery>,
) -> ApiResult<Json<Vec<Appointment>>> {
    let viewer = state.signed_in().await?.viewer();
    let data = state.data.lock().await;
    Ok(Json(
        data.appointments_for(&viewer, query.status)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

#[utoipa::path(get, path = "/api/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id, e.g. A001")),
    responses(
        (status = 200, description = "The appointment", body = Appointment),
        (status = 404, description = "Unknown or not visible", body = ErrorBody)
    ))]
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    let viewer = state.signed_in().await?.viewer();
    let data = state.data.lock().await;
    data.appointment_for(&viewer, &id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Appointment", &id))
}

#[utoipa::path(post, path = "/api/appointments", request_body = NewAppointment,
    responses(
        (status = 201, description = "Booked as pending", body = Appointment),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 403, description = "Caller may not book for this patient", body = ErrorBody)
    ))]
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(req): Json<NewAppointment>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    let viewer = state.signed_in().await?.viewer();
    let created = state.data.lock().await.create_appointment(&viewer, req)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/appointments/{id}", request_body = AppointmentPatch,
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Updated", body = Appointment),
        (status = 403, description = "Administrators only", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AppointmentPatch>,
) -> ApiResult<Json<Appointment>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state
        .data
        .lock()
        .await
        .update_appointment(&viewer, &id, req)?;
    Ok(Json(updated))
}

#[utoipa::path(post, path = "/api/appointments/{id}/confirm",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Confirmed", body = Appointment),
        (status = 403, description = "Not the appointment's doctor", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn confirm_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state.data.lock().await.confirm_appointment(&viewer, &id)?;
    Ok(Json(updated))
}

#[utoipa::path(post, path = "/api/appointments/{id}/cancel",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Cancelled", body = Appointment),
        (status = 403, description = "Not a party to the appointment", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state.data.lock().await.cancel_appointment(&viewer, &id)?;
    Ok(Json(updated))
}

#[utoipa::path(post, path = "/api/appointments/{id}/reschedule", request_body = Reschedule,
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Moved; status is back to pending", body = Appointment),
        (status = 400, description = "Invalid date or time", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn reschedule_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<Reschedule>,
) -> ApiResult<Json<Appointment>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state
        .data
        .lock()
        .await
        .reschedule_appointment(&viewer, &id, req)?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/api/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Removed", body = Appointment),
        (status = 403, description = "Administrators only", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    let viewer = state.signed_in().await?.viewer();
    let removed = state.data.lock().await.delete_appointment(&viewer, &id)?;
    Ok(Json(removed))
}

#[utoipa::path(get, path = "/api/medical-records",
    responses((status = 200, description = "Records visible to the caller", body = [MedicalRecord])))]
pub async fn list_medical_records(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MedicalRecord>>> {
    let viewer = state.signed_in().await?.viewer();
    let data = state.data.lock().await;
    Ok(Json(
        data.medical_records_for(&viewer)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

#[utoipa::path(get, path = "/api/medical-records/{id}",
    params(("id" = String, Path, description = "Record id, e.g. MR001")),
    responses(
        (status = 200, description = "The record", body = MedicalRecord),
        (status = 404, description = "Unknown or not visible", body = ErrorBody)
    ))]
pub async fn get_medical_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MedicalRecord>> {
    let viewer = state.signed_in().await?.viewer();
    let data = state.data.lock().await;
    data.medical_record_for(&viewer, &id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Medical record", &id))
}

#[utoipa::path(post, path = "/api/medical-records", request_body = NewMedicalRecord,
    responses(
        (status = 201, description = "Created", body = MedicalRecord),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 403, description = "Not the record's doctor", body = ErrorBody)
    ))]
pub async fn create_medical_record(
    State(state): State<AppState>,
    Json(mut req): Json<NewMedicalRecord>,
) -> ApiResult<(StatusCode, Json<MedicalRecord>)> {
    let user = state.signed_in().await?;
    doctor_name_from_session(&user, &req.doctor_email, &mut req.doctor_name);
    let created = state
        .data
        .lock()
        .await
        .create_medical_record(&user.viewer(), req)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/medical-records/{id}", request_body = MedicalRecordPatch,
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Updated", body = MedicalRecord),
        (status = 403, description = "Not the record's doctor", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn update_medical_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MedicalRecordPatch>,
) -> ApiResult<Json<MedicalRecord>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state
        .data
        .lock()
        .await
        .update_medical_record(&viewer, &id, req)?;
    Ok(Json(updated))
}

#[utoipa::path(post, path = "/api/medical-records/{id}/review",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Marked reviewed", body = MedicalRecord),
        (status = 403, description = "Not the record's doctor", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn review_medical_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MedicalRecord>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state.data.lock().await.mark_record_reviewed(&viewer, &id)?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/api/medical-records/{id}",
    params(("id" = String, Path, description = "Record id")),
    responses(
        (status = 200, description = "Removed", body = MedicalRecord),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn delete_medical_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MedicalRecord>> {
    let viewer = state.signed_in().await?.viewer();
    let removed = state
        .data
        .lock()
        .await
        .delete_medical_record(&viewer, &id)?;
    Ok(Json(removed))
}

#[utoipa::path(get, path = "/api/prescriptions", params(PrescriptionQuery),
    responses((status = 200, description = "Prescriptions visible to the caller", body = [Prescription])))]
pub async fn list_prescriptions(
    State(state): State<AppState>,
    Query(query): Query<PrescriptionQuery>,
) -> ApiResult<Json<Vec<Prescription>>> {
    let viewer = state.signed_in().await?.viewer();
    let data = state.data.lock().await;
    Ok(Json(
        data.prescriptions_for(&viewer, query.status)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

#[utoipa::path(get, path = "/api/prescriptions/{id}",
    params(("id" = String, Path, description = "Prescription id, e.g. RX001")),
    responses(
        (status = 200, description = "The prescription", body = Prescription),
        (status = 404, description = "Unknown or not visible", body = ErrorBody)
    ))]
pub async fn get_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Prescription>> {
    let viewer = state.signed_in().await?.viewer();
    let data = state.data.lock().await;
    data.prescription_for(&viewer, &id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Prescription", &id))
}

#[utoipa::path(post, path = "/api/prescriptions", request_body = NewPrescription,
    responses(
        (status = 201, description = "Issued as active", body = Prescription),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 403, description = "Not the prescribing doctor", body = ErrorBody)
    ))]
pub async fn create_prescription(
    State(state): State<AppState>,
    Json(mut req): Json<NewPrescription>,
) -> ApiResult<(StatusCode, Json<Prescription>)> {
    let user = state.signed_in().await?;
    doctor_name_from_session(&user, &req.doctor_email, &mut req.doctor_name);
    let created = state
        .data
        .lock()
        .await
        .create_prescription(&user.viewer(), req)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/prescriptions/{id}", request_body = PrescriptionPatch,
    params(("id" = String, Path, description = "Prescription id")),
    responses(
        (status = 200, description = "Updated", body = Prescription),
        (status = 400, description = "Already dispensed or invalid input", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn update_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PrescriptionPatch>,
) -> ApiResult<Json<Prescription>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state
        .data
        .lock()
        .await
        .update_prescription(&viewer, &id, req)?;
    Ok(Json(updated))
}

#[utoipa::path(post, path = "/api/prescriptions/{id}/dispense",
    params(("id" = String, Path, description = "Prescription id")),
    responses(
        (status = 200, description = "Dispensed", body = Prescription),
        (status = 400, description = "Not active", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn dispense_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Prescription>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state
        .data
        .lock()
        .await
        .dispense_prescription(&viewer, &id)?;
    Ok(Json(updated))
}

#[utoipa::path(post, path = "/api/prescriptions/{id}/cancel",
    params(("id" = String, Path, description = "Prescription id")),
    responses(
        (status = 200, description = "Cancelled", body = Prescription),
        (status = 400, description = "Already cancelled", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn cancel_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Prescription>> {
    let viewer = state.signed_in().await?.viewer();
    let updated = state.data.lock().await.cancel_prescription(&viewer, &id)?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/api/prescriptions/{id}",
    params(("id" = String, Path, description = "Prescription id")),
    responses(
        (status = 200, description = "Removed", body = Prescription),
        (status = 404, description = "Unknown id", body = ErrorBody)
    ))]
pub async fn delete_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Prescription>> {
    let viewer = state.signed_in().await?.viewer();
    let removed = state.data.lock().await.delete_prescription(&viewer, &id)?;
    Ok(Json(removed))
}
