//! # API REST
//!
//! REST API for the healthcare portal.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - the route gate, applied as middleware to every `/api` request
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, status codes, CORS)
//!
//! Permissions on individual records are decided by `portal-core`; this crate only maps the
//! signed-in session to a viewer and errors to status codes.

#![warn(rust_2018_idioms)]

pub mod auth;
pub mod clinical;
pub mod error;
pub mod middleware;
pub mod overview;
pub mod patients;
pub mod registry;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        overview::health,
        auth::signup,
        auth::login,
        auth::verify_otp,
        auth::logout,
        auth::request_password_reset,
        auth::confirm_password_reset,
        auth::session,
        auth::check_route,
        auth::create_user,
        registry::list_hospitals,
        registry::get_hospital,
        registry::create_hospital,
        registry::update_hospital,
        registry::delete_hospital,
        registry::list_doctors,
        registry::get_doctor,
        registry::create_doctor,
        registry::update_doctor,
        registry::delete_doctor,
        registry::list_services,
        registry::get_service,
        registry::create_service,
        registry::update_service,
        registry::delete_service,
        registry::list_locations,
        registry::get_location,
        registry::create_location,
        registry::update_location,
        registry::delete_location,
        patients::list_patients,
        patients::get_patient,
        patients::create_patient,
        patients::update_patient,
        patients::delete_patient,
        clinical::list_appointments,
        clinical::get_appointment,
        clinical::create_appointment,
        clinical::update_appointment,
        clinical::confirm_appointment,
        clinical::cancel_appointment,
        clinical::reschedule_appointment,
        clinical::delete_appointment,
        clinical::list_medical_records,
        clinical::get_medical_record,
        clinical::create_medical_record,
        clinical::update_medical_record,
        clinical::review_medical_record,
        clinical::delete_medical_record,
        clinical::list_prescriptions,
        clinical::get_prescription,
        clinical::create_prescription,
        clinical::update_prescription,
        clinical::dispense_prescription,
        clinical::cancel_prescription,
        clinical::delete_prescription,
        overview::patient_directory,
        overview::doctor_directory,
        overview::search,
        overview::dashboard,
    ),
    components(schemas(
        error::ErrorBody,
        overview::HealthRes,
        auth::VerifyOtpReq,
        auth::ResetRequestReq,
        auth::MessageRes,
        auth::LoginRes,
        auth::SessionRes,
        auth::RouteRes,
        portal_types::Role,
        portal_auth::credentials::Account,
        portal_auth::service::SignupRequest,
        portal_auth::service::LoginRequest,
        portal_auth::service::PasswordResetRequest,
        portal_auth::service::StaffUserRequest,
        portal_auth::service::StaffCreatedAccount,
        portal_auth::session::SessionUser,
        portal_auth::session::PendingOtp,
        portal_auth::session::SessionSnapshot,
        portal_core::repositories::hospitals::Hospital,
        portal_core::repositories::hospitals::NewHospital,
        portal_core::repositories::hospitals::HospitalPatch,
        portal_core::repositories::doctors::Doctor,
        portal_core::repositories::doctors::NewDoctor,
        portal_core::repositories::doctors::DoctorPatch,
        portal_core::repositories::services::Service,
        portal_core::repositories::services::NewService,
        portal_core::repositories::services::ServicePatch,
        portal_core::repositories::locations::Location,
        portal_core::repositories::locations::NewLocation,
        portal_core::repositories::locations::LocationPatch,
        portal_core::repositories::patients::Patient,
        portal_core::repositories::patients::PatientLocation,
        portal_core::repositories::patients::NewPatient,
        portal_core::repositories::patients::PatientPatch,
        portal_core::repositories::appointments::Appointment,
        portal_core::repositories::appointments::AppointmentStatus,
        portal_core::repositories::appointments::NewAppointment,
        portal_core::repositories::appointments::AppointmentPatch,
        portal_core::repositories::appointments::Reschedule,
        portal_core::repositories::medical_records::MedicalRecord,
        portal_core::repositories::medical_records::NewMedicalRecord,
        portal_core::repositories::medical_records::MedicalRecordPatch,
        portal_core::repositories::prescriptions::Prescription,
        portal_core::repositories::prescriptions::PrescriptionStatus,
        portal_core::repositories::prescriptions::NewPrescription,
        portal_core::repositories::prescriptions::PrescriptionPatch,
        portal_core::repositories::shared::NumberInput,
        portal_core::HospitalRemoval,
        portal_core::DirectoryEntry,
        portal_core::search::SearchResults,
        portal_core::dashboard::DashboardSummary,
        portal_core::dashboard::StatusCount,
        portal_core::dashboard::DayCount,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router over `state`.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/verify-otp", post(auth::verify_otp))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/auth/password-reset/request",
            post(auth::request_password_reset),
        )
        .route(
            "/api/auth/password-reset/confirm",
            post(auth::confirm_password_reset),
        )
        .route("/api/session", get(auth::session))
        .route("/api/session/route", get(auth::check_route))
        .route("/api/users", post(auth::create_user))
        .route(
            "/api/hospitals",
            get(registry::list_hospitals).post(registry::create_hospital),
        )
        .route(
            "/api/hospitals/:id",
            get(registry::get_hospital)
                .put(registry::update_hospital)
                .delete(registry::delete_hospital),
        )
        .route(
            "/api/doctors",
            get(registry::list_doctors).post(registry::create_doctor),
        )
        .route(
            "/api/doctors/:id",
            get(registry::get_doctor)
                .put(registry::update_doctor)
                .delete(registry::delete_doctor),
        )
        .route(
            "/api/services",
            get(registry::list_services).post(registry::create_service),
        )
        .route(
            "/api/services/:id",
            get(registry::get_service)
                .put(registry::update_service)
                .delete(registry::delete_service),
        )
        .route(
            "/api/locations",
            get(registry::list_locations).post(registry::create_location),
        )
        .route(
            "/api/locations/:id",
            get(registry::get_location)
                .put(registry::update_location)
                .delete(registry::delete_location),
        )
        .route(
            "/api/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/api/patients/:id",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(
            "/api/appointments",
            get(clinical::list_appointments).post(clinical::create_appointment),
        )
        .route(
            "/api/appointments/:id",
            get(clinical::get_appointment)
                .put(clinical::update_appointment)
                .delete(clinical::delete_appointment),
        )
        .route(
            "/api/appointments/:id/confirm",
            post(clinical::confirm_appointment),
        )
        .route(
            "/api/appointments/:id/cancel",
            post(clinical::cancel_appointment),
        )
        .route(
            "/api/appointments/:id/reschedule",
            post(clinical::reschedule_appointment),
        )
        .route(
            "/api/medical-records",
            get(clinical::list_medical_records).post(clinical::create_medical_record),
        )
        .route(
            "/api/medical-records/:id",
            get(clinical::get_medical_record)
                .put(clinical::update_medical_record)
                .delete(clinical::delete_medical_record),
        )
        .route(
            "/api/medical-records/:id/review",
            post(clinical::review_medical_record),
        )
        .route(
            "/api/prescriptions",
            get(clinical::list_prescriptions).post(clinical::create_prescription),
        )
        .route(
            "/api/prescriptions/:id",
            get(clinical::get_prescription)
                .put(clinical::update_prescription)
                .delete(clinical::delete_prescription),
        )
        .route(
            "/api/prescriptions/:id/dispense",
            post(clinical::dispense_prescription),
        )
        .route(
            "/api/prescriptions/:id/cancel",
            post(clinical::cancel_prescription),
        )
        .route(
            "/api/directory/patients",
            get(overview::patient_directory),
        )
        .route("/api/directory/doctors", get(overview::doctor_directory))
        .route("/api/search", get(overview::search))
        .route("/api/dashboard", get(overview::dashboard))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::gate,
        ));

    Router::new()
        .route("/health", get(overview::health))
        .merge(api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests;
