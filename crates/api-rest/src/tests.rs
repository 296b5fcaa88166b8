use super::*;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use portal_auth::collaborator::{CollaboratorResult, OtpCollaborator};
use portal_auth::{AuthConfig, AuthService};
use portal_core::{AppData, MemoryStore, Store};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Accepts every code.
struct AcceptAll;

#[async_trait]
impl OtpCollaborator for AcceptAll {
    async fn request_login_otp(&self, _email: &str) -> CollaboratorResult<()> {
        Ok(())
    }

    async fn confirm_login_otp(&self, _email: &str, _otp: &str) -> CollaboratorResult<()> {
        Ok(())
    }

    async fn request_password_reset(&self, _email: &str) -> CollaboratorResult<()> {
        Ok(())
    }

    async fn confirm_password_reset(&self, _email: &str, _otp: &str) -> CollaboratorResult<()> {
        Ok(())
    }
}

fn app() -> Router {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let data = AppData::load(store.clone()).unwrap();
    let auth = AuthService::load(store, AuthConfig::default(), Arc::new(AcceptAll)).unwrap();
    router(AppState::new(data, auth))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn sign_in(app: &Router, email: &str, password: &str, role: &str) {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": email, "password": password, "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/verify-otp",
        Some(json!({ "otp": "123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

async fn sign_in_admin(app: &Router) {
    sign_in(app, "badagaclass@gmail.com", "Admin123!", "ADMIN").await;
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn anonymous_api_calls_are_sent_to_login() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/hospitals", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/login");

    let (status, body) = send(&app, "GET", "/api/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["home"], "/login");
    assert_eq!(body["session"]["isAuthed"], false);
}

#[tokio::test]
async fn login_lands_on_the_role_dashboard() {
    let app = app();
    send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "doctor@health.rw", "password": "Doctor123!", "role": "DOCTOR" })),
    )
    .await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/verify-otp",
        Some(json!({ "otp": "123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/app/doctor-dashboard");
    assert_eq!(body["user"]["role"], "DOCTOR");
}

#[tokio::test]
async fn wrong_role_is_unauthorized() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "doctor@health.rw", "password": "Doctor123!", "role": "ADMIN" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"],
        "This account is not a ADMIN. Please select the correct role."
    );
}

#[tokio::test]
async fn dashboard_is_for_administrators() {
    let app = app();
    sign_in(&app, "doctor@health.rw", "Doctor123!", "DOCTOR").await;
    let (status, body) = send(&app, "GET", "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["redirect"], "/app/unauthorized");

    send(&app, "POST", "/api/auth/logout", None).await;
    sign_in_admin(&app).await;
    let (status, body) = send(&app, "GET", "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalFacilities"], 54);
}

#[tokio::test]
async fn deleting_a_hospital_detaches_its_doctors() {
    let app = app();
    sign_in_admin(&app).await;

    let (status, hospital) = send(
        &app,
        "POST",
        "/api/hospitals",
        Some(json!({
            "name": "Test H",
            "province": "Kigali City",
            "district": "Gasabo",
            "category": "District"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(hospital["id"], "H055");

    let (status, doctor) = send(
        &app,
        "POST",
        "/api/doctors",
        Some(json!({
            "name": "Dr. Test",
            "email": "dr.test@x.com",
            "specialty": "General Medicine",
            "hospitalId": "H055"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, removal) = send(&app, "DELETE", "/api/hospitals/H055", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removal["detachedDoctors"], 1);

    let uri = format!("/api/doctors/{}", doctor["id"].as_str().unwrap());
    let (_, doctor) = send(&app, "GET", &uri, None).await;
    assert_eq!(doctor["hospitalId"], "");

    let (status, _) = send(&app, "GET", "/api/hospitals/H055", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booked_appointment_is_pending_with_service_name() {
    let app = app();
    sign_in(&app, "patient@health.rw", "Patient123!", "PATIENT").await;

    let (status, booked) = send(
        &app,
        "POST",
        "/api/appointments",
        Some(json!({
            "patientEmail": "patient@health.rw",
            "doctorEmail": "doctor@health.rw",
            "date": "2026-01-05",
            "time": "08:30",
            "serviceId": "S001"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{booked}");
    assert_eq!(booked["status"], "pending");
    assert_eq!(booked["serviceName"], "General Consultation");
    assert_eq!(booked["patient"], "Uwase Marie");

    let (status, _) = send(
        &app,
        "POST",
        "/api/appointments",
        Some(json!({
            "patientEmail": "otherpatient@health.rw",
            "doctorEmail": "doctor@health.rw",
            "date": "2026-01-05",
            "time": "08:30"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn reschedule_resets_confirmed_appointment() {
    let app = app();
    sign_in_admin(&app).await;
    let (status, moved) = send(
        &app,
        "POST",
        "/api/appointments/A001/reschedule",
        Some(json!({ "date": "2026-01-01", "time": "09:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["date"], "2026-01-01");
    assert_eq!(moved["time"], "09:00");
    assert_eq!(moved["status"], "pending");
}

#[tokio::test]
async fn patients_only_see_their_own_appointments() {
    let app = app();
    sign_in(&app, "patient@health.rw", "Patient123!", "PATIENT").await;

    let (_, list) = send(&app, "GET", "/api/appointments", None).await;
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["A001", "A002"]);

    let (status, _) = send(&app, "GET", "/api/appointments/A003", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, pending) = send(&app, "GET", "/api/appointments?status=pending", None).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn doctor_records_carry_session_name() {
    let app = app();
    sign_in(&app, "doctor@health.rw", "Doctor123!", "DOCTOR").await;
    let (status, record) = send(
        &app,
        "POST",
        "/api/medical-records",
        Some(json!({
            "patientEmail": "patient@health.rw",
            "diagnosis": "Influenza",
            "date": "2026-01-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{record}");
    assert_eq!(record["doctorEmail"], "doctor@health.rw");
    assert_eq!(record["doctor"], "Dr. Uwimana Grace");
    assert_eq!(record["reviewed"], false);
}

#[tokio::test]
async fn signup_then_duplicate_conflicts() {
    let app = app();
    let body = json!({ "name": "Jane", "email": "jane@x.com", "password": "secret1" });
    let (status, account) = send(&app, "POST", "/api/auth/signup", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(account["role"], "PATIENT");

    let again = json!({ "name": "Jane", "email": "JANE@x.com", "password": "secret1" });
    let (status, body) = send(&app, "POST", "/api/auth/signup", Some(again)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "This email is already registered.");
}

#[tokio::test]
async fn staff_creates_patient_accounts() {
    let app = app();
    sign_in(&app, "doctor@health.rw", "Doctor123!", "DOCTOR").await;
    let (status, created) = send(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "name": "Eric", "email": "eric@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["account"]["role"], "PATIENT");
    assert_eq!(created["tempPassword"], "Temp123!");
}

#[tokio::test]
async fn page_check_uses_portal_routes() {
    let app = app();
    sign_in(&app, "patient@health.rw", "Patient123!", "PATIENT").await;

    let (_, check) = send(&app, "GET", "/api/session/route?path=/app/hospitals", None).await;
    assert_eq!(check["allowed"], false);
    assert_eq!(check["redirect"], "/app/unauthorized");

    let (_, check) = send(&app, "GET", "/api/session/route?path=/app/prescriptions", None).await;
    assert_eq!(check["allowed"], true);

    let (_, session) = send(&app, "GET", "/api/session", None).await;
    assert_eq!(session["home"], "/app/patient-dashboard");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app();
    let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/appointments/{id}/reschedule"].is_object());
}
