//! Route gate applied to every `/api` request.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use portal_auth::GateDecision;

pub async fn gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if path.starts_with("/api/auth/") {
        return next.run(request).await;
    }

    let role = state.auth.lock().await.session().role();
    let decision = state.api_routes.check(&path, role);
    match &decision {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RedirectToLogin { from } => {
            tracing::info!("anonymous request to {} turned away", from);
            with_location(ApiError::unauthenticated(), &decision).into_response()
        }
        GateDecision::RedirectToUnauthorized => {
            tracing::info!("{:?} may not open {}", role, path);
            with_location(
                ApiError::new(
                    StatusCode::FORBIDDEN,
                    "You do not have permission to access this page.",
                ),
                &decision,
            )
            .into_response()
        }
    }
}

fn with_location(err: ApiError, decision: &GateDecision) -> ApiError {
    match decision.location() {
        Some(to) => err.with_redirect(to),
        None => err,
    }
}
