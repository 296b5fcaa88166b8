//! Mapping from domain errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use portal_auth::AuthError;
use portal_core::DataError;
use serde::Serialize;
use utoipa::ToSchema;

/// Body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    /// Page the client should navigate to, set when the route gate turns a request away.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    redirect: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            redirect: None,
        }
    }

    pub fn with_redirect(mut self, to: impl Into<String>) -> Self {
        self.redirect = Some(to.into());
        self
    }

    pub fn not_found(kind: &str, id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{kind} {id} not found."))
    }

    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Please sign in to continue.")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        let status = match &err {
            DataError::Validation(_) | DataError::InvalidTransition { .. } => {
                StatusCode::BAD_REQUEST
            }
            DataError::Conflict(_) => StatusCode::CONFLICT,
            DataError::Forbidden(_) => StatusCode::FORBIDDEN,
            DataError::NotFound { .. } => StatusCode::NOT_FOUND,
            DataError::Storage(e) => {
                tracing::error!("storage failure: {:?}", e);
                return Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The change could not be saved.",
                );
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if let AuthError::Data(inner) = err {
            return inner.into();
        }
        let status = match &err {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::RoleMismatch { .. }
            | AuthError::NoPendingOtp
            | AuthError::OtpExpired => StatusCode::UNAUTHORIZED,
            AuthError::UnknownAccount => StatusCode::NOT_FOUND,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::Collaborator(_) => StatusCode::BAD_GATEWAY,
            AuthError::Data(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            redirect: self.redirect,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_errors_map_to_statuses() {
        let cases = [
            (DataError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (DataError::Conflict("x".into()), StatusCode::CONFLICT),
            (DataError::Forbidden("x".into()), StatusCode::FORBIDDEN),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(AuthError::OtpExpired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Collaborator("down".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(AuthError::Data(DataError::Conflict("dup".into()))).status(),
            StatusCode::CONFLICT
        );
    }
}
