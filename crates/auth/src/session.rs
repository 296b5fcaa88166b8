//! Session state for the single signed-in user.

use chrono::{DateTime, Utc};
use portal_core::Viewer;
use portal_types::Role;
use serde::Serialize;
use utoipa::ToSchema;

/// The signed-in user as shown to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionUser {
    pub email: String,
    pub role: Role,
    pub name: String,
}

impl SessionUser {
    pub fn viewer(&self) -> Viewer {
        Viewer::new(&self.email, self.role)
    }
}

/// Credentials checked, waiting for the mailed code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingOtp {
    pub email: String,
    pub role: Role,
    pub name: String,
    #[schema(value_type = String)]
    pub issued_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    OtpPending(PendingOtp),
    Authenticated(SessionUser),
    /// A reset code was requested; the user must sign in again afterwards.
    ResetPending { email: String },
}

impl SessionState {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingOtp> {
        match self {
            SessionState::OtpPending(pending) => Some(pending),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = match self {
            SessionState::Anonymous => "anonymous",
            SessionState::OtpPending(_) => "otpPending",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::ResetPending { .. } => "resetPending",
        };
        SessionSnapshot {
            state: state.to_owned(),
            user: self.user().cloned(),
            role: self.role(),
            is_authed: self.is_authenticated(),
            pending_otp: self.pending().cloned(),
        }
    }
}

/// Serialisable view of [`SessionState`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: String,
    pub user: Option<SessionUser>,
    pub role: Option<Role>,
    pub is_authed: bool,
    pub pending_otp: Option<PendingOtp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_snapshot() {
        let snap = SessionState::default().snapshot();
        assert_eq!(snap.state, "anonymous");
        assert!(!snap.is_authed);
        assert!(snap.user.is_none());
        assert!(snap.role.is_none());
    }

    #[test]
    fn authenticated_snapshot_exposes_role() {
        let state = SessionState::Authenticated(SessionUser {
            email: "doctor@health.rw".into(),
            role: Role::Doctor,
            name: "Dr. Uwimana Grace".into(),
        });
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["isAuthed"], true);
        assert_eq!(json["role"], "DOCTOR");
        assert_eq!(json["user"]["email"], "doctor@health.rw");
        assert!(json["pendingOtp"].is_null());
    }
}
