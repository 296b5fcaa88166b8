use portal_core::DataError;
use portal_types::Role;

/// Failure talking to the external OTP service.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    /// The service answered with a non-success status. `message` is the service's own
    /// explanation when its body carried one.
    #[error("OTP service rejected the request ({status})")]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("OTP service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl CollaboratorError {
    /// The message to show the user: the service's own, or `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            CollaboratorError::Rejected {
                message: Some(m), ..
            } if !m.trim().is_empty() => m.clone(),
            _ => fallback.to_owned(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("This account is not a {selected}. Please select the correct role.")]
    RoleMismatch { selected: Role },
    #[error("No OTP pending. Please login again.")]
    NoPendingOtp,
    #[error("OTP expired. Please login again.")]
    OtpExpired,
    #[error("No account found for this email in the system.")]
    UnknownAccount,
    #[error("{0}")]
    Forbidden(String),
    /// The OTP service refused or could not be reached; carries the message to display.
    #[error("{0}")]
    Collaborator(String),
    #[error(transparent)]
    Data(#[from] DataError),
}

impl AuthError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        AuthError::Validation(message.into())
    }
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;
