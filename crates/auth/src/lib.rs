//! # Portal Auth
//!
//! Accounts and sessions for the portal:
//! - the credential table, stored with salted password digests
//! - the login state machine (password, then a mailed one-time code)
//! - password reset through the same OTP service
//! - route tables deciding who may open which page or endpoint
//!
//! Entity data and its permissions live in `portal-core`.

pub mod collaborator;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod service;
pub mod session;

pub use collaborator::{HttpOtpClient, OtpCollaborator};
pub use config::AuthConfig;
pub use credentials::Account;
pub use error::{AuthError, AuthResult, CollaboratorError};
pub use gate::{GateDecision, RouteGuard};
pub use service::{default_app_path, AuthService};
pub use session::{SessionSnapshot, SessionState, SessionUser};
