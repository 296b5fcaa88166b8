//! Constants used by the authentication crate.

/// Base URL of the OTP/e-mail service when none is configured.
pub const DEFAULT_AUTH_API_BASE: &str = "http://localhost:5000";

/// Seconds a pending login OTP stays valid locally.
pub const DEFAULT_OTP_TTL_SECS: i64 = 600;

/// Seconds before a call to the OTP service is abandoned. The session lock is held meanwhile.
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 15;

/// Password given to staff-created accounts when the creator leaves it blank.
pub const DEFAULT_TEMP_PASSWORD: &str = "Temp123!";

pub const MIN_PASSWORD_LEN: usize = 6;

/// OTP codes are six digits; shorter input is rejected before calling the OTP service.
pub const OTP_MIN_LEN: usize = 6;

/// Bytes of random salt per stored password.
pub const SALT_LEN: usize = 16;

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/app/unauthorized";

pub const LOGIN_OTP_REQUEST: &str = "/api/auth/login-otp/request";
pub const LOGIN_OTP_CONFIRM: &str = "/api/auth/login-otp/confirm";
pub const PASSWORD_RESET_REQUEST: &str = "/api/auth/password-reset/request";
pub const PASSWORD_RESET_CONFIRM: &str = "/api/auth/password-reset/confirm";
