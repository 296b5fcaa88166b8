//! Authentication configuration.
//!
//! Resolved once at startup from raw environment values; see the `*_from_env_value` helpers.

use crate::constants::{
    DEFAULT_AUTH_API_BASE, DEFAULT_AUTH_TIMEOUT_SECS, DEFAULT_OTP_TTL_SECS, DEFAULT_TEMP_PASSWORD,
};
use crate::{AuthError, AuthResult};
use chrono::Duration;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    api_base: String,
    otp_ttl: Option<Duration>,
    request_timeout: Option<std::time::Duration>,
    temp_password: String,
}

impl AuthConfig {
    /// Create a new `AuthConfig`.
    ///
    /// `api_base` must be an absolute `http(s)` URL; a trailing `/` is dropped. `otp_ttl` of
    /// `None` disables the local OTP expiry.
    pub fn new(
        api_base: impl Into<String>,
        otp_ttl: Option<Duration>,
        request_timeout: Option<std::time::Duration>,
        temp_password: impl Into<String>,
    ) -> AuthResult<Self> {
        let api_base = api_base.into().trim().trim_end_matches('/').to_owned();
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(AuthError::validation(format!(
                "auth API base must be an http(s) URL, got {api_base:?}"
            )));
        }

        if otp_ttl.is_some_and(|ttl| ttl <= Duration::zero()) {
            return Err(AuthError::validation("OTP lifetime must be positive"));
        }

        let temp_password = temp_password.into();
        if temp_password.trim().is_empty() {
            return Err(AuthError::validation("temporary password cannot be empty"));
        }

        Ok(Self {
            api_base,
            otp_ttl,
            request_timeout,
            temp_password,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn otp_ttl(&self) -> Option<Duration> {
        self.otp_ttl
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.request_timeout
    }

    pub fn temp_password(&self) -> &str {
        &self.temp_password
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_AUTH_API_BASE.to_owned(),
            otp_ttl: Some(Duration::seconds(DEFAULT_OTP_TTL_SECS)),
            request_timeout: Some(std::time::Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS)),
            temp_password: DEFAULT_TEMP_PASSWORD.to_owned(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn api_base_from_env_value(value: Option<String>) -> String {
    non_blank(value)
        .map(|v| v.trim_end_matches('/').to_owned())
        .unwrap_or_else(|| DEFAULT_AUTH_API_BASE.to_owned())
}

/// Unset means the default lifetime; an empty value or `0` disables local expiry.
pub fn otp_ttl_from_env_value(value: Option<String>) -> AuthResult<Option<Duration>> {
    let Some(raw) = value else {
        return Ok(Some(Duration::seconds(DEFAULT_OTP_TTL_SECS)));
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let secs: i64 = raw
        .parse()
        .map_err(|_| AuthError::validation(format!("invalid OTP lifetime: {raw:?}")))?;
    match secs {
        0 => Ok(None),
        s if s < 0 => Err(AuthError::validation("OTP lifetime must be positive")),
        s => Ok(Some(Duration::seconds(s))),
    }
}

/// Unset or blank means the default timeout; `0` waits indefinitely.
pub fn timeout_from_env_value(value: Option<String>) -> AuthResult<Option<std::time::Duration>> {
    let Some(raw) = non_blank(value) else {
        return Ok(Some(std::time::Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS)));
    };
    let secs: u64 = raw
        .parse()
        .map_err(|_| AuthError::validation(format!("invalid request timeout: {raw:?}")))?;
    Ok((secs > 0).then(|| std::time::Duration::from_secs(secs)))
}

pub fn temp_password_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_TEMP_PASSWORD.to_owned())
}
