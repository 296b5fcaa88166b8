//! Client for the external OTP/e-mail service.
//!
//! The service generates and mails one-time codes for login and password reset. This crate
//! never sees a code except when forwarding the user's entry for confirmation.

use crate::config::AuthConfig;
use crate::constants::{
    LOGIN_OTP_CONFIRM, LOGIN_OTP_REQUEST, PASSWORD_RESET_CONFIRM, PASSWORD_RESET_REQUEST,
};
use crate::error::CollaboratorError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// The four calls the session flows make to the OTP service.
#[async_trait]
pub trait OtpCollaborator: Send + Sync {
    async fn request_login_otp(&self, email: &str) -> CollaboratorResult<()>;
    async fn confirm_login_otp(&self, email: &str, otp: &str) -> CollaboratorResult<()>;
    async fn request_password_reset(&self, email: &str) -> CollaboratorResult<()>;
    async fn confirm_password_reset(&self, email: &str, otp: &str) -> CollaboratorResult<()>;
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct ConfirmBody<'a> {
    email: &'a str,
    otp: &'a str,
}

#[derive(Default, Deserialize)]
struct ServiceReply {
    #[serde(default)]
    message: Option<String>,
}

/// Extracts `message` from a reply body. Anything unparsable counts as no message.
fn reply_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ServiceReply>(body)
        .unwrap_or_default()
        .message
        .filter(|m| !m.trim().is_empty())
}

/// [`OtpCollaborator`] over HTTP, posting JSON to `{api_base}{path}`.
#[derive(Clone, Debug)]
pub struct HttpOtpClient {
    client: Client,
    base: String,
}

impl HttpOtpClient {
    pub fn new(config: &AuthConfig) -> CollaboratorResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base: config.api_base().to_owned(),
        })
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> CollaboratorResult<()> {
        let response = self
            .client
            .post(format!("{}{}", self.base, path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await.unwrap_or_default();
        if status.is_success() {
            return Ok(());
        }

        let message = reply_message(&bytes);
        tracing::warn!("OTP service {} answered {}", path, status);
        Err(CollaboratorError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl OtpCollaborator for HttpOtpClient {
    async fn request_login_otp(&self, email: &str) -> CollaboratorResult<()> {
        self.post(LOGIN_OTP_REQUEST, &EmailBody { email }).await
    }

    async fn confirm_login_otp(&self, email: &str, otp: &str) -> CollaboratorResult<()> {
        self.post(LOGIN_OTP_CONFIRM, &ConfirmBody { email, otp })
            .await
    }

    async fn request_password_reset(&self, email: &str) -> CollaboratorResult<()> {
        self.post(PASSWORD_RESET_REQUEST, &EmailBody { email })
            .await
    }

    async fn confirm_password_reset(&self, email: &str, otp: &str) -> CollaboratorResult<()> {
        self.post(PASSWORD_RESET_CONFIRM, &ConfirmBody { email, otp })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_message_is_best_effort() {
        assert_eq!(
            reply_message(br#"{"message":"Invalid OTP"}"#).as_deref(),
            Some("Invalid OTP")
        );
        assert_eq!(reply_message(br#"{"message":"  "}"#), None);
        assert_eq!(reply_message(br#"{"ok":false}"#), None);
        assert_eq!(reply_message(b"<html>502 Bad Gateway</html>"), None);
        assert_eq!(reply_message(b""), None);
    }

    #[test]
    fn rejected_uses_service_message_or_fallback() {
        let with = CollaboratorError::Rejected {
            status: 400,
            message: Some("Invalid OTP".into()),
        };
        let without = CollaboratorError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(with.user_message("OTP verification failed."), "Invalid OTP");
        assert_eq!(
            without.user_message("OTP verification failed."),
            "OTP verification failed."
        );
    }

    #[test]
    fn client_uses_configured_base() {
        let config = AuthConfig::new("http://otp.local:5000/", None, None, "Temp123!").unwrap();
        let client = HttpOtpClient::new(&config).unwrap();
        assert_eq!(client.base, "http://otp.local:5000");
    }
}
