//! Sign-up, OTP login, logout and password reset over the credential table.

use crate::collaborator::OtpCollaborator;
use crate::config::AuthConfig;
use crate::constants::{MIN_PASSWORD_LEN, OTP_MIN_LEN};
use crate::credentials::{seed_users, Account, PasswordHash, UserCredential};
use crate::error::{AuthError, AuthResult};
use crate::session::{PendingOtp, SessionSnapshot, SessionState, SessionUser};
use chrono::{DateTime, Utc};
use portal_core::constants::USERS_KEY;
use portal_core::repositories::shared::{Collection, SeedPolicy};
use portal_core::Store;
use portal_types::{normalize_email, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub insurance: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Blank means the configured temporary password.
    #[serde(default)]
    pub temp_password: Option<String>,
    /// Defaults to `PATIENT`.
    #[serde(default)]
    pub role: Option<Role>,
}

/// A staff-created account together with the password to hand to its owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffCreatedAccount {
    pub account: Account,
    pub temp_password: String,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// The role picked on the login form; checked against the account when given.
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    #[serde(default)]
    pub email: String,
    /// The reset code mailed by the OTP service.
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

/// Landing page for a freshly signed-in user.
pub fn default_app_path(role: Role) -> &'static str {
    match role {
        Role::Admin => "/app/dashboard",
        Role::Doctor => "/app/doctor-dashboard",
        Role::Patient => "/app/patient-dashboard",
    }
}

pub struct AuthService {
    config: AuthConfig,
    users: Collection<UserCredential>,
    session: SessionState,
    collaborator: Arc<dyn OtpCollaborator>,
}

impl AuthService {
    /// Loads the credential table from `store`, seeding the built-in accounts when it is absent,
    /// unreadable or empty. The session starts anonymous.
    ///
    /// # Arguments
    ///
    /// * `store` - Store holding the credential table.
    /// * `config` - Resolved authentication configuration.
    /// * `collaborator` - The OTP service used for login and password-reset codes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Data`] if the credential table cannot be read or seeded.
    pub fn load(
        store: Arc<dyn Store>,
        config: AuthConfig,
        collaborator: Arc<dyn OtpCollaborator>,
    ) -> AuthResult<Self> {
        let users = Collection::load(store, USERS_KEY, SeedPolicy::WhenMissingOrEmpty, seed_users)?;
        Ok(Self {
            config,
            users,
            session: SessionState::Anonymous,
            collaborator,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn current_user(&self) -> Option<&SessionUser> {
        self.session.user()
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.users.items().iter().map(Account::from).collect()
    }

    pub fn find_account(&self, email: &str) -> Option<Account> {
        self.credential(email).map(Account::from)
    }

    fn credential(&self, email: &str) -> Option<&UserCredential> {
        let email = normalize_email(email);
        self.users
            .items()
            .iter()
            .find(|u| normalize_email(&u.email) == email)
    }

    fn ensure_unregistered(&self, email: &str) -> AuthResult<()> {
        if self.credential(email).is_some() {
            return Err(AuthError::Conflict("This email is already registered.".into()));
        }
        Ok(())
    }

    /// Self-service registration. Always creates a `PATIENT` account and does not sign in.
    ///
    /// # Returns
    ///
    /// The new account. A blank insurance is stored as `"None"`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`AuthError::Validation`] if the name, email or password is blank,
    /// - [`AuthError::Conflict`] if the email is already registered (any case),
    /// - [`AuthError::Data`] if the credential table cannot be saved.
    pub fn signup(&mut self, request: SignupRequest) -> AuthResult<Account> {
        let email = normalize_email(&request.email);
        let name = request.name.trim().to_owned();
        if name.is_empty() || email.is_empty() || request.password.is_empty() {
            return Err(AuthError::validation("All fields are required."));
        }
        self.ensure_unregistered(&email)?;

        let insurance = request
            .insurance
            .map(|i| i.trim().to_owned())
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| "None".to_owned());
        let user = UserCredential {
            email,
            name,
            role: Role::Patient,
            password: PasswordHash::new(&request.password),
            insurance: Some(insurance),
        };
        self.users.insert_first(user.clone())?;
        tracing::info!("registered patient account {}", user.email);
        Ok(Account::from(&user))
    }

    /// Creates an account on behalf of someone else.
    ///
    /// Only staff may call this, and a doctor may only register patients.
    ///
    /// # Arguments
    ///
    /// * `caller` - Role of the signed-in user making the request.
    /// * `request` - The account to create. A blank password means the configured temporary one.
    ///
    /// # Returns
    ///
    /// The account together with the password to hand to its owner.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`AuthError::Forbidden`] if `caller` may not create an account of the requested role,
    /// - [`AuthError::Validation`] if the name or email is blank,
    /// - [`AuthError::Conflict`] if the email is already registered,
    /// - [`AuthError::Data`] if the credential table cannot be saved.
    pub fn create_user_by_staff(
        &mut self,
        caller: Role,
        request: StaffUserRequest,
    ) -> AuthResult<StaffCreatedAccount> {
        if !caller.is_staff() {
            return Err(AuthError::Forbidden(
                "Only administrators and doctors can create accounts.".into(),
            ));
        }
        let role = request.role.unwrap_or(Role::Patient);
        if caller == Role::Doctor && role != Role::Patient {
            return Err(AuthError::Forbidden(
                "Doctors can only create patient accounts.".into(),
            ));
        }

        let email = normalize_email(&request.email);
        let name = request.name.trim().to_owned();
        if name.is_empty() || email.is_empty() {
            return Err(AuthError::validation("Name and email are required."));
        }
        self.ensure_unregistered(&email)?;

        let temp_password = request
            .temp_password
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.config.temp_password().to_owned());
        let user = UserCredential {
            email,
            name,
            role,
            password: PasswordHash::new(&temp_password),
            insurance: None,
        };
        self.users.insert_first(user.clone())?;
        tracing::info!("{} created {} account {}", caller, role, user.email);
        Ok(StaffCreatedAccount {
            account: Account::from(&user),
            temp_password,
        })
    }

    /// Checks the password (and role, when picked) and asks the OTP service to mail a code.
    ///
    /// On success the session waits for the code; any earlier session is replaced.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`AuthError::InvalidCredentials`] if the email is unknown or the password is wrong,
    /// - [`AuthError::RoleMismatch`] if a role was picked and the account has another one,
    /// - [`AuthError::Collaborator`] with the service's message if no code could be sent.
    ///   The session is left as it was.
    pub async fn request_otp(&mut self, request: LoginRequest) -> AuthResult<()> {
        let found = self
            .credential(&request.email)
            .filter(|u| u.password.verify(&request.password))
            .ok_or(AuthError::InvalidCredentials)?;

        if let Some(selected) = request.role {
            if selected != found.role {
                return Err(AuthError::RoleMismatch { selected });
            }
        }

        let pending = PendingOtp {
            email: found.email.clone(),
            role: found.role,
            name: found.name.clone(),
            issued_at: Utc::now(),
        };

        let collaborator = Arc::clone(&self.collaborator);
        collaborator
            .request_login_otp(&pending.email)
            .await
            .map_err(|e| {
                tracing::warn!("login OTP request for {} failed: {}", pending.email, e);
                AuthError::Collaborator(e.user_message("Failed to send login OTP email."))
            })?;

        tracing::info!("login OTP sent to {}", pending.email);
        self.session = SessionState::OtpPending(pending);
        Ok(())
    }

    pub async fn verify_otp(&mut self, code: &str) -> AuthResult<SessionUser> {
        self.verify_otp_at(code, Utc::now()).await
    }

    /// [`Self::verify_otp`] with an explicit clock.
    ///
    /// A rejected code keeps the pending login so the user can retry until it expires.
    ///
    /// # Returns
    ///
    /// The signed-in user, taken from the pending login.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`AuthError::NoPendingOtp`] if no login is waiting for a code,
    /// - [`AuthError::OtpExpired`] if the pending login is older than the configured lifetime;
    ///   the session becomes anonymous,
    /// - [`AuthError::Validation`] if the code is shorter than six characters,
    /// - [`AuthError::Collaborator`] if the OTP service rejects the code.
    pub async fn verify_otp_at(&mut self, code: &str, now: DateTime<Utc>) -> AuthResult<SessionUser> {
        let pending = self
            .session
            .pending()
            .cloned()
            .ok_or(AuthError::NoPendingOtp)?;

        let otp = code.trim();
        if otp.chars().count() < OTP_MIN_LEN {
            return Err(AuthError::validation("Enter the 6-digit OTP code."));
        }

        if let Some(ttl) = self.config.otp_ttl() {
            if now - pending.issued_at > ttl {
                tracing::info!("pending OTP for {} expired", pending.email);
                self.session = SessionState::Anonymous;
                return Err(AuthError::OtpExpired);
            }
        }

        let collaborator = Arc::clone(&self.collaborator);
        collaborator
            .confirm_login_otp(&pending.email, otp)
            .await
            .map_err(|e| {
                tracing::warn!("OTP confirmation for {} failed: {}", pending.email, e);
                AuthError::Collaborator(e.user_message("OTP verification failed."))
            })?;

        let user = SessionUser {
            email: pending.email,
            role: pending.role,
            name: pending.name,
        };
        tracing::info!("{} signed in as {}", user.email, user.role);
        self.session = SessionState::Authenticated(user.clone());
        Ok(user)
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.session.user() {
            tracing::info!("{} signed out", user.email);
        }
        self.session = SessionState::Anonymous;
    }

    /// Asks the OTP service to mail a reset code to `email`.
    pub async fn request_password_reset(&mut self, email: &str) -> AuthResult<()> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AuthError::validation("Email is required."));
        }

        let collaborator = Arc::clone(&self.collaborator);
        collaborator
            .request_password_reset(&email)
            .await
            .map_err(|e| {
                tracing::warn!("password reset request for {} failed: {}", email, e);
                AuthError::Collaborator(e.user_message("Failed to send reset OTP."))
            })?;

        tracing::info!("password reset code sent to {}", email);
        if !self.session.is_authenticated() {
            self.session = SessionState::ResetPending { email };
        }
        Ok(())
    }

    /// Confirms the reset code with the OTP service and stores the new password.
    ///
    /// The account must exist; this is checked before the service is contacted.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`AuthError::Validation`] if the email or code is blank, or the new password is shorter
    ///   than six characters,
    /// - [`AuthError::UnknownAccount`] if no account uses the email,
    /// - [`AuthError::Collaborator`] if the OTP service rejects the code,
    /// - [`AuthError::Data`] if the new password cannot be saved.
    pub async fn reset_password(&mut self, request: PasswordResetRequest) -> AuthResult<()> {
        let email = normalize_email(&request.email);
        let otp = request.token.trim();
        if email.is_empty() {
            return Err(AuthError::validation("Email is required."));
        }
        if otp.is_empty() {
            return Err(AuthError::validation("Reset code (OTP) is required."));
        }
        if request.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::validation(
                "Password must be at least 6 characters.",
            ));
        }
        if self.credential(&email).is_none() {
            return Err(AuthError::UnknownAccount);
        }

        let collaborator = Arc::clone(&self.collaborator);
        collaborator
            .confirm_password_reset(&email, otp)
            .await
            .map_err(|e| {
                tracing::warn!("password reset confirmation for {} failed: {}", email, e);
                AuthError::Collaborator(e.user_message("OTP verification failed."))
            })?;

        let index = self
            .users
            .items()
            .iter()
            .position(|u| normalize_email(&u.email) == email)
            .ok_or(AuthError::UnknownAccount)?;
        let mut user = self.users.items()[index].clone();
        user.password = PasswordHash::new(&request.new_password);
        self.users.replace_at(index, user)?;

        tracing::info!("password reset for {}", email);
        if matches!(self.session, SessionState::ResetPending { .. }) {
            self.session = SessionState::Anonymous;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::CollaboratorResult;
    use crate::error::CollaboratorError;
    use async_trait::async_trait;
    use chrono::Duration;
    use portal_core::MemoryStore;
    use std::sync::Mutex;

    /// Records calls; fails any call whose name is listed in `reject`.
    #[derive(Default)]
    struct FakeOtp {
        calls: Mutex<Vec<String>>,
        reject: Mutex<Vec<(&'static str, Option<&'static str>)>>,
    }

    impl FakeOtp {
        fn rejecting(call: &'static str, message: Option<&'static str>) -> Self {
            let fake = Self::default();
            fake.reject.lock().unwrap().push((call, message));
            fake
        }

        fn record(&self, call: &'static str, detail: String) -> CollaboratorResult<()> {
            self.calls.lock().unwrap().push(format!("{call}:{detail}"));
            match self.reject.lock().unwrap().iter().find(|(c, _)| *c == call) {
                Some((_, message)) => Err(CollaboratorError::Rejected {
                    status: 400,
                    message: message.map(str::to_owned),
                }),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OtpCollaborator for FakeOtp {
        async fn request_login_otp(&self, email: &str) -> CollaboratorResult<()> {
            self.record("login", email.to_owned())
        }

        async fn confirm_login_otp(&self, email: &str, otp: &str) -> CollaboratorResult<()> {
            self.record("confirm", format!("{email}/{otp}"))
        }

        async fn request_password_reset(&self, email: &str) -> CollaboratorResult<()> {
            self.record("reset", email.to_owned())
        }

        async fn confirm_password_reset(&self, email: &str, otp: &str) -> CollaboratorResult<()> {
            self.record("reset-confirm", format!("{email}/{otp}"))
        }
    }

    fn service_with(fake: Arc<FakeOtp>) -> AuthService {
        AuthService::load(
            Arc::new(MemoryStore::new()),
            AuthConfig::default(),
            fake,
        )
        .unwrap()
    }

    fn login(email: &str, password: &str, role: Option<Role>) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
            role,
        }
    }

    #[test]
    fn signup_creates_patient_and_rejects_duplicates() {
        let mut auth = service_with(Arc::default());

        let account = auth
            .signup(SignupRequest {
                name: "Jane".into(),
                email: "jane@x.com".into(),
                password: "secret1".into(),
                insurance: None,
            })
            .unwrap();
        assert_eq!(account.role, Role::Patient);
        assert_eq!(account.insurance.as_deref(), Some("None"));
        assert!(!auth.session().is_authenticated());

        let err = auth
            .signup(SignupRequest {
                name: "Jane Again".into(),
                email: "JANE@X.COM ".into(),
                password: "other12".into(),
                insurance: None,
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "This email is already registered.");
        assert_eq!(auth.accounts().len(), 4);
    }

    #[test]
    fn signup_requires_every_field() {
        let mut auth = service_with(Arc::default());
        let err = auth
            .signup(SignupRequest {
                name: "Jane".into(),
                email: "jane@x.com".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "All fields are required.");
    }

    #[test]
    fn staff_creation_checks_caller() {
        let mut auth = service_with(Arc::default());
        let request = || StaffUserRequest {
            name: "Eric".into(),
            email: "eric@x.com".into(),
            ..Default::default()
        };

        assert!(matches!(
            auth.create_user_by_staff(Role::Patient, request()),
            Err(AuthError::Forbidden(_))
        ));
        assert!(matches!(
            auth.create_user_by_staff(
                Role::Doctor,
                StaffUserRequest {
                    role: Some(Role::Admin),
                    ..request()
                }
            ),
            Err(AuthError::Forbidden(_))
        ));

        let created = auth.create_user_by_staff(Role::Doctor, request()).unwrap();
        assert_eq!(created.account.role, Role::Patient);
        assert_eq!(created.temp_password, "Temp123!");
    }

    #[tokio::test]
    async fn otp_login_flow() {
        let fake = Arc::new(FakeOtp::default());
        let mut auth = service_with(fake.clone());

        auth.request_otp(login("Doctor@Health.rw", "Doctor123!", Some(Role::Doctor)))
            .await
            .unwrap();
        assert_eq!(auth.snapshot().state, "otpPending");

        let user = auth.verify_otp(" 123456 ").await.unwrap();
        assert_eq!(user.role, Role::Doctor);
        assert_eq!(user.name, "Dr. Uwimana Grace");
        assert!(auth.session().is_authenticated());
        assert_eq!(default_app_path(user.role), "/app/doctor-dashboard");
        assert_eq!(
            fake.calls(),
            vec!["login:doctor@health.rw", "confirm:doctor@health.rw/123456"]
        );

        auth.logout();
        assert_eq!(auth.session(), &SessionState::Anonymous);
    }

    #[tokio::test]
    async fn wrong_password_or_role_is_rejected_before_the_service() {
        let fake = Arc::new(FakeOtp::default());
        let mut auth = service_with(fake.clone());

        let err = auth
            .request_otp(login("doctor@health.rw", "nope", None))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");

        let err = auth
            .request_otp(login("doctor@health.rw", "Doctor123!", Some(Role::Admin)))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "This account is not a ADMIN. Please select the correct role."
        );
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn service_message_is_passed_through() {
        let fake = Arc::new(FakeOtp::rejecting("login", Some("Mailbox unavailable")));
        let mut auth = service_with(fake);
        let err = auth
            .request_otp(login("patient@health.rw", "Patient123!", Some(Role::Patient)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Mailbox unavailable");
        assert_eq!(auth.session(), &SessionState::Anonymous);

        let fake = Arc::new(FakeOtp::rejecting("login", None));
        let mut auth = service_with(fake);
        let err = auth
            .request_otp(login("patient@health.rw", "Patient123!", None))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to send login OTP email.");
    }

    #[tokio::test]
    async fn verify_without_pending_login_fails() {
        let mut auth = service_with(Arc::default());
        for code in ["", "123456", "9999999999"] {
            assert!(matches!(
                auth.verify_otp(code).await,
                Err(AuthError::NoPendingOtp)
            ));
        }
    }

    #[tokio::test]
    async fn short_or_rejected_code_keeps_pending_login() {
        let fake = Arc::new(FakeOtp::rejecting("confirm", Some("Invalid OTP")));
        let mut auth = service_with(fake.clone());
        auth.request_otp(login("patient@health.rw", "Patient123!", None))
            .await
            .unwrap();

        let err = auth.verify_otp("123").await.unwrap_err();
        assert_eq!(err.to_string(), "Enter the 6-digit OTP code.");

        let err = auth.verify_otp("000000").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid OTP");
        assert!(auth.session().pending().is_some());
    }

    #[tokio::test]
    async fn expired_code_clears_pending_login() {
        let fake = Arc::new(FakeOtp::default());
        let mut auth = service_with(fake.clone());
        auth.request_otp(login("patient@health.rw", "Patient123!", None))
            .await
            .unwrap();

        let later = Utc::now() + Duration::seconds(601);
        let err = auth.verify_otp_at("123456", later).await.unwrap_err();
        assert!(matches!(err, AuthError::OtpExpired));
        assert_eq!(auth.session(), &SessionState::Anonymous);
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn password_reset_replaces_the_password() {
        let fake = Arc::new(FakeOtp::default());
        let mut auth = service_with(fake.clone());

        auth.request_password_reset(" Patient@health.rw").await.unwrap();
        assert!(matches!(auth.session(), SessionState::ResetPending { .. }));

        auth.reset_password(PasswordResetRequest {
            email: "patient@health.rw".into(),
            token: "654321".into(),
            new_password: "newpass1".into(),
        })
        .await
        .unwrap();
        assert_eq!(auth.session(), &SessionState::Anonymous);

        let err = auth
            .request_otp(login("patient@health.rw", "Patient123!", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        auth.request_otp(login("patient@health.rw", "newpass1", None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reset_validates_before_calling_the_service() {
        let fake = Arc::new(FakeOtp::default());
        let mut auth = service_with(fake.clone());

        let reset = |email: &str, token: &str, password: &str| PasswordResetRequest {
            email: email.into(),
            token: token.into(),
            new_password: password.into(),
        };

        let err = auth.reset_password(reset("", "1", "secret1")).await.unwrap_err();
        assert_eq!(err.to_string(), "Email is required.");
        let err = auth
            .reset_password(reset("patient@health.rw", " ", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Reset code (OTP) is required.");
        let err = auth
            .reset_password(reset("patient@health.rw", "123456", "abc"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters.");
        let err = auth
            .reset_password(reset("ghost@x.com", "123456", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnknownAccount));

        assert!(fake.calls().is_empty());
    }

    #[test]
    fn credentials_survive_reload() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut auth =
            AuthService::load(store.clone(), AuthConfig::default(), Arc::new(FakeOtp::default()))
                .unwrap();
        auth.signup(SignupRequest {
            name: "Jane".into(),
            email: "jane@x.com".into(),
            password: "secret1".into(),
            insurance: Some("RSSB".into()),
        })
        .unwrap();

        let reloaded =
            AuthService::load(store, AuthConfig::default(), Arc::new(FakeOtp::default())).unwrap();
        let jane = reloaded.find_account("JANE@x.com").unwrap();
        assert_eq!(jane.insurance.as_deref(), Some("RSSB"));
        assert_eq!(reloaded.accounts().len(), 4);
    }
}
