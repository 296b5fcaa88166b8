//! Validated primitives shared by the portal crates.
//!
//! - [`NonEmptyText`]: trimmed text that is guaranteed to contain something
//! - [`Role`]: the three portal roles and their wire spelling
//! - [`normalize_email`]: the canonical form used for every email comparison

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Consumes the wrapper and returns the trimmed string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Canonical email form: trimmed and lower-cased.
///
/// Every uniqueness check and every email-keyed lookup compares this form.
pub fn normalize_email(input: impl AsRef<str>) -> String {
    input.as_ref().trim().to_lowercase()
}

/// Portal role. Determines the landing page and what a user may see or change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Doctor => "DOCTOR",
            Role::Patient => "PATIENT",
        }
    }

    /// Staff roles may register accounts on behalf of others.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Doctor)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
