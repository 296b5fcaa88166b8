//! Credential table rows and password hashing.
//!
//! Passwords are never stored in the clear: each row keeps a random salt and the hex SHA-256
//! digest of `salt || password`.

use crate::constants::SALT_LEN;
use portal_core::repositories::shared::Record;
use portal_types::Role;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    salt: String,
    digest: String,
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

fn digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

impl PasswordHash {
    pub fn new(password: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        Self {
            salt: hex::encode(salt),
            digest: digest(&salt, password),
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        let Ok(salt) = hex::decode(&self.salt) else {
            return false;
        };
        let candidate = digest(&salt, password);
        candidate.len() == self.digest.len()
            && candidate
                .bytes()
                .zip(self.digest.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

/// One row of the credential table. The email is the key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredential {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password: PasswordHash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<String>,
}

impl Record for UserCredential {
    const KIND: &'static str = "Account";

    fn id(&self) -> &str {
        &self.email
    }
}

/// A credential row without its password, safe to return to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Account {
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance: Option<String>,
}

impl From<&UserCredential> for Account {
    fn from(c: &UserCredential) -> Self {
        Self {
            email: c.email.clone(),
            name: c.name.clone(),
            role: c.role,
            insurance: c.insurance.clone(),
        }
    }
}

/// The three built-in accounts, one per role.
pub fn seed_users() -> Vec<UserCredential> {
    [
        ("badagaclass@gmail.com", "Admin123!", Role::Admin, "Admin User"),
        ("doctor@health.rw", "Doctor123!", Role::Doctor, "Dr. Uwimana Grace"),
        ("patient@health.rw", "Patient123!", Role::Patient, "Uwase Marie"),
    ]
    .into_iter()
    .map(|(email, password, role, name)| UserCredential {
        email: email.into(),
        name: name.into(),
        role,
        password: PasswordHash::new(password),
        insurance: None,
    })
    .collect()
}
