//! Authentication primitives: login credentials and the session principal.
//!
//! Inbound adapters parse raw strings through these constructors before they
//! talk to a login port, so the domain never sees blank or malformed input.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::UserId;

const EMAIL_MAX: usize = 254;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email lacks an `@` or exceeds the length limit.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed, lowercased, contains `@` and is at most 254 chars.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use clinic_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Reception@Example.jp ", "secret").unwrap();
/// assert_eq!(creds.email(), "reception@example.jp");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if !is_plausible_email(&normalized) {
            return Err(LoginValidationError::InvalidEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for account lookups.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Loose structural email check: one `@` with text on both sides.
pub(crate) fn is_plausible_email(value: &str) -> bool {
    if value.chars().count() > EMAIL_MAX {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// The authenticated caller resolved from session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: UserId,
    pub email: Option<String>,
}

impl Principal {
    /// Build a principal from its parts.
    pub fn new(id: UserId, email: Option<String>) -> Self {
        Self { id, email }
    }
}
