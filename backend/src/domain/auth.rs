//! Login and account-removal credentials.
//!
//! Adapters build [`LoginCredentials`] from decoded payloads before calling
//! the user service, so blank fields are rejected without a storage lookup.

use std::fmt;

use zeroize::Zeroizing;

/// Error returned when credential values are structurally invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Username and plaintext password presented by a caller.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty, keeps caller whitespace and is zeroed on drop.
///
/// # Examples
/// ```
/// use idea_board::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada", "s3cret!").unwrap();
/// assert_eq!(creds.username(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Plaintext password; never log or persist this value.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
