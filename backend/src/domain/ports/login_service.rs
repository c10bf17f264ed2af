//! Driving port for login use-cases.
//!
//! Inbound adapters call this port to turn credentials into a resolved user
//! identity before issuing whatever token format they use. Handler tests can
//! substitute the generated mock instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    ///
    /// Failures use [`crate::domain::ErrorCode::Unauthorized`] and never say
    /// whether the username or the password was wrong.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
