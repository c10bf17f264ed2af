//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{NewUser, User};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this username.
        DuplicateUsername { username: String } => "username already exists: {username}",
        /// Another account already uses this email address.
        DuplicateEmail { email: String } => "email already exists: {email}",
    }
}

/// Port for storing and reading user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account, rejecting duplicate usernames and emails.
    async fn create(&self, user: NewUser) -> Result<User, UserRepositoryError>;

    /// Fetch an account by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserRepositoryError>;

    /// Return every account.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Remove an account, returning it when it existed.
    async fn delete_by_username(&self, username: &str)
    -> Result<Option<User>, UserRepositoryError>;
}
