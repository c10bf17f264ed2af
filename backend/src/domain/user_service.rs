//! User account use-cases: registration, credential checks and removal.
//!
//! Password hashing and verification are CPU-bound, so both run on Tokio's
//! blocking pool. Plaintext passwords stay in zeroizing buffers and are never
//! logged.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{LoginService, UserRepository, UserRepositoryError};
use crate::domain::{
    DomainResult, Error, HashedPassword, LoginCredentials, NewUser, PasswordError,
    PasswordPolicy, Registration, User, UserId,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";
/// Verified on unknown usernames so both outcomes cost one Argon2 run.
const DUMMY_PASSWORD: &str = "idea-board-dummy-password";

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateUsername { .. } => {
            Error::conflict("username already exists").with_details(json!({
                "code": "username_taken",
                "field": "username",
            }))
        }
        UserRepositoryError::DuplicateEmail { .. } => {
            Error::conflict("email already exists").with_details(json!({
                "code": "email_taken",
                "field": "email",
            }))
        }
    }
}

fn map_password_error(error: &PasswordError) -> Error {
    Error::internal(error.to_string())
}

fn user_not_found() -> Error {
    Error::not_found("user not found").with_details(json!({ "code": "user_not_found" }))
}

/// User service over any [`UserRepository`].
pub struct UserService<R: ?Sized> {
    user_repo: Arc<R>,
    policy: PasswordPolicy,
    dummy_hash: Arc<OnceLock<HashedPassword>>,
}

impl<R: ?Sized> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            user_repo: Arc::clone(&self.user_repo),
            policy: self.policy.clone(),
            dummy_hash: Arc::clone(&self.dummy_hash),
        }
    }
}

impl<R: ?Sized> UserService<R> {
    /// Create a new service hashing passwords with `policy`.
    pub fn new(user_repo: Arc<R>, policy: PasswordPolicy) -> Self {
        Self {
            user_repo,
            policy,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }
}

impl<R> UserService<R>
where
    R: UserRepository + ?Sized,
{
    async fn hash_password(&self, password: &str) -> DomainResult<HashedPassword> {
        let policy = self.policy.clone();
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || policy.hash(&password))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(|err| map_password_error(&err))
    }

    async fn verify_password(&self, password: &str, hashed: HashedPassword) -> DomainResult<bool> {
        let policy = self.policy.clone();
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || policy.verify(&password, &hashed))
            .await
            .map_err(|err| Error::internal(format!("password verification task failed: {err}")))?
            .map_err(|err| map_password_error(&err))
    }

    /// Hash of [`DUMMY_PASSWORD`] under the current policy, built once.
    async fn dummy_hash(&self) -> DomainResult<HashedPassword> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash.clone());
        }
        let hash = self.hash_password(DUMMY_PASSWORD).await?;
        Ok(self.dummy_hash.get_or_init(|| hash).clone())
    }

    /// Look up `username` and check `password`, returning the user on a
    /// match. Unknown usernames still pay for one verification.
    async fn check_credentials(&self, username: &str, password: &str) -> DomainResult<Option<User>> {
        let Some(user) = self
            .user_repo
            .find_by_username(username)
            .await
            .map_err(map_repository_error)?
        else {
            let dummy = self.dummy_hash().await?;
            self.verify_password(password, dummy).await?;
            return Ok(None);
        };

        let matches = self
            .verify_password(password, user.password_hash.clone())
            .await?;
        Ok(matches.then_some(user))
    }

    /// Hash the password and store a new, non-admin account.
    pub async fn create_user(&self, registration: &Registration) -> DomainResult<User> {
        let password_hash = self.hash_password(registration.password()).await?;
        let new_user = NewUser {
            username: registration.username().to_owned(),
            email: registration.email().to_owned(),
            password_hash,
            is_admin: false,
        };

        let user = self
            .user_repo
            .create(new_user)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Check a username/password pair.
    ///
    /// Unknown usernames are a not-found error; a wrong password is
    /// `Ok(false)`. Never returns `Ok(true)` for an unknown user.
    pub async fn validate_credentials(&self, username: &str, password: &str) -> DomainResult<bool> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(user_not_found)?;

        self.verify_password(password, user.password_hash).await
    }

    /// Remove the account after re-checking its credentials.
    ///
    /// Unknown usernames and wrong passwords both yield the same
    /// unauthorized error.
    pub async fn delete_user(&self, credentials: &LoginCredentials) -> DomainResult<User> {
        if self
            .check_credentials(credentials.username(), credentials.password())
            .await?
            .is_none()
        {
            warn!("account removal rejected: credentials did not match");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let removed = self
            .user_repo
            .delete_by_username(credentials.username())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(user_not_found)?;
        info!(user_id = %removed.id, "user deleted");
        Ok(removed)
    }

    pub async fn get_all_users(&self) -> DomainResult<Vec<User>> {
        self.user_repo.list().await.map_err(map_repository_error)
    }

    pub async fn get_user_by_username(&self, username: &str) -> DomainResult<User> {
        self.user_repo
            .find_by_username(username)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(user_not_found)
    }
}

#[async_trait]
impl<R> LoginService for UserService<R>
where
    R: UserRepository + ?Sized,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        match self
            .check_credentials(credentials.username(), credentials.password())
            .await?
        {
            Some(user) => Ok(user.id),
            None => {
                warn!("login rejected: credentials did not match");
                Err(Error::unauthorized(INVALID_CREDENTIALS))
            }
        }
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
