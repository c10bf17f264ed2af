//! Domain primitives, aggregates and services.
//!
//! Purpose: Define the strongly typed entities of the idea board and the
//! services that enforce its rules. Storage and transport live behind the
//! ports in [`ports`]; nothing in this module touches a database or a file.
//!
//! Public surface:
//! - Error: transport-agnostic error payload.
//! - Idea, IdeaDraft, IdeaPatch: idea aggregate and its input shapes.
//! - User, Registration, LoginCredentials: identity and credential types.
//! - Vote: a single user's vote on an idea.
//! - IdeaService, UserService, VoteService: the use-case layer.

pub mod auth;
pub mod error;
pub mod idea;
pub mod idea_service;
pub mod password;
pub mod ports;
pub mod user;
pub mod user_service;
pub mod vote;
pub mod vote_service;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::idea::{
    ANONYMOUS_REQUESTER, Idea, IdeaDraft, IdeaFields, IdeaId, IdeaPatch, IdeaStatus,
    IdeaValidationError, ParseIdeaStatusError, ParseTechStackError, TechStack,
};
pub use self::idea_service::IdeaService;
pub use self::password::{HashedPassword, PasswordError, PasswordPolicy};
pub use self::user::{NewUser, Registration, User, UserId, UserValidationError};
pub use self::user_service::UserService;
pub use self::vote::{Vote, VoteId};
pub use self::vote_service::VoteService;

/// Result envelope returned by every service operation.
///
/// # Examples
/// ```
/// use idea_board::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<u64> {
///     Err(Error::not_found("idea not found"))
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
