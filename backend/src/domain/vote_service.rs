//! Vote use-cases enforcing one vote per user per idea.
//!
//! The service checks the current state first so callers get a friendly
//! error on the common path. The storage unique constraint stays
//! authoritative: a concurrent insert that slips past the check surfaces as
//! [`VoteRepositoryError::AlreadyVoted`] and maps to the same conflict.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::domain::ports::{VoteRepository, VoteRepositoryError};
use crate::domain::{DomainResult, Error, IdeaId, UserId, Vote};

fn already_voted() -> Error {
    Error::conflict("user has already voted").with_details(json!({ "code": "already_voted" }))
}

fn not_voted() -> Error {
    Error::not_found("user has not voted for this idea")
        .with_details(json!({ "code": "not_voted" }))
}

fn map_repository_error(error: VoteRepositoryError) -> Error {
    match error {
        VoteRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("vote repository unavailable: {message}"))
        }
        VoteRepositoryError::Query { message } => {
            Error::internal(format!("vote repository error: {message}"))
        }
        VoteRepositoryError::AlreadyVoted => already_voted(),
        VoteRepositoryError::NotVoted => not_voted(),
        VoteRepositoryError::MissingReference { message } => Error::not_found(message)
            .with_details(json!({ "code": "missing_reference" })),
    }
}

/// Vote service over any [`VoteRepository`].
pub struct VoteService<R: ?Sized> {
    vote_repo: Arc<R>,
}

impl<R: ?Sized> Clone for VoteService<R> {
    fn clone(&self) -> Self {
        Self {
            vote_repo: Arc::clone(&self.vote_repo),
        }
    }
}

impl<R: ?Sized> VoteService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(vote_repo: Arc<R>) -> Self {
        Self { vote_repo }
    }
}

impl<R> VoteService<R>
where
    R: VoteRepository + ?Sized,
{
    /// Record a vote, rejecting a second vote for the same pair.
    pub async fn add_vote(&self, user_id: &UserId, idea_id: &IdeaId) -> DomainResult<Vote> {
        if self.has_user_voted(user_id, idea_id).await? {
            return Err(already_voted());
        }

        let vote = self
            .vote_repo
            .add(user_id, idea_id)
            .await
            .map_err(map_repository_error)?;
        info!(%user_id, %idea_id, "vote added");
        Ok(vote)
    }

    /// Withdraw a vote; fails when the pair has not voted.
    pub async fn remove_vote(&self, user_id: &UserId, idea_id: &IdeaId) -> DomainResult<()> {
        if !self.has_user_voted(user_id, idea_id).await? {
            return Err(not_voted());
        }

        self.vote_repo
            .remove(user_id, idea_id)
            .await
            .map_err(map_repository_error)?;
        info!(%user_id, %idea_id, "vote removed");
        Ok(())
    }

    pub async fn has_user_voted(&self, user_id: &UserId, idea_id: &IdeaId) -> DomainResult<bool> {
        self.vote_repo
            .has_voted(user_id, idea_id)
            .await
            .map_err(map_repository_error)
    }

    pub async fn get_vote_count(&self, idea_id: &IdeaId) -> DomainResult<u64> {
        self.vote_repo
            .count(idea_id)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "vote_service_tests.rs"]
mod tests;
