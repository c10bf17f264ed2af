//! Port for vote persistence.

use async_trait::async_trait;

use crate::domain::{IdeaId, UserId, Vote};

use super::define_port_error;

define_port_error! {
    /// Errors raised by vote repository adapters.
    pub enum VoteRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "vote repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "vote repository query failed: {message}",
        /// The (user, idea) pair already has a vote.
        AlreadyVoted => "user has already voted",
        /// The (user, idea) pair has no vote to remove.
        NotVoted => "user has not voted for this idea",
        /// The referenced idea or user does not exist.
        MissingReference { message: String } => "vote references a missing record: {message}",
    }
}

/// Port for recording and counting votes.
///
/// Adapters must reject a second vote for the same (user, idea) pair even
/// under concurrent inserts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Record a vote.
    async fn add(&self, user_id: &UserId, idea_id: &IdeaId) -> Result<Vote, VoteRepositoryError>;

    /// Remove a vote.
    async fn remove(&self, user_id: &UserId, idea_id: &IdeaId) -> Result<(), VoteRepositoryError>;

    /// Whether the user has voted for the idea.
    async fn has_voted(
        &self,
        user_id: &UserId,
        idea_id: &IdeaId,
    ) -> Result<bool, VoteRepositoryError>;

    /// Number of votes recorded for the idea.
    async fn count(&self, idea_id: &IdeaId) -> Result<u64, VoteRepositoryError>;
}
