//! Port abstraction for idea persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{Idea, IdeaFields, IdeaId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by idea repository adapters.
    pub enum IdeaRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "idea repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "idea repository query failed: {message}",
        /// No idea exists with the given identifier.
        NotFound { id: IdeaId } => "idea {id} not found",
        /// The backing file or document could not be read or written.
        Storage { message: String } => "idea storage failed: {message}",
    }
}

/// Port for storing and reading ideas.
///
/// Adapters assign identifiers and timestamps; callers only supply validated
/// [`IdeaFields`]. `vote_count` on returned ideas reflects the votes the
/// backend knows about.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdeaRepository: Send + Sync {
    /// Return every stored idea.
    async fn list(&self) -> Result<Vec<Idea>, IdeaRepositoryError>;

    /// Fetch one idea by identifier.
    async fn find_by_id(&self, id: &IdeaId) -> Result<Option<Idea>, IdeaRepositoryError>;

    /// Persist a new idea and return the stored record.
    async fn create(&self, fields: IdeaFields) -> Result<Idea, IdeaRepositoryError>;

    /// Replace the mutable fields of an existing idea and refresh
    /// `updated_at`.
    async fn update(&self, id: &IdeaId, fields: IdeaFields) -> Result<Idea, IdeaRepositoryError>;

    /// Remove an idea.
    async fn delete(&self, id: &IdeaId) -> Result<(), IdeaRepositoryError>;
}
