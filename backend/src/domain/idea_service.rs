//! Idea use-cases: validate input, then delegate to the idea repository.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{IdeaRepository, IdeaRepositoryError};
use crate::domain::{DomainResult, Error, Idea, IdeaDraft, IdeaId, IdeaPatch, IdeaValidationError};

fn map_repository_error(error: IdeaRepositoryError) -> Error {
    match error {
        IdeaRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("idea repository unavailable: {message}"))
        }
        IdeaRepositoryError::Query { message } | IdeaRepositoryError::Storage { message } => {
            Error::internal(format!("idea repository error: {message}"))
        }
        IdeaRepositoryError::NotFound { id } => idea_not_found(&id),
    }
}

fn map_validation_error(error: &IdeaValidationError) -> Error {
    let value = match error {
        IdeaValidationError::InvalidId { value }
        | IdeaValidationError::UnknownTechStack { value }
        | IdeaValidationError::UnknownStatus { value } => Some(value.as_str()),
        IdeaValidationError::BlankTitle | IdeaValidationError::MissingStatus => None,
    };
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "value": value,
    }))
}

fn idea_not_found(id: &IdeaId) -> Error {
    Error::not_found(format!("idea {id} not found")).with_details(json!({
        "code": "idea_not_found",
        "id": id.to_string(),
    }))
}

/// Idea service over any [`IdeaRepository`].
pub struct IdeaService<R: ?Sized> {
    idea_repo: Arc<R>,
}

impl<R: ?Sized> Clone for IdeaService<R> {
    fn clone(&self) -> Self {
        Self {
            idea_repo: Arc::clone(&self.idea_repo),
        }
    }
}

impl<R: ?Sized> IdeaService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(idea_repo: Arc<R>) -> Self {
        Self { idea_repo }
    }
}

impl<R> IdeaService<R>
where
    R: IdeaRepository + ?Sized,
{
    /// Validate and store a new idea.
    ///
    /// Unknown tech stacks or statuses and blank titles are rejected before
    /// the repository is called.
    pub async fn create_idea(&self, draft: IdeaDraft) -> DomainResult<Idea> {
        let fields = draft
            .validate_for_create()
            .map_err(|err| map_validation_error(&err))?;

        let idea = self
            .idea_repo
            .create(fields)
            .await
            .map_err(map_repository_error)?;
        info!(idea_id = %idea.id, status = %idea.status, "idea created");
        Ok(idea)
    }

    pub async fn get_all_ideas(&self) -> DomainResult<Vec<Idea>> {
        self.idea_repo.list().await.map_err(map_repository_error)
    }

    pub async fn get_idea(&self, id: &IdeaId) -> DomainResult<Idea> {
        self.idea_repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| idea_not_found(id))
    }

    /// Replace an idea's contents. The draft must carry a valid status.
    pub async fn update_idea(&self, id: &IdeaId, draft: IdeaDraft) -> DomainResult<Idea> {
        let fields = draft
            .validate_for_update()
            .map_err(|err| map_validation_error(&err))?;

        let idea = self
            .idea_repo
            .update(id, fields)
            .await
            .map_err(map_repository_error)?;
        info!(idea_id = %idea.id, status = %idea.status, "idea updated");
        Ok(idea)
    }

    /// Overlay `patch` on the stored idea and run the update path.
    pub async fn patch_idea(&self, id: &IdeaId, patch: IdeaPatch) -> DomainResult<Idea> {
        let current = self.get_idea(id).await?;
        debug!(idea_id = %id, "applying idea patch");
        self.update_idea(id, patch.apply_to(&current)).await
    }

    pub async fn delete_idea(&self, id: &IdeaId) -> DomainResult<()> {
        self.idea_repo
            .delete(id)
            .await
            .map_err(map_repository_error)?;
        info!(idea_id = %id, "idea deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "idea_service_tests.rs"]
mod tests;
