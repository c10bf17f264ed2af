//! JSON file implementation of the `IdeaRepository` port.
//!
//! The whole idea collection lives in one file as a JSON array. Every
//! operation reads the file, works on the in-memory collection and, for
//! mutations, rewrites the whole file. Concurrent writers are
//! last-writer-wins; deployments that need concurrent mutation should use the
//! PostgreSQL backend instead.
//!
//! This backend stores no votes, so every idea it returns has a vote count of
//! zero.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{IdeaRepository, IdeaRepositoryError};
use crate::domain::{Idea, IdeaFields, IdeaId, IdeaStatus, TechStack};
use crate::outbound::stored_idea::{null_as_default, status_from_stored, tech_stack_from_stored};

/// On-disk representation of one idea.
///
/// Enum-valued fields are kept as strings and `null` reads like a missing
/// field, so documents written by other tools decode leniently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdeaDocument {
    id: Uuid,
    title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    tech_stack: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    tags: Vec<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    requested_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn stored_names(stack: &[TechStack]) -> Vec<String> {
    stack.iter().map(|entry| entry.as_str().to_owned()).collect()
}

impl IdeaDocument {
    fn new(fields: IdeaFields, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            tech_stack: stored_names(&fields.tech_stack),
            tags: fields.tags,
            status: Some(fields.status.as_str().to_owned()),
            requested_by: fields.requested_by,
            created_at: now,
            updated_at: now,
        }
    }

    fn replace(&mut self, fields: IdeaFields, now: DateTime<Utc>) {
        self.title = fields.title;
        self.description = fields.description;
        self.tech_stack = stored_names(&fields.tech_stack);
        self.tags = fields.tags;
        self.status = Some(fields.status.as_str().to_owned());
        self.requested_by = fields.requested_by;
        self.updated_at = now;
    }

    fn to_idea(&self) -> Idea {
        let status = self
            .status
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map_or(IdeaStatus::Requested, |raw| status_from_stored(self.id, raw));
        Idea {
            id: IdeaId::from_uuid(self.id),
            title: self.title.clone(),
            description: self.description.clone(),
            tech_stack: tech_stack_from_stored(self.id, &self.tech_stack),
            tags: self.tags.clone(),
            status,
            vote_count: 0,
            requested_by: self.requested_by.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Idea repository persisting to a single JSON file.
#[derive(Clone)]
pub struct JsonIdeaRepository {
    dir: Arc<Dir>,
    file_name: PathBuf,
    clock: Arc<dyn Clock>,
}

fn storage_error(path: &Path, error: &io::Error) -> IdeaRepositoryError {
    IdeaRepositoryError::storage(format!("{}: {error}", path.display()))
}

impl JsonIdeaRepository {
    /// Open the store at `path`, creating it with an empty collection when
    /// the file does not exist yet. The parent directory must exist.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use std::sync::Arc;
    ///
    /// use idea_board::outbound::json_store::JsonIdeaRepository;
    /// use mockable::DefaultClock;
    ///
    /// let repo = JsonIdeaRepository::open("ideas.json", Arc::new(DefaultClock))?;
    /// # Ok::<(), idea_board::domain::ports::IdeaRepositoryError>(())
    /// ```
    pub fn open(
        path: impl AsRef<Path>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, IdeaRepositoryError> {
        let path = path.as_ref();
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().map(PathBuf::from).ok_or_else(|| {
            IdeaRepositoryError::storage(format!("{} has no file name", path.display()))
        })?;

        let dir = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(|err| storage_error(parent, &err))?;
        if !dir.exists(&file_name) {
            dir.write(&file_name, b"[]")
                .map_err(|err| storage_error(path, &err))?;
            debug!(path = %path.display(), "created empty idea store");
        }

        Ok(Self {
            dir: Arc::new(dir),
            file_name,
            clock,
        })
    }

    fn read_documents(&self) -> Result<Vec<IdeaDocument>, IdeaRepositoryError> {
        let raw = self
            .dir
            .read_to_string(&self.file_name)
            .map_err(|err| storage_error(&self.file_name, &err))?;
        serde_json::from_str(&raw).map_err(|err| {
            IdeaRepositoryError::storage(format!(
                "{} is not a valid idea collection: {err}",
                self.file_name.display()
            ))
        })
    }

    fn write_documents(&self, documents: &[IdeaDocument]) -> Result<(), IdeaRepositoryError> {
        let encoded = serde_json::to_vec_pretty(documents).map_err(|err| {
            IdeaRepositoryError::storage(format!("failed to encode ideas: {err}"))
        })?;
        self.dir
            .write(&self.file_name, encoded)
            .map_err(|err| storage_error(&self.file_name, &err))
    }

    /// Run a blocking file operation on Tokio's blocking pool.
    async fn run<T, F>(&self, operation: F) -> Result<T, IdeaRepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Self) -> Result<T, IdeaRepositoryError> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || operation(&store))
            .await
            .map_err(|err| IdeaRepositoryError::storage(format!("file task failed: {err}")))?
    }
}

#[async_trait]
impl IdeaRepository for JsonIdeaRepository {
    async fn list(&self) -> Result<Vec<Idea>, IdeaRepositoryError> {
        self.run(|store| {
            let documents = store.read_documents()?;
            Ok(documents.iter().map(IdeaDocument::to_idea).collect())
        })
        .await
    }

    async fn find_by_id(&self, id: &IdeaId) -> Result<Option<Idea>, IdeaRepositoryError> {
        let id = *id.as_uuid();
        self.run(move |store| {
            let documents = store.read_documents()?;
            Ok(documents
                .iter()
                .find(|document| document.id == id)
                .map(IdeaDocument::to_idea))
        })
        .await
    }

    async fn create(&self, fields: IdeaFields) -> Result<Idea, IdeaRepositoryError> {
        self.run(move |store| {
            let mut documents = store.read_documents()?;
            let document = IdeaDocument::new(fields, store.clock.utc());
            let idea = document.to_idea();
            documents.push(document);
            store.write_documents(&documents)?;
            Ok(idea)
        })
        .await
    }

    async fn update(&self, id: &IdeaId, fields: IdeaFields) -> Result<Idea, IdeaRepositoryError> {
        let id = *id;
        self.run(move |store| {
            let mut documents = store.read_documents()?;
            let document = documents
                .iter_mut()
                .find(|document| document.id == *id.as_uuid())
                .ok_or_else(|| IdeaRepositoryError::not_found(id))?;
            document.replace(fields, store.clock.utc());
            let idea = document.to_idea();
            store.write_documents(&documents)?;
            Ok(idea)
        })
        .await
    }

    async fn delete(&self, id: &IdeaId) -> Result<(), IdeaRepositoryError> {
        let id = *id;
        self.run(move |store| {
            let mut documents = store.read_documents()?;
            let before = documents.len();
            documents.retain(|document| document.id != *id.as_uuid());
            if documents.len() == before {
                return Err(IdeaRepositoryError::not_found(id));
            }
            store.write_documents(&documents)
        })
        .await
    }
}
