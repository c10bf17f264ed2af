//! Service wiring: pick a storage backend and assemble the domain services.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use crate::config::{AppSettings, SettingsError, StorageBackend};
use crate::domain::ports::{IdeaRepository, IdeaRepositoryError, UserRepository, VoteRepository};
use crate::domain::{IdeaService, UserService, VoteService};
use crate::outbound::json_store::JsonIdeaRepository;
use crate::outbound::persistence::{
    ensure_schema, DbPool, DieselIdeaRepository, DieselUserRepository, DieselVoteRepository,
    PoolError, SchemaError,
};

/// Idea service over whichever idea store was configured.
pub type DynIdeaService = IdeaService<dyn IdeaRepository>;
/// User service over the configured user store.
pub type DynUserService = UserService<dyn UserRepository>;
/// Vote service over the configured vote store.
pub type DynVoteService = VoteService<dyn VoteRepository>;

/// Errors raised while assembling services at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("failed to open JSON idea store: {0}")]
    JsonStore(#[from] IdeaRepositoryError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Domain services ready for an inbound adapter.
///
/// The JSON backend only stores ideas, so `users` and `votes` are `None`
/// when it is selected.
#[derive(Clone)]
pub struct AppServices {
    pub backend: StorageBackend,
    pub ideas: DynIdeaService,
    pub users: Option<DynUserService>,
    pub votes: Option<DynVoteService>,
}

impl AppServices {
    /// Build services from settings using the system clock.
    ///
    /// For PostgreSQL this opens the pool and creates missing tables.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] when settings are invalid or the chosen
    /// backend cannot be reached.
    pub async fn build(settings: &AppSettings) -> Result<Self, StartupError> {
        Self::build_with_clock(settings, Arc::new(DefaultClock)).await
    }

    /// Build services with an injected clock.
    ///
    /// # Errors
    ///
    /// See [`AppServices::build`].
    pub async fn build_with_clock(
        settings: &AppSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StartupError> {
        let backend = settings.storage()?;
        let policy = settings.password_policy()?;

        match backend {
            StorageBackend::Json => {
                let path = settings.json_path();
                let repo = JsonIdeaRepository::open(&path, clock)?;
                info!(path = %path.display(), "using JSON idea store");
                Ok(Self {
                    backend,
                    ideas: IdeaService::new(Arc::new(repo) as Arc<dyn IdeaRepository>),
                    users: None,
                    votes: None,
                })
            }
            StorageBackend::Postgres => {
                let pool = DbPool::new(settings.pool_config()?).await?;
                ensure_schema(&pool).await?;
                info!("using PostgreSQL store");

                let ideas: Arc<dyn IdeaRepository> =
                    Arc::new(DieselIdeaRepository::new(pool.clone(), clock.clone()));
                let users: Arc<dyn UserRepository> =
                    Arc::new(DieselUserRepository::new(pool.clone(), clock.clone()));
                let votes: Arc<dyn VoteRepository> =
                    Arc::new(DieselVoteRepository::new(pool, clock));

                Ok(Self {
                    backend,
                    ideas: IdeaService::new(ideas),
                    users: Some(UserService::new(users, policy)),
                    votes: Some(VoteService::new(votes)),
                })
            }
        }
    }
}
