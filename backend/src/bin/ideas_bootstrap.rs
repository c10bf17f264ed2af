//! Prepare idea board storage and report readiness.
//!
//! Loads `IDEAS_*` settings, creates the PostgreSQL schema or the JSON idea
//! file, then logs what is available and exits.

use color_eyre::eyre::{eyre, Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use idea_board::config::AppSettings;
use idea_board::services::AppServices;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    info!(?settings, "settings loaded");

    let services = AppServices::build(&settings)
        .await
        .wrap_err("failed to prepare storage")?;

    let ideas = services
        .ideas
        .get_all_ideas()
        .await
        .map_err(|err| eyre!("failed to read ideas: {err}"))?;

    info!(
        backend = %services.backend,
        ideas = ideas.len(),
        users_enabled = services.users.is_some(),
        votes_enabled = services.votes.is_some(),
        "idea board storage ready"
    );
    Ok(())
}
