//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations for ideas, users and votes, backed by
//! `diesel-async` connections pooled with `bb8`.
//!
//! Diesel row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module; repositories translate rows into domain types and
//! database errors into port errors.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use idea_board::outbound::persistence::{
//!     ensure_schema, DbPool, DieselIdeaRepository, PoolConfig,
//! };
//! use mockable::DefaultClock;
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/ideas")).await?;
//! ensure_schema(&pool).await?;
//! let ideas = DieselIdeaRepository::new(pool, Arc::new(DefaultClock));
//! # drop(ideas);
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_idea_repository;
mod diesel_user_repository;
mod diesel_vote_repository;
mod models;
mod pool;
mod schema;
mod schema_bootstrap;

pub use diesel_idea_repository::DieselIdeaRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_vote_repository::DieselVoteRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
pub use schema_bootstrap::{ensure_schema, SchemaError};
