//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **json_store**: single-file JSON document store for ideas
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod json_store;
pub mod persistence;
mod stored_idea;
