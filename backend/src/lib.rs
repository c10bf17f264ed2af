//! Idea board library: domain services, storage adapters and wiring.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod services;

pub use config::AppSettings;
pub use services::AppServices;
