//! # API keys service
//!
//! Versioned REST API (`/v1/api_keys`) for creating, listing, fetching and
//! deleting API keys, with API key or JWT authentication.
//!
//! ## Architecture
//!
//! - **domain**: entities and repository traits
//! - **application**: use-case services (API keys, identity)
//! - **infrastructure**: SeaORM persistence, token generation and JWT
//! - **interfaces**: HTTP router, middleware and handlers
//! - **shared**: error types and shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig};

pub use interfaces::http::create_api_router;
