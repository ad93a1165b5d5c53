//! API key use-cases

pub mod service;

pub use service::ApiKeyService;
