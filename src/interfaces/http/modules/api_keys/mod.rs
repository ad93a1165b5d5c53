//! API keys module: the versioned API key resource

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
