//! Application layer: use-case services over the domain repositories

pub mod api_keys;
pub mod identity;

pub use api_keys::ApiKeyService;
pub use identity::{Credentials, IdentityService};
