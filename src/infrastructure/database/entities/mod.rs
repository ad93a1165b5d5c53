//! Database entities module

pub mod api_key;
pub mod user;

pub use api_key::Entity as ApiKey;
pub use user::Entity as User;
