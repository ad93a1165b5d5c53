//! User aggregate
//!
//! Users are read-only for the API key resource; creation only happens
//! during bootstrap.

pub mod model;
pub mod repository;

mod dto_create;

pub use dto_create::CreateUserDto;
pub use model::User;
pub use repository::UserRepositoryInterface;
