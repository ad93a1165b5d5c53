//! Identity module: resolves request credentials to the calling user

pub mod service;

pub use service::{Credentials, IdentityService};
