//! HTTP REST API interfaces
//!
//! - `common`: error responses and the validating JSON extractor
//! - `middleware`: version negotiation and authentication guards
//! - `modules`: resource handlers and cross-cutting middleware
//! - `router`: route table and OpenAPI document

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc};
