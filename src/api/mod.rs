// src/api/mod.rs
// HTTP surface: shared error/list types, service endpoints and the top-level router

pub mod common;
pub mod error;
pub mod handlers;
pub mod router;

pub use error::{ApiError, ApiResult};
pub use router::build_router;
