//! Routers for the generated API.

pub mod common;
pub mod entity;

pub use common::common_routes;
pub use entity::{api_routes, entity_routes, DEFAULT_BODY_LIMIT};
