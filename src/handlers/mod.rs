//! HTTP handlers for the generated entity endpoints.

pub mod entity;
pub use entity::*;
