//! Storage backends the actions run against.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::ApiError;
use crate::query::QueryOptions;
use crate::schema::ModelSchema;
use async_trait::async_trait;
use serde_json::Value;

/// Query capability of a backend. Rows are JSON objects keyed by column name, with
/// included associations nested under the association name.
#[async_trait]
pub trait Store: Send + Sync {
    /// Rows matching `options.where_`; ordering, paging and projection are ignored.
    async fn count(&self, model: &ModelSchema, options: &QueryOptions) -> Result<u64, ApiError>;

    async fn find_all(&self, model: &ModelSchema, options: &QueryOptions) -> Result<Vec<Value>, ApiError>;

    async fn find_by_key(
        &self,
        model: &ModelSchema,
        id: &Value,
        options: &QueryOptions,
    ) -> Result<Option<Value>, ApiError>;

    /// Insert a row and return it as stored, primary key included.
    async fn create(&self, model: &ModelSchema, payload: Value) -> Result<Value, ApiError>;

    /// Persist a full row previously fetched with `find_by_key`.
    async fn save(&self, model: &ModelSchema, id: &Value, row: Value) -> Result<Value, ApiError>;

    /// Delete the row with key `id`, further scoped by `options.where_`.
    async fn destroy(&self, model: &ModelSchema, id: &Value, options: &QueryOptions) -> Result<(), ApiError>;
}
