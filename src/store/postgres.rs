//! PostgreSQL store through sqlx. Includes are resolved in the same statement as JSON subqueries.

use super::Store;
use crate::error::ApiError;
use crate::query::QueryOptions;
use crate::schema::ModelSchema;
use crate::sql::{self, PgBindValue, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn query_many(&self, q: &QueryBuf) -> Result<Vec<Value>, ApiError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn query_optional(&self, q: &QueryBuf) -> Result<Option<Value>, ApiError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn count(&self, model: &ModelSchema, options: &QueryOptions) -> Result<u64, ApiError> {
        let q = sql::count(model, options);
        let row = self.query_optional(&q).await?;
        Ok(row.and_then(|r| r.get("count").and_then(Value::as_u64)).unwrap_or(0))
    }

    async fn find_all(&self, model: &ModelSchema, options: &QueryOptions) -> Result<Vec<Value>, ApiError> {
        self.query_many(&sql::select(model, options)).await
    }

    async fn find_by_key(
        &self,
        model: &ModelSchema,
        id: &Value,
        options: &QueryOptions,
    ) -> Result<Option<Value>, ApiError> {
        self.query_optional(&sql::select_by_key(model, id, options)).await
    }

    async fn create(&self, model: &ModelSchema, payload: Value) -> Result<Value, ApiError> {
        let Value::Object(payload) = payload else {
            return Err(ApiError::Store(format!("{}: payload must be an object", model.name)));
        };
        self.query_optional(&sql::insert(model, &payload))
            .await?
            .ok_or_else(|| ApiError::Store(format!("{}: insert returned no row", model.name)))
    }

    async fn save(&self, model: &ModelSchema, id: &Value, row: Value) -> Result<Value, ApiError> {
        let Value::Object(row) = row else {
            return Err(ApiError::Store(format!("{}: row must be an object", model.name)));
        };
        self.query_optional(&sql::update(model, id, &row))
            .await?
            .ok_or_else(|| ApiError::Store(format!("{} {} vanished before save", model.name, id)))
    }

    async fn destroy(&self, model: &ModelSchema, id: &Value, options: &QueryOptions) -> Result<(), ApiError> {
        let q = sql::delete(model, id, options);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        query.execute(&self.pool).await?;
        Ok(())
    }
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

/// Decode one cell by trying the types the builder can produce, most specific first.
fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f32>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n as f64) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(t)) = row.try_get::<Option<chrono::NaiveTime>, _>(name) {
        return Value::String(t.format("%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}
