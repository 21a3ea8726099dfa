//! In-process store: rows kept as JSON objects per model.

use super::Store;
use crate::error::ApiError;
use crate::query::{Include, OrderBy, QueryOptions, SortCriteria};
use crate::schema::{AssociationKind, Catalog, ModelSchema};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

pub struct MemoryStore {
    catalog: Arc<Catalog>,
    tables: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        MemoryStore {
            catalog,
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Append rows to a model's table as-is.
    pub fn seed(&self, model: &str, rows: Vec<Value>) {
        self.tables.write().entry(model.to_string()).or_default().extend(rows);
    }

    /// Snapshot of a model's rows in storage order.
    pub fn rows(&self, model: &str) -> Vec<Value> {
        self.tables.read().get(model).cloned().unwrap_or_default()
    }

    fn select(&self, tables: &HashMap<String, Vec<Value>>, model: &ModelSchema, row: &Value, options: &QueryOptions) -> Value {
        let mut out = project(row, options.attributes.as_deref());
        if let Value::Object(out) = &mut out {
            for include in &options.include {
                if let Some((key, nested)) = self.expand(tables, model, row, include) {
                    out.insert(key, nested);
                }
            }
        }
        out
    }

    fn expand(
        &self,
        tables: &HashMap<String, Vec<Value>>,
        model: &ModelSchema,
        row: &Value,
        include: &Include,
    ) -> Option<(String, Value)> {
        let Some(association) = include.association_in(model) else {
            tracing::warn!(model = %model.name, target = %include.model.name, "include has no association, skipped");
            return None;
        };
        let target = &include.model;
        let nested = QueryOptions {
            attributes: include.attributes.clone(),
            include: include.include.clone(),
            ..Default::default()
        };
        let candidates = tables.get(&target.name).map(Vec::as_slice).unwrap_or_default();
        let render = |r: &Value| self.select(tables, target, r, &nested);
        let value = match association.kind {
            AssociationKind::BelongsTo => {
                let fk = row.get(&association.foreign_key).unwrap_or(&Value::Null);
                candidates
                    .iter()
                    .find(|r| !fk.is_null() && r.get(&target.primary_key).is_some_and(|pk| loose_eq(pk, fk)))
                    .map(render)
                    .unwrap_or(Value::Null)
            }
            AssociationKind::HasOne | AssociationKind::HasMany => {
                let pk = row.get(&model.primary_key).unwrap_or(&Value::Null);
                let mut related = candidates
                    .iter()
                    .filter(|r| r.get(&association.foreign_key).is_some_and(|fk| loose_eq(fk, pk)))
                    .map(render);
                if association.kind == AssociationKind::HasMany {
                    Value::Array(related.collect())
                } else {
                    related.next().unwrap_or(Value::Null)
                }
            }
        };
        Some((association.name.clone(), value))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn count(&self, model: &ModelSchema, options: &QueryOptions) -> Result<u64, ApiError> {
        let tables = self.tables.read();
        let count = tables
            .get(&model.name)
            .map(|rows| rows.iter().filter(|r| matches_where(r, &options.where_)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn find_all(&self, model: &ModelSchema, options: &QueryOptions) -> Result<Vec<Value>, ApiError> {
        let tables = self.tables.read();
        let mut rows: Vec<&Value> = tables
            .get(&model.name)
            .map(|rows| rows.iter().filter(|r| matches_where(r, &options.where_)).collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| compare_rows(a, b, &options.order));
        let offset = options.offset.unwrap_or(0) as usize;
        let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|r| self.select(&tables, model, r, options))
            .collect())
    }

    async fn find_by_key(
        &self,
        model: &ModelSchema,
        id: &Value,
        options: &QueryOptions,
    ) -> Result<Option<Value>, ApiError> {
        let tables = self.tables.read();
        let found = tables.get(&model.name).and_then(|rows| {
            rows.iter()
                .find(|r| has_key(r, &model.primary_key, id) && matches_where(r, &options.where_))
        });
        Ok(found.map(|r| self.select(&tables, model, r, options)))
    }

    async fn create(&self, model: &ModelSchema, payload: Value) -> Result<Value, ApiError> {
        let Value::Object(payload) = payload else {
            return Err(ApiError::Store(format!("{}: payload must be an object", model.name)));
        };
        let mut tables = self.tables.write();
        let rows = tables.entry(model.name.clone()).or_default();
        let mut row = Map::new();
        for column in &model.columns {
            row.insert(column.name.clone(), payload.get(&column.name).cloned().unwrap_or(Value::Null));
        }
        for (key, value) in payload {
            row.entry(key).or_insert(value);
        }
        if row.get(&model.primary_key).map_or(true, Value::is_null) {
            let next = rows
                .iter()
                .filter_map(|r| r.get(&model.primary_key).and_then(Value::as_u64))
                .max()
                .unwrap_or(0)
                + 1;
            row.insert(model.primary_key.clone(), Value::from(next));
        }
        let row = Value::Object(row);
        rows.push(row.clone());
        Ok(row)
    }

    async fn save(&self, model: &ModelSchema, id: &Value, row: Value) -> Result<Value, ApiError> {
        let mut tables = self.tables.write();
        let slot = tables
            .get_mut(&model.name)
            .and_then(|rows| rows.iter_mut().find(|r| has_key(r, &model.primary_key, id)))
            .ok_or_else(|| ApiError::Store(format!("{} {} vanished before save", model.name, id)))?;
        *slot = row.clone();
        Ok(row)
    }

    async fn destroy(&self, model: &ModelSchema, id: &Value, options: &QueryOptions) -> Result<(), ApiError> {
        let mut tables = self.tables.write();
        if let Some(rows) = tables.get_mut(&model.name) {
            rows.retain(|r| !(has_key(r, &model.primary_key, id) && matches_where(r, &options.where_)));
        }
        Ok(())
    }
}

fn has_key(row: &Value, primary_key: &str, id: &Value) -> bool {
    row.get(primary_key).is_some_and(|pk| loose_eq(pk, id))
}

/// Every `where` entry must hold; array values mean "any of".
fn matches_where(row: &Value, where_: &Map<String, Value>) -> bool {
    where_.iter().all(|(key, expected)| {
        let actual = row.get(key).unwrap_or(&Value::Null);
        match expected {
            Value::Array(options) => options.iter().any(|o| loose_eq(actual, o)),
            other => loose_eq(actual, other),
        }
    })
}

/// Equality that lets `1`, `1.0` and `"1"` meet, as values arriving from URLs do.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.trim().parse::<f64>().ok() == n.as_f64()
        }
        (Value::Bool(x), Value::String(s)) | (Value::String(s), Value::Bool(x)) => s.parse::<bool>().ok() == Some(*x),
        _ => a == b,
    }
}

fn compare_rows(a: &Value, b: &Value, order: &[OrderBy]) -> Ordering {
    for o in order {
        let null = Value::Null;
        let ord = compare_values(a.get(&o.field).unwrap_or(&null), b.get(&o.field).unwrap_or(&null));
        let ord = match o.criteria {
            SortCriteria::Asc => ord,
            SortCriteria::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn project(row: &Value, attributes: Option<&[String]>) -> Value {
    match (row, attributes) {
        (Value::Object(map), Some(attributes)) => Value::Object(
            attributes
                .iter()
                .filter_map(|a| map.get(a).map(|v| (a.clone(), v.clone())))
                .collect(),
        ),
        _ => row.clone(),
    }
}
