//! Entity handlers: index, show, create, update, delete.
//! Query syntax: `include=a.b,c`, `sort=name,-price`, `filter[name]=x`, `page[limit]=10&page[offset]=20`.

use crate::action::{ActionKind, IndexResult};
use crate::entity::{Entity, FieldType};
use crate::error::ApiError;
use crate::parse::rest;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Query string split into the REST fragments.
#[derive(Debug, Default, PartialEq)]
pub struct ListParams {
    pub include: Option<String>,
    pub sort: Option<String>,
    pub filter: Map<String, Value>,
    pub page: Map<String, Value>,
}

impl ListParams {
    /// Group raw pairs. Filter values are coerced by the entity's field types; unknown keys are ignored.
    pub fn from_pairs(entity: &Entity, pairs: Vec<(String, String)>) -> Self {
        let mut params = ListParams::default();
        for (key, value) in pairs {
            if let Some(name) = bracketed(&key, "filter") {
                let value = coerce_value(entity, name, &value);
                params.filter.insert(name.to_string(), value);
            } else if let Some(name) = bracketed(&key, "page") {
                params.page.insert(name.to_string(), Value::String(value));
            } else {
                match key.as_str() {
                    "include" => params.include = Some(value),
                    "sort" => params.sort = Some(value),
                    _ => {}
                }
            }
        }
        params
    }
}

fn bracketed<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix)?.strip_prefix('[')?.strip_suffix(']')
}

fn coerce_value(entity: &Entity, name: &str, s: &str) -> Value {
    let field_type = entity.field(name).and_then(|f| f.field_type);
    match field_type {
        Some(FieldType::Integer) => {
            if let Ok(n) = s.parse::<i64>() {
                return Value::Number(n.into());
            }
        }
        Some(FieldType::Float) => {
            if let Some(n) = s.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                return Value::Number(n);
            }
        }
        Some(FieldType::Boolean) => {
            if s.eq_ignore_ascii_case("true") {
                return Value::Bool(true);
            }
            if s.eq_ignore_ascii_case("false") {
                return Value::Bool(false);
            }
        }
        _ => {}
    }
    Value::String(s.to_string())
}

/// Entity by path segment, if it exists and enables `kind`.
fn entity_for(state: &AppState, path_segment: &str, kind: ActionKind) -> Result<Arc<Entity>, ApiError> {
    state
        .api
        .entity(path_segment)
        .filter(|e| e.allows(kind))
        .cloned()
        .ok_or_else(|| ApiError::record_not_found(format!("no {} action for '{}'", kind, path_segment)))
}

fn parse_id(entity: &Entity, id_str: &str) -> Result<Value, ApiError> {
    match entity.primary_key().and_then(|f| f.field_type) {
        Some(FieldType::Integer) => id_str
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|_| ApiError::record_not_found("Invalid id")),
        _ => Ok(Value::String(id_str.to_string())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<IndexResult>, ApiError> {
    let entity = entity_for(&state, &path_segment, ActionKind::Index)?;
    let params = ListParams::from_pairs(&entity, pairs);
    let mut action = entity.new_index_action();
    if let Some(include) = &params.include {
        rest::parse_relationships(&mut action, include)?;
    }
    if let Some(sort) = &params.sort {
        rest::parse_sort(&mut action, sort)?;
    }
    rest::parse_filter(&mut action, &params.filter)?;
    rest::parse_page(&mut action, &params.page)?;
    Ok(Json(action.run().await?))
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let entity = entity_for(&state, &path_segment, ActionKind::Show)?;
    let mut action = entity.new_show_action();
    action.id = parse_id(&entity, &id_str)?;
    if let Some((_, include)) = pairs.iter().find(|(k, _)| k == "include") {
        rest::parse_relationships(&mut action, include)?;
    }
    Ok(Json(action.run().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let entity = entity_for(&state, &path_segment, ActionKind::Create)?;
    let mut action = entity.new_create_action();
    action.data = body;
    let row = action.run().await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let entity = entity_for(&state, &path_segment, ActionKind::Update)?;
    let mut action = entity.new_update_action();
    action.id = parse_id(&entity, &id_str)?;
    action.data = body;
    Ok(Json(action.run().await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let entity = entity_for(&state, &path_segment, ActionKind::Delete)?;
    let mut action = entity.new_delete_action();
    action.id = parse_id(&entity, &id_str)?;
    Ok(Json(action.run().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::test_support;
    use crate::entity::EntityOptions;
    use crate::hooks::HookRegistry;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn groups_and_coerces_query_pairs() {
        let (cars, _) = test_support::entity("Car", EntityOptions::new(), HookRegistry::new());
        let params = ListParams::from_pairs(
            &cars,
            pairs(&[
                ("include", "person.city"),
                ("sort", "-price"),
                ("filter[PersonId]", "1"),
                ("filter[price]", "1500.5"),
                ("filter[name]", "Golf"),
                ("page[limit]", "10"),
                ("utm_source", "mail"),
            ]),
        );
        assert_eq!(params.include.as_deref(), Some("person.city"));
        assert_eq!(params.sort.as_deref(), Some("-price"));
        assert_eq!(Value::Object(params.filter), json!({ "PersonId": 1, "price": 1500.5, "name": "Golf" }));
        assert_eq!(Value::Object(params.page), json!({ "limit": "10" }));
    }

    #[test]
    fn integer_ids_must_parse() {
        let (cars, _) = test_support::entity("Car", EntityOptions::new(), HookRegistry::new());
        assert_eq!(parse_id(&cars, "3").unwrap(), json!(3));
        assert!(parse_id(&cars, "abc").unwrap_err().is_not_found());
    }
}
