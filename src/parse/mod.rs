//! Request-fragment parsers: turn transport input into action fields, validating against the entity
//! before any store call.

pub mod graphql;
pub mod rest;

use crate::action::{Filter, IndexAction, Requested, Sort};
use crate::error::ApiError;
use crate::hooks::{HookRequest, HookTrigger};
use crate::query::SortCriteria;
use serde_json::Value;

/// Queue one sort entry: a hook request when `sort` hooks match the name, else a plain sort.
pub(crate) fn push_sort(action: &mut IndexAction, name: &str, criteria: SortCriteria) -> Result<(), ApiError> {
    let hooks = action.entity.find_hooks(HookTrigger::Sort, Some(name));
    if !hooks.is_empty() {
        let value = Value::String(criteria.as_str().to_string());
        action.sort.push(HookRequest::new(name, Some(value), hooks).into());
    } else if action.entity.is_sortable(name) {
        action.sort.push(Requested::Plain(Sort::new(name, criteria)));
    } else {
        return Err(ApiError::invalid_sort(format!("property '{}' isn't sortable!", name)));
    }
    Ok(())
}

/// Queue one filter entry, hook requests first as for sorting.
pub(crate) fn push_filter(action: &mut IndexAction, name: &str, value: Value) -> Result<(), ApiError> {
    let hooks = action.entity.find_hooks(HookTrigger::Filter, Some(name));
    if !hooks.is_empty() {
        action.filters.push(HookRequest::new(name, Some(value), hooks).into());
    } else if action.entity.is_filterable(name) {
        action.filters.push(Requested::Plain(Filter::new(name, value)));
    } else {
        return Err(ApiError::invalid_filter(format!("property '{}' isn't filterable!", name)));
    }
    Ok(())
}

/// Queue one page entry. Without a matching hook only `limit` and `offset` are accepted.
pub(crate) fn push_page(action: &mut IndexAction, key: &str, value: Option<Value>) -> Result<(), ApiError> {
    let hooks = action.entity.find_hooks(HookTrigger::Page, Some(key));
    if !hooks.is_empty() {
        action.page_hooks.push(HookRequest::new(key, value, hooks));
        return Ok(());
    }
    let slot = match key {
        "limit" => &mut action.page.limit,
        "offset" => &mut action.page.offset,
        _ => {
            return Err(ApiError::invalid_pagination(format!(
                "property '{}' is invalid for pagination!",
                key
            )))
        }
    };
    *slot = match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(crate::query::as_u64(&v).ok_or_else(|| {
            ApiError::invalid_pagination(format!("property '{}' must be a non-negative integer, got {}", key, v))
        })?),
    };
    Ok(())
}
