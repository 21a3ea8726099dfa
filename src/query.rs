//! Backend query options assembled by the action context builders.

use crate::schema::{AssociationMeta, ModelSchema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortCriteria {
    #[default]
    Asc,
    Desc,
}

impl SortCriteria {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriteria::Asc => "asc",
            SortCriteria::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortCriteria {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortCriteria::Asc),
            "desc" => Ok(SortCriteria::Desc),
            other => Err(format!("invalid sort criteria: {}", other)),
        }
    }
}

/// One `[field, criteria]` pair of the order clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub criteria: SortCriteria,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, criteria: SortCriteria) -> Self {
        OrderBy {
            field: field.into(),
            criteria,
        }
    }
}

/// Eager-load descriptor: `{ model, as?, include, attributes? }`.
#[derive(Clone, Debug, PartialEq)]
pub struct Include {
    pub model: Arc<ModelSchema>,
    /// Association name the rows are nested under. `None` picks the first association to `model`.
    pub association: Option<String>,
    pub include: Vec<Include>,
    pub attributes: Option<Vec<String>>,
}

impl Include {
    pub fn new(model: Arc<ModelSchema>) -> Self {
        Include {
            model,
            association: None,
            include: Vec::new(),
            attributes: None,
        }
    }

    pub fn named(model: Arc<ModelSchema>, association: impl Into<String>) -> Self {
        Include {
            association: Some(association.into()),
            ..Include::new(model)
        }
    }

    /// The association of `parent` this include loads. Names match case-insensitively.
    pub fn association_in<'a>(&self, parent: &'a ModelSchema) -> Option<&'a AssociationMeta> {
        match &self.association {
            Some(name) => parent
                .associations
                .iter()
                .find(|a| a.target == self.model.name && a.name.eq_ignore_ascii_case(name)),
            None => parent.association_to(&self.model.name),
        }
    }
}

/// Context handed to the store. Hooks may add arbitrary keys through `extra`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryOptions {
    pub sub_query: Option<bool>,
    /// Field projection; `None` selects every column.
    pub attributes: Option<Vec<String>>,
    pub include: Vec<Include>,
    pub where_: Map<String, Value>,
    pub order: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub extra: Map<String, Value>,
}

impl QueryOptions {
    /// Starting point for index/show contexts.
    pub fn select() -> Self {
        QueryOptions {
            sub_query: Some(false),
            ..Default::default()
        }
    }

    /// Set a key by name: `limit`, `offset` and `subQuery` go to their typed slots when the value fits,
    /// anything else lands in `extra`.
    pub fn assign(&mut self, key: &str, value: Value) {
        match key {
            "limit" | "offset" => match as_u64(&value) {
                Some(n) if key == "limit" => self.limit = Some(n),
                Some(n) => self.offset = Some(n),
                None => {
                    self.extra.insert(key.to_string(), value);
                }
            },
            "subQuery" => match value.as_bool() {
                Some(b) => self.sub_query = Some(b),
                None => {
                    self.extra.insert(key.to_string(), value);
                }
            },
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

pub(crate) fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
