//! Builds parameterized SELECT, COUNT, INSERT, UPDATE and DELETE from model metadata and query options.
//!
//! Identifiers only ever come from [`ModelSchema`]; names in the options that are not
//! columns of the model are dropped with a warning. Values always travel as parameters.

use crate::entity::FieldType;
use crate::query::{Include, QueryOptions};
use crate::schema::{AssociationKind, ColumnMeta, ModelSchema};
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(model: &ModelSchema) -> String {
    match &model.schema {
        Some(schema) => format!("{}.{}", quoted(schema), quoted(&model.table_name)),
        None => quoted(&model.table_name),
    }
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Push a value and return its placeholder, cast to the column type.
    fn placeholder(&mut self, column: &ColumnMeta, v: Value) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, pg_cast(column))
    }
}

/// Cast applied to text parameters bound against `column`.
fn pg_cast(column: &ColumnMeta) -> String {
    match FieldType::from_column_type(&column.type_) {
        Some(FieldType::Integer) => "bigint".into(),
        Some(FieldType::Float) => "double precision".into(),
        Some(FieldType::Boolean) => "boolean".into(),
        Some(FieldType::String) => "text".into(),
        Some(FieldType::Datetime) => "timestamptz".into(),
        Some(FieldType::Date) => "date".into(),
        Some(FieldType::Time) => "time".into(),
        None if is_type_name(&column.type_) => column.type_.clone(),
        None => {
            tracing::warn!(column = %column.name, type_ = %column.type_, "unusable column type, cast as text");
            "text".into()
        }
    }
}

/// Plain type name such as `jsonb`, `varchar(20)`, `public.mood` or `integer[]`.
fn is_type_name(type_name: &str) -> bool {
    let mut chars = type_name.trim().chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || " _.,()[]".contains(c))
}

/// Column as selected: decimals as float8 and custom (schema-qualified) types as text, so rows decode to JSON.
fn column_expr(alias: Option<&str>, column: &ColumnMeta) -> String {
    let name = match alias {
        Some(alias) => format!("{}.{}", alias, quoted(&column.name)),
        None => quoted(&column.name),
    };
    let base = column.type_.split('(').next().unwrap_or_default().trim().to_lowercase();
    if base == "numeric" || base == "decimal" {
        format!("{}::float8", name)
    } else if base.contains('.') {
        format!("{}::text", name)
    } else {
        name
    }
}

fn selected_columns<'a>(model: &'a ModelSchema, attributes: Option<&[String]>) -> Vec<&'a ColumnMeta> {
    match attributes {
        None => model.columns.iter().collect(),
        Some(attributes) => attributes
            .iter()
            .filter_map(|a| {
                let column = model.column_meta(a);
                if column.is_none() {
                    tracing::warn!(model = %model.name, attribute = %a, "unknown attribute skipped");
                }
                column
            })
            .collect(),
    }
}

/// `alias."col" AS "col"` for every selected column, then one subquery per include.
fn select_list(
    q: &mut QueryBuf,
    model: &ModelSchema,
    alias: &str,
    attributes: Option<&[String]>,
    includes: &[Include],
    next_alias: &mut usize,
) -> String {
    let mut parts: Vec<String> = selected_columns(model, attributes)
        .into_iter()
        .map(|c| format!("{} AS {}", column_expr(Some(alias), c), quoted(&c.name)))
        .collect();
    for include in includes {
        if let Some(part) = include_subquery(q, model, alias, include, next_alias) {
            parts.push(part);
        }
    }
    parts.join(", ")
}

fn include_subquery(
    q: &mut QueryBuf,
    parent: &ModelSchema,
    parent_alias: &str,
    include: &Include,
    next_alias: &mut usize,
) -> Option<String> {
    let Some(association) = include.association_in(parent) else {
        tracing::warn!(model = %parent.name, target = %include.model.name, "include has no association, skipped");
        return None;
    };
    let target = include.model.as_ref();
    let alias = format!("t{}", *next_alias);
    *next_alias += 1;
    let join = match association.kind {
        AssociationKind::BelongsTo => format!(
            "{}.{} = {}.{}",
            alias,
            quoted(&target.primary_key),
            parent_alias,
            quoted(&association.foreign_key)
        ),
        AssociationKind::HasOne | AssociationKind::HasMany => format!(
            "{}.{} = {}.{}",
            alias,
            quoted(&association.foreign_key),
            parent_alias,
            quoted(&parent.primary_key)
        ),
    };
    let cols = select_list(q, target, &alias, include.attributes.as_deref(), &include.include, next_alias);
    let inner = format!("SELECT {} FROM {} {} WHERE {}", cols, qualified_table(target), alias, join);
    let subquery = match association.kind {
        AssociationKind::HasMany => format!(
            "(SELECT COALESCE(json_agg(row_to_json(sub)), '[]'::json) FROM ({}) sub)",
            inner
        ),
        _ => format!("(SELECT row_to_json(sub) FROM ({} LIMIT 1) sub)", inner),
    };
    Some(format!("{} AS {}", subquery, quoted(&association.name)))
}

/// WHERE conditions for the root alias. Arrays become `IN`, null becomes `IS NULL`.
fn where_parts(q: &mut QueryBuf, model: &ModelSchema, alias: Option<&str>, where_: &Map<String, Value>) -> Vec<String> {
    let mut parts = Vec::new();
    for (key, value) in where_ {
        let Some(column) = model.column_meta(key) else {
            tracing::warn!(model = %model.name, column = %key, "unknown filter column skipped");
            continue;
        };
        let lhs = match alias {
            Some(alias) => format!("{}.{}", alias, quoted(key)),
            None => quoted(key),
        };
        match value {
            Value::Null => parts.push(format!("{} IS NULL", lhs)),
            Value::Array(values) if values.is_empty() => parts.push("1 = 0".to_string()),
            Value::Array(values) => {
                let placeholders: Vec<String> = values.iter().map(|v| q.placeholder(column, v.clone())).collect();
                parts.push(format!("{} IN ({})", lhs, placeholders.join(", ")));
            }
            other => {
                let ph = q.placeholder(column, other.clone());
                parts.push(format!("{} = {}", lhs, ph));
            }
        }
    }
    parts
}

fn where_clause(parts: &[String]) -> String {
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

const ROOT_ALIAS: &str = "t0";

/// SELECT with projection, includes, filters, ordering (primary key when none given) and paging.
pub fn select(model: &ModelSchema, options: &QueryOptions) -> QueryBuf {
    let mut q = QueryBuf::default();
    let mut next_alias = 1;
    let cols = select_list(
        &mut q,
        model,
        ROOT_ALIAS,
        options.attributes.as_deref(),
        &options.include,
        &mut next_alias,
    );
    let parts = where_parts(&mut q, model, Some(ROOT_ALIAS), &options.where_);

    let mut order: Vec<String> = options
        .order
        .iter()
        .filter(|o| {
            let known = model.has_column(&o.field);
            if !known {
                tracing::warn!(model = %model.name, field = %o.field, "unknown sort column skipped");
            }
            known
        })
        .map(|o| format!("{}.{} {}", ROOT_ALIAS, quoted(&o.field), o.criteria.as_str().to_uppercase()))
        .collect();
    if order.is_empty() {
        order.push(format!("{}.{}", ROOT_ALIAS, quoted(&model.primary_key)));
    }
    let limit_clause = options.limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let offset_clause = options.offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();

    q.sql = format!(
        "SELECT {} FROM {} {}{} ORDER BY {}{}{}",
        cols,
        qualified_table(model),
        ROOT_ALIAS,
        where_clause(&parts),
        order.join(", "),
        limit_clause,
        offset_clause
    );
    q
}

/// SELECT one row by primary key, also honouring `options.where_`.
pub fn select_by_key(model: &ModelSchema, id: &Value, options: &QueryOptions) -> QueryBuf {
    let mut q = QueryBuf::default();
    let mut next_alias = 1;
    let cols = select_list(
        &mut q,
        model,
        ROOT_ALIAS,
        options.attributes.as_deref(),
        &options.include,
        &mut next_alias,
    );
    let mut parts = key_condition(&mut q, model, Some(ROOT_ALIAS), id);
    parts.extend(where_parts(&mut q, model, Some(ROOT_ALIAS), &options.where_));
    q.sql = format!(
        "SELECT {} FROM {} {}{} LIMIT 1",
        cols,
        qualified_table(model),
        ROOT_ALIAS,
        where_clause(&parts)
    );
    q
}

/// COUNT(*) over the filtered rows.
pub fn count(model: &ModelSchema, options: &QueryOptions) -> QueryBuf {
    let mut q = QueryBuf::default();
    let parts = where_parts(&mut q, model, Some(ROOT_ALIAS), &options.where_);
    q.sql = format!(
        "SELECT COUNT(*) AS \"count\" FROM {} {}{}",
        qualified_table(model),
        ROOT_ALIAS,
        where_clause(&parts)
    );
    q
}

/// INSERT the payload's known columns. A null or absent primary key is left to the database default.
pub fn insert(model: &ModelSchema, payload: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::default();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for column in &model.columns {
        let Some(value) = payload.get(&column.name) else { continue };
        if column.name == model.primary_key && value.is_null() {
            continue;
        }
        cols.push(quoted(&column.name));
        placeholders.push(q.placeholder(column, value.clone()));
    }
    let returning = returning_list(model);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", qualified_table(model), returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            qualified_table(model),
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE by key: SET every known non-key column present in `row`.
pub fn update(model: &ModelSchema, id: &Value, row: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::default();
    let mut sets = Vec::new();
    for column in &model.columns {
        if column.name == model.primary_key {
            continue;
        }
        let Some(value) = row.get(&column.name) else { continue };
        let ph = q.placeholder(column, value.clone());
        sets.push(format!("{} = {}", quoted(&column.name), ph));
    }
    let parts = key_condition(&mut q, model, None, id);
    let returning = returning_list(model);
    q.sql = if sets.is_empty() {
        format!("SELECT {} FROM {}{}", returning, qualified_table(model), where_clause(&parts))
    } else {
        format!(
            "UPDATE {} SET {}{} RETURNING {}",
            qualified_table(model),
            sets.join(", "),
            where_clause(&parts),
            returning
        )
    };
    q
}

/// DELETE by key, further scoped by `options.where_`.
pub fn delete(model: &ModelSchema, id: &Value, options: &QueryOptions) -> QueryBuf {
    let mut q = QueryBuf::default();
    let mut parts = key_condition(&mut q, model, None, id);
    parts.extend(where_parts(&mut q, model, None, &options.where_));
    q.sql = format!("DELETE FROM {}{}", qualified_table(model), where_clause(&parts));
    q
}

fn key_condition(q: &mut QueryBuf, model: &ModelSchema, alias: Option<&str>, id: &Value) -> Vec<String> {
    let mut key = Map::new();
    key.insert(model.primary_key.clone(), id.clone());
    where_parts(q, model, alias, &key)
}

fn returning_list(model: &ModelSchema) -> String {
    model
        .columns
        .iter()
        .map(|c| format!("{} AS {}", column_expr(None, c), quoted(&c.name)))
        .collect::<Vec<_>>()
        .join(", ")
}
