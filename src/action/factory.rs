//! Context-building stages shared by the actions. Each stage takes the running
//! [`QueryOptions`] and returns it extended; hook requests found along the way are
//! applied in their position.

use super::{Filter, Page, Requested, Sort};
use crate::entity::Field;
use crate::error::ApiError;
use crate::hooks::HookRequest;
use crate::query::{Include, OrderBy, QueryOptions};
use crate::relationship::Relationship;

/// Append selected field names to `attributes`. No selection leaves the projection untouched.
pub fn factory_attributes(selected_fields: &[Field], mut context: QueryOptions) -> QueryOptions {
    if !selected_fields.is_empty() {
        context
            .attributes
            .get_or_insert_with(Vec::new)
            .extend(selected_fields.iter().map(|f| f.name.clone()));
    }
    context
}

pub fn factory_include(
    relationships: &[Requested<Relationship>],
    mut context: QueryOptions,
) -> Result<QueryOptions, ApiError> {
    for entry in relationships {
        match entry {
            Requested::Hooked(request) => context = request.apply(context)?,
            Requested::Plain(relationship) => {
                let include = factory_relationship(std::slice::from_ref(relationship))?;
                context.include.extend(include);
            }
        }
    }
    Ok(context)
}

/// Turn a resolved relationship tree into nested include descriptors.
pub fn factory_relationship(relationships: &[Relationship]) -> Result<Vec<Include>, ApiError> {
    relationships
        .iter()
        .map(|relationship| {
            let model = relationship.source.clone().ok_or_else(|| {
                ApiError::invalid_relationship(format!("relationship {} not found!", relationship.name))
            })?;
            let attributes = if relationship.fields.is_empty() {
                None
            } else {
                Some(relationship.fields.iter().map(|f| f.name.clone()).collect())
            };
            Ok(Include {
                model,
                association: Some(relationship.name.clone()),
                include: factory_relationship(&relationship.children)?,
                attributes,
            })
        })
        .collect()
}

pub fn factory_where(filters: &[Requested<Filter>], mut context: QueryOptions) -> Result<QueryOptions, ApiError> {
    for entry in filters {
        match entry {
            Requested::Hooked(request) => context = request.apply(context)?,
            Requested::Plain(filter) => {
                context.where_.insert(filter.name.clone(), filter.value.clone());
            }
        }
    }
    Ok(context)
}

pub fn factory_order(sort: &[Requested<Sort>], mut context: QueryOptions) -> Result<QueryOptions, ApiError> {
    for entry in sort {
        match entry {
            Requested::Hooked(request) => context = request.apply(context)?,
            Requested::Plain(s) => context.order.push(OrderBy::new(s.name.clone(), s.criteria)),
        }
    }
    Ok(context)
}

/// Copy `limit`/`offset` from the page, then run every page hook request in order.
pub fn factory_page(page: &Page, page_hooks: &[HookRequest], mut context: QueryOptions) -> Result<QueryOptions, ApiError> {
    context.limit = page.limit;
    context.offset = page.offset;
    for request in page_hooks {
        context = request.apply(context)?;
    }
    Ok(context)
}
