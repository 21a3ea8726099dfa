//! REST query syntax: `sort=name,-price`, `filter[name]=x`, `page[limit]=10`, `include=person.city,tyres`.

use super::{push_filter, push_page, push_sort};
use crate::action::{IndexAction, Requested, SelectAction};
use crate::error::ApiError;
use crate::hooks::{HookRequest, HookTrigger};
use crate::query::SortCriteria;
use crate::relationship::tree_from_paths;
use serde_json::{Map, Value};

/// Comma-separated sort keys; a leading `-` sorts descending. Empty entries are ignored.
pub fn parse_sort(action: &mut IndexAction, query: &str) -> Result<(), ApiError> {
    for field in query.split(',').filter(|f| !f.is_empty()) {
        let (name, criteria) = match field.strip_prefix('-') {
            Some(name) => (name, SortCriteria::Desc),
            None => (field, SortCriteria::Asc),
        };
        push_sort(action, name, criteria)?;
    }
    Ok(())
}

pub fn parse_filter(action: &mut IndexAction, query: &Map<String, Value>) -> Result<(), ApiError> {
    for (key, value) in query {
        push_filter(action, key, value.clone())?;
    }
    Ok(())
}

/// Keys `limit` and `offset`, or any key with a matching `page` hook.
pub fn parse_page(action: &mut IndexAction, query: &Map<String, Value>) -> Result<(), ApiError> {
    for (key, value) in query {
        push_page(action, key, Some(value.clone()))?;
    }
    Ok(())
}

/// Dot-separated include paths. Whole entries that match a `relationship` hook become hook
/// requests placed after the resolved tree.
pub fn parse_relationships<A: SelectAction>(action: &mut A, query: &str) -> Result<(), ApiError> {
    if query.is_empty() {
        return Ok(());
    }
    let mut paths = Vec::new();
    let mut hooked = Vec::new();
    for entry in query.split(',') {
        let hooks = action.entity().find_hooks(HookTrigger::Relationship, Some(entry));
        if hooks.is_empty() {
            paths.push(entry);
        } else {
            hooked.push(HookRequest::new(entry, None, hooks));
        }
    }
    let mut tree = tree_from_paths(paths);
    action.entity().find_relationship_sources(&mut tree, None)?;
    let relationships = tree
        .into_iter()
        .map(Requested::Plain)
        .chain(hooked.into_iter().map(Requested::Hooked))
        .collect();
    action.set_relationships(relationships);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::test_support;
    use crate::entity::EntityOptions;
    use crate::error::ErrorKind;
    use crate::hooks::{Hook, HookRegistry};
    use regex::Regex;
    use serde_json::json;

    fn cars(options: EntityOptions) -> IndexAction {
        test_support::entity("Car", options, HookRegistry::new()).0.new_index_action()
    }

    #[test]
    fn sort_keys_and_hooks() {
        let mut action = cars(EntityOptions::new().hook(Hook::new(HookTrigger::Sort).matching("popularity")));
        parse_sort(&mut action, "name,-popularity,,-id").unwrap();
        assert_eq!(action.sort.len(), 3);
        assert_eq!(action.sort[0].as_plain().unwrap().criteria, SortCriteria::Asc);
        let hooked = action.sort[1].as_hooked().unwrap();
        assert_eq!(hooked.name, "popularity");
        assert_eq!(hooked.value, Some(json!("desc")));
        assert_eq!(action.sort[2].as_plain().unwrap().name, "id");

        let err = parse_sort(&mut action, "brand").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidSort));
        assert_eq!(err.to_string(), "invalid-sort: property 'brand' isn't sortable!");
    }

    #[test]
    fn filter_validates() {
        let mut action = cars(EntityOptions::new());
        parse_filter(&mut action, json!({ "name": "Golf" }).as_object().unwrap()).unwrap();
        assert_eq!(action.filters[0].as_plain().unwrap().value, json!("Golf"));
        let err = parse_filter(&mut action, json!({ "color": "red" }).as_object().unwrap()).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidFilter));
    }

    #[test]
    fn page_accepts_limit_offset_and_hooks() {
        let mut action = cars(EntityOptions::new().hook(Hook::new(HookTrigger::Page).matching("number")));
        parse_page(&mut action, json!({ "limit": "10", "offset": 5, "number": 2 }).as_object().unwrap()).unwrap();
        assert_eq!(action.page.limit, Some(10));
        assert_eq!(action.page.offset, Some(5));
        assert_eq!(action.page_hooks[0].value, Some(json!(2)));

        let err = parse_page(&mut action, json!({ "size": 1 }).as_object().unwrap()).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidPagination));
        let err = parse_page(&mut action, json!({ "limit": "ten" }).as_object().unwrap()).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidPagination));
    }

    #[test]
    fn relationships_resolve_and_hooks_go_last() {
        let hook = Hook::new(HookTrigger::Relationship).matching_pattern(Regex::new("^tyres").unwrap());
        let mut action = cars(EntityOptions::new().hook(hook));
        parse_relationships(&mut action, "tyres,person.city,person.cars").unwrap();

        assert_eq!(action.relationships.len(), 2);
        let person = action.relationships[0].as_plain().unwrap();
        assert_eq!(person.source.as_ref().unwrap().name, "Person");
        assert_eq!(person.children.len(), 2);
        assert_eq!(person.children[1].source.as_ref().unwrap().name, "Car");
        assert_eq!(action.relationships[1].as_hooked().unwrap().name, "tyres");
    }

    #[test]
    fn unknown_relationship_fails() {
        let mut action = cars(EntityOptions::new());
        let err = parse_relationships(&mut action, "person.planet").unwrap_err();
        assert_eq!(err.to_string(), "invalid-relationship: relationship planet not found!");
    }
}
