//! GraphQL-style arguments and selection sets, independent of any GraphQL server crate.
//!
//! A resolver hands over its arguments (`sort: ["price-desc"]`, `filter: {...}`, `first`,
//! `offset`) and the selection under the root field as a [`Selection`] tree.

use super::{push_filter, push_page, push_sort};
use crate::action::{ActionKind, IndexAction, Requested, SelectAction};
use crate::entity::Field;
use crate::error::ApiError;
use crate::hooks::{HookRequest, HookTrigger};
use crate::query::SortCriteria;
use crate::relationship::{join_path, Relationship};
use serde_json::{Map, Value};

/// One selected field; leaves have no children.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub children: Vec<Selection>,
}

impl Selection {
    pub fn leaf(name: impl Into<String>) -> Self {
        Selection {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn node(name: impl Into<String>, children: Vec<Selection>) -> Self {
        Selection {
            name: name.into(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Entries shaped `field-criteria`, e.g. `price-desc`. The criteria is taken after the last `-`
/// and defaults to ascending when absent.
pub fn parse_sort(action: &mut IndexAction, configs: &[String]) -> Result<(), ApiError> {
    for config in configs {
        let (name, criteria) = match config.rsplit_once('-') {
            Some((name, criteria)) => {
                let criteria = criteria
                    .parse::<SortCriteria>()
                    .map_err(|_| ApiError::invalid_sort(format!("property '{}' has an invalid sort order!", name)))?;
                (name, criteria)
            }
            None => (config.as_str(), SortCriteria::Asc),
        };
        push_sort(action, name, criteria)?;
    }
    Ok(())
}

pub fn parse_filter(action: &mut IndexAction, configs: &Map<String, Value>) -> Result<(), ApiError> {
    for (field, value) in configs {
        push_filter(action, field, value.clone())?;
    }
    Ok(())
}

/// `first` maps to `limit`. Page hooks on `limit`/`offset` receive the raw argument, absent or not.
pub fn parse_page(action: &mut IndexAction, first: Option<i64>, offset: Option<i64>) -> Result<(), ApiError> {
    for (key, value) in [("limit", first), ("offset", offset)] {
        push_page(action, key, value.map(Value::from))?;
    }
    Ok(())
}

/// Leaf selections of the root (under `nodes` for index) become the projected fields.
pub fn parse_root_fields<A: SelectAction>(action: &mut A, selections: &[Selection]) {
    let fields = match scope(action.kind(), selections) {
        Some(selections) => leaf_fields(selections),
        None => Vec::new(),
    };
    action.set_selected_fields(fields);
}

/// Non-leaf selections become relationships, resolved against the entity. A top-level
/// relationship with a leaf path matching a `relationship` hook is replaced by a hook request;
/// when several paths match, the last one wins.
pub fn parse_relationships<A: SelectAction>(action: &mut A, selections: &[Selection]) -> Result<(), ApiError> {
    let Some(selections) = scope(action.kind(), selections) else {
        return Ok(());
    };
    let mut tree = relationships_from(selections);
    action.entity().find_relationship_sources(&mut tree, None)?;

    let mut relationships = Vec::with_capacity(tree.len());
    for relationship in tree {
        let mut requested = None;
        for path in relationship.paths() {
            let path = join_path(&path);
            let hooks = action.entity().find_hooks(HookTrigger::Relationship, Some(&path));
            if !hooks.is_empty() {
                requested = Some(HookRequest::new(path, None, hooks));
            }
        }
        relationships.push(match requested {
            Some(request) => Requested::Hooked(request),
            None => Requested::Plain(relationship),
        });
    }
    action.set_relationships(relationships);
    Ok(())
}

/// Index results wrap rows in a connection; the entity's fields sit under `nodes`.
fn scope(kind: ActionKind, selections: &[Selection]) -> Option<&[Selection]> {
    match kind {
        ActionKind::Index => selections
            .iter()
            .find(|s| s.name == "nodes")
            .map(|s| s.children.as_slice()),
        _ => Some(selections),
    }
}

fn leaf_fields(selections: &[Selection]) -> Vec<Field> {
    selections
        .iter()
        .filter(|s| s.is_leaf())
        .map(|s| Field::named(&s.name))
        .collect()
}

fn relationships_from(selections: &[Selection]) -> Vec<Relationship> {
    selections
        .iter()
        .filter(|s| !s.is_leaf())
        .map(|s| {
            Relationship::named(&s.name)
                .with_fields(leaf_fields(&s.children))
                .with_children(relationships_from(&s.children))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::test_support;
    use crate::entity::EntityOptions;
    use crate::error::ErrorKind;
    use crate::hooks::{Hook, HookRegistry};
    use serde_json::json;

    fn car_selection() -> Vec<Selection> {
        vec![
            Selection::leaf("totalCount"),
            Selection::node(
                "nodes",
                vec![
                    Selection::leaf("id"),
                    Selection::leaf("name"),
                    Selection::node(
                        "Person",
                        vec![Selection::leaf("name"), Selection::node("City", vec![Selection::leaf("name")])],
                    ),
                    Selection::node("Tyres", vec![Selection::leaf("brand")]),
                ],
            ),
        ]
    }

    #[test]
    fn index_reads_nodes() {
        let (cars, _) = test_support::entity("Car", EntityOptions::new(), HookRegistry::new());
        let mut action = cars.new_index_action();
        parse_root_fields(&mut action, &car_selection());
        parse_relationships(&mut action, &car_selection()).unwrap();

        let names: Vec<_> = action.selected_fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(action.relationships.len(), 2);
        let person = action.relationships[0].as_plain().unwrap();
        assert_eq!(person.fields, vec![Field::named("name")]);
        assert_eq!(person.children[0].source.as_ref().unwrap().name, "City");
    }

    #[test]
    fn show_reads_root_and_hook_replaces_relationship() {
        let (cars, _) = test_support::entity(
            "Car",
            EntityOptions::new().hook(Hook::new(HookTrigger::Relationship).matching("person.city")),
            HookRegistry::new(),
        );
        let mut action = cars.new_show_action();
        let selection = vec![
            Selection::leaf("name"),
            Selection::node("Person", vec![Selection::node("City", vec![Selection::leaf("name")])]),
        ];
        parse_root_fields(&mut action, &selection);
        parse_relationships(&mut action, &selection).unwrap();
        assert_eq!(action.selected_fields, vec![Field::named("name")]);
        assert_eq!(action.relationships[0].as_hooked().unwrap().name, "person.city");
    }

    #[test]
    fn sort_and_page_arguments() {
        let (cars, _) = test_support::entity("Car", EntityOptions::new(), HookRegistry::new());
        let mut action = cars.new_index_action();
        parse_sort(&mut action, &["price-desc".to_string(), "name".to_string()]).unwrap();
        assert_eq!(action.sort[0].as_plain().unwrap().criteria, SortCriteria::Desc);
        assert_eq!(action.sort[1].as_plain().unwrap().criteria, SortCriteria::Asc);
        let err = parse_sort(&mut action, &["price-sideways".to_string()]).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidSort));

        parse_page(&mut action, Some(10), None).unwrap();
        assert_eq!(action.page.limit, Some(10));
        assert_eq!(action.page.offset, None);
        assert!(parse_page(&mut action, Some(-1), None).is_err());

        parse_filter(&mut action, json!({ "PersonId": 1 }).as_object().unwrap()).unwrap();
        assert_eq!(action.filters.len(), 1);
    }
}
