//! Relationship request trees and their resolution against the association graph.

use crate::entity::Field;
use crate::error::ApiError;
use crate::schema::{AssociationKind, Catalog, ModelSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    HasOne,
    HasMany,
    BelongsTo,
}

impl From<AssociationKind> for RelationshipType {
    fn from(kind: AssociationKind) -> Self {
        match kind {
            AssociationKind::HasOne => RelationshipType::HasOne,
            AssociationKind::HasMany => RelationshipType::HasMany,
            AssociationKind::BelongsTo => RelationshipType::BelongsTo,
        }
    }
}

/// A node of a nested include request. `source` stays `None` until resolved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Relationship {
    pub name: String,
    pub source: Option<Arc<ModelSchema>>,
    pub relationship_type: Option<RelationshipType>,
    pub children: Vec<Relationship>,
    /// Field selection for the related entity; empty selects everything.
    pub fields: Vec<Field>,
}

impl Relationship {
    pub fn named(name: impl Into<String>) -> Self {
        Relationship {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<Relationship>) -> Self {
        self.children = children;
        self
    }

    pub fn with_source(mut self, source: Arc<ModelSchema>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.source.is_some() && self.children.iter().all(Relationship::is_resolved)
    }

    /// Root-to-leaf paths of lowercased names, e.g. `[["person", "city"], ["person", "cars"]]`.
    pub fn paths(&self) -> Vec<Vec<String>> {
        let head = self.name.to_lowercase();
        if self.children.is_empty() {
            return vec![vec![head]];
        }
        self.children
            .iter()
            .flat_map(Relationship::paths)
            .map(|mut tail| {
                tail.insert(0, head.clone());
                tail
            })
            .collect()
    }
}

/// Dot-joined form of a path, as matched by `relationship` hooks.
pub fn join_path(segments: &[String]) -> String {
    segments.join(".")
}

/// Resolve every node of `relationships` against `source`'s associations, recursing into children.
///
/// Association keys are matched case-insensitively. Nodes that already carry a source keep it.
/// Fails fast with `invalid-relationship` on the first unknown name.
pub fn resolve_sources(
    catalog: &Catalog,
    relationships: &mut [Relationship],
    source: &ModelSchema,
) -> Result<(), ApiError> {
    for relationship in relationships.iter_mut() {
        let next = match &relationship.source {
            Some(existing) => existing.clone(),
            None => {
                let found = source
                    .associations
                    .iter()
                    .filter(|a| a.name.eq_ignore_ascii_case(&relationship.name))
                    .find_map(|a| catalog.get(&a.target).map(|target| (target, a.kind)));
                let Some((target, kind)) = found else {
                    return Err(ApiError::invalid_relationship(format!(
                        "relationship {} not found!",
                        relationship.name
                    )));
                };
                relationship.source = Some(target.clone());
                relationship.relationship_type = Some(kind.into());
                target
            }
        };
        resolve_sources(catalog, &mut relationship.children, &next)?;
    }
    Ok(())
}

/// Merge dot-separated include paths into a tree, keeping first-seen order. Empty segments are skipped.
pub fn tree_from_paths<'a, I>(paths: I) -> Vec<Relationship>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut roots: Vec<Relationship> = Vec::new();
    for path in paths {
        let mut level = &mut roots;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            let idx = match level.iter().position(|r| r.name == segment) {
                Some(idx) => idx,
                None => {
                    level.push(Relationship::named(segment));
                    level.len() - 1
                }
            };
            level = &mut level[idx].children;
        }
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn catalog() -> Catalog {
        [
            ModelSchema::new("City").table("Cities").has_many("People", "Person", "CityId"),
            ModelSchema::new("Person")
                .table("People")
                .column("CityId", "INTEGER")
                .belongs_to("City", "City", "CityId")
                .has_many("Cars", "Car", "PersonId"),
            ModelSchema::new("Car")
                .table("Cars")
                .column("PersonId", "INTEGER")
                .belongs_to("Person", "Person", "PersonId")
                .has_many("Tyres", "Tyre", "CarId"),
            ModelSchema::new("Tyre").table("Tyres").column("CarId", "INTEGER").belongs_to("Car", "Car", "CarId"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn resolves_nested_tree_case_insensitively() {
        let catalog = catalog();
        let city = catalog.get("City").unwrap();
        let mut tree = vec![Relationship::named("people")
            .with_children(vec![Relationship::named("cars").with_children(vec![Relationship::named("tyres")])])];
        resolve_sources(&catalog, &mut tree, &city).unwrap();

        assert!(tree[0].is_resolved());
        assert_eq!(tree[0].source.as_ref().unwrap().name, "Person");
        assert_eq!(tree[0].relationship_type, Some(RelationshipType::HasMany));
        assert_eq!(tree[0].children[0].source.as_ref().unwrap().name, "Car");
        assert_eq!(tree[0].children[0].children[0].source.as_ref().unwrap().name, "Tyre");
    }

    #[test]
    fn unknown_name_fails() {
        let catalog = catalog();
        let car = catalog.get("Car").unwrap();
        let mut tree = vec![Relationship::named("person"), Relationship::named("brand")];
        let err = resolve_sources(&catalog, &mut tree, &car).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidRelationship));
        assert!(err.to_string().contains("brand"));
        assert_eq!(tree[0].source.as_ref().unwrap().name, "Person");
    }

    #[test]
    fn resolution_is_idempotent() {
        let catalog = catalog();
        let car = catalog.get("Car").unwrap();
        let sentinel = Arc::new(ModelSchema::new("Sentinel"));
        let mut tree = vec![Relationship::named("Person").with_source(sentinel.clone())];
        resolve_sources(&catalog, &mut tree, &car).unwrap();
        assert!(Arc::ptr_eq(tree[0].source.as_ref().unwrap(), &sentinel));

        let mut tree = vec![Relationship::named("person").with_children(vec![Relationship::named("city")])];
        resolve_sources(&catalog, &mut tree, &car).unwrap();
        let first = tree.clone();
        resolve_sources(&catalog, &mut tree, &car).unwrap();
        assert_eq!(tree, first);
    }

    #[test]
    fn children_resolve_under_a_preset_source() {
        let catalog = catalog();
        let tyre = catalog.get("Tyre").unwrap();
        let person = catalog.get("Person").unwrap();
        let mut tree = vec![Relationship::named("owner")
            .with_source(person)
            .with_children(vec![Relationship::named("city")])];
        resolve_sources(&catalog, &mut tree, &tyre).unwrap();
        assert_eq!(tree[0].relationship_type, None);
        assert_eq!(tree[0].children[0].source.as_ref().unwrap().name, "City");
    }

    #[test]
    fn tree_merges_shared_prefixes() {
        let tree = tree_from_paths(["person.city.country", "brand", "tyres.brand", "person.cars", ""]);
        let names: Vec<_> = tree.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["person", "brand", "tyres"]);
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].children[0].name, "country");
    }

    #[test]
    fn paths_are_lowercase_leaf_paths() {
        let rel = Relationship::named("Person")
            .with_children(vec![Relationship::named("City"), Relationship::named("Cars")]);
        let joined: Vec<_> = rel.paths().iter().map(|p| join_path(p)).collect();
        assert_eq!(joined, vec!["person.city", "person.cars"]);
    }
}
