//! Backend model metadata: columns, primary key and associations, plus the catalog that resolves association targets.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Association kind as reported by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociationKind {
    HasOne,
    HasMany,
    BelongsTo,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    /// Backend column type name (e.g. "INTEGER", "varchar(255)", "timestamptz").
    #[serde(rename = "type")]
    pub type_: String,
    /// `None` when the backend does not say; treated as nullable.
    #[serde(default)]
    pub nullable: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssociationMeta {
    /// Association key, usually PascalCase (e.g. "Person", "Cars").
    pub name: String,
    /// Name of the target model in the catalog.
    pub target: String,
    pub kind: AssociationKind,
    /// For `BelongsTo` the column lives on this model; otherwise on the target.
    pub foreign_key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    pub name: String,
    pub table_name: String,
    #[serde(default)]
    pub schema: Option<String>,
    pub primary_key: String,
    pub columns: Vec<ColumnMeta>,
    #[serde(default)]
    pub associations: Vec<AssociationMeta>,
}

impl ModelSchema {
    /// New model with an integer `id` primary key and table name equal to `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        ModelSchema {
            table_name: name.clone(),
            name,
            schema: None,
            primary_key: "id".into(),
            columns: vec![ColumnMeta {
                name: "id".into(),
                type_: "INTEGER".into(),
                nullable: Some(false),
            }],
            associations: Vec::new(),
        }
    }

    pub fn table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn column(mut self, name: impl Into<String>, type_: impl Into<String>) -> Self {
        self.columns.push(ColumnMeta {
            name: name.into(),
            type_: type_.into(),
            nullable: None,
        });
        self
    }

    pub fn required_column(mut self, name: impl Into<String>, type_: impl Into<String>) -> Self {
        self.columns.push(ColumnMeta {
            name: name.into(),
            type_: type_.into(),
            nullable: Some(false),
        });
        self
    }

    pub fn belongs_to(self, name: impl Into<String>, target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        self.association(name, target, AssociationKind::BelongsTo, foreign_key)
    }

    pub fn has_one(self, name: impl Into<String>, target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        self.association(name, target, AssociationKind::HasOne, foreign_key)
    }

    pub fn has_many(self, name: impl Into<String>, target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        self.association(name, target, AssociationKind::HasMany, foreign_key)
    }

    fn association(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        kind: AssociationKind,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.associations.push(AssociationMeta {
            name: name.into(),
            target: target.into(),
            kind,
            foreign_key: foreign_key.into(),
        });
        self
    }

    pub fn column_meta(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_meta(name).is_some()
    }

    /// First association pointing at `target` (by model name).
    pub fn association_to(&self, target: &str) -> Option<&AssociationMeta> {
        self.associations.iter().find(|a| a.target == target)
    }
}

/// All known models, keyed by name. Built once at wiring time.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    models: HashMap<String, Arc<ModelSchema>>,
    order: Vec<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a model; returns the shared handle.
    pub fn insert(&mut self, model: ModelSchema) -> Arc<ModelSchema> {
        let name = model.name.clone();
        let model = Arc::new(model);
        if self.models.insert(name.clone(), model.clone()).is_none() {
            self.order.push(name);
        }
        model
    }

    pub fn get(&self, name: &str) -> Option<Arc<ModelSchema>> {
        self.models.get(name).cloned()
    }

    /// Models in insertion order.
    pub fn models(&self) -> impl Iterator<Item = &Arc<ModelSchema>> {
        self.order.iter().filter_map(|n| self.models.get(n))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl FromIterator<ModelSchema> for Catalog {
    fn from_iter<I: IntoIterator<Item = ModelSchema>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for model in iter {
            catalog.insert(model);
        }
        catalog
    }
}
