//! Entity descriptor: the API-facing view of one backend model.

use crate::action::{ActionKind, CreateAction, DeleteAction, IndexAction, ShowAction, UpdateAction};
use crate::error::ApiError;
use crate::hooks::{self, Hook, HookRegistry, HookTrigger};
use crate::inflect;
use crate::relationship::{self, Relationship};
use crate::schema::{Catalog, ModelSchema};
use crate::store::Store;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    Date,
    Time,
}

impl FieldType {
    /// Map a backend column type name. Matching ignores case and any `(...)` parameters,
    /// so "VARCHAR(255)" and "numeric(10,2)" resolve. Unknown names give `None`.
    pub fn from_column_type(type_name: &str) -> Option<Self> {
        let base = type_name.split('(').next().unwrap_or_default().trim().to_lowercase();
        let t = match base.as_str() {
            "bigint" | "integer" | "int" | "int2" | "int4" | "int8" | "smallint" | "serial" | "bigserial" => {
                FieldType::Integer
            }
            "boolean" | "bool" => FieldType::Boolean,
            "char" | "character" | "varchar" | "character varying" | "string" | "text" | "citext" | "uuid" => {
                FieldType::String
            }
            "timestamp" | "timestamptz" | "timestamp with time zone" | "timestamp without time zone" | "datetime" => {
                FieldType::Datetime
            }
            "date" | "dateonly" => FieldType::Date,
            "time" | "timetz" | "time with time zone" | "time without time zone" => FieldType::Time,
            "decimal" | "numeric" | "double" | "double precision" | "float" | "float4" | "float8" | "number"
            | "real" => FieldType::Float,
            _ => return None,
        };
        Some(t)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Datetime => "datetime",
            FieldType::Date => "date",
            FieldType::Time => "time",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,
    pub nullable: bool,
    pub primary_key: bool,
}

impl Field {
    /// Bare field reference used for projections.
    pub fn named(name: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            field_type: None,
            nullable: true,
            primary_key: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityName {
    pub plural: String,
    pub singular: String,
}

impl EntityName {
    pub fn new(plural: impl Into<String>, singular: impl Into<String>) -> Self {
        EntityName {
            plural: plural.into(),
            singular: singular.into(),
        }
    }

    /// Derived from a table name through the pluralization rules.
    pub fn from_table(table_name: &str) -> Self {
        EntityName {
            plural: inflect::pluralize(table_name),
            singular: inflect::singularize(table_name),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EntityOptions {
    pub name: Option<EntityName>,
    pub hooks: Vec<Hook>,
    /// Enabled actions; `None` enables all five.
    pub actions: Option<Vec<ActionKind>>,
}

impl EntityOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: EntityName) -> Self {
        self.name = Some(name);
        self
    }

    pub fn hook(mut self, hook: Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn actions(mut self, actions: impl IntoIterator<Item = ActionKind>) -> Self {
        self.actions = Some(actions.into_iter().collect());
        self
    }
}

/// Built once when the API is wired and shared read-only across requests.
pub struct Entity {
    name: EntityName,
    fields: Vec<Field>,
    options: EntityOptions,
    model: Arc<ModelSchema>,
    catalog: Arc<Catalog>,
    store: Arc<dyn Store>,
    global_hooks: Arc<HookRegistry>,
}

impl Entity {
    pub fn new(
        model: Arc<ModelSchema>,
        catalog: Arc<Catalog>,
        store: Arc<dyn Store>,
        global_hooks: Arc<HookRegistry>,
        options: EntityOptions,
    ) -> Self {
        let name = options
            .name
            .clone()
            .unwrap_or_else(|| EntityName::from_table(&model.table_name));
        let fields = model
            .columns
            .iter()
            .map(|c| Field {
                name: c.name.clone(),
                field_type: FieldType::from_column_type(&c.type_),
                nullable: c.nullable.unwrap_or(true),
                primary_key: c.name == model.primary_key,
            })
            .collect();
        Entity {
            name,
            fields,
            options,
            model,
            catalog,
            store,
            global_hooks,
        }
    }

    pub fn name(&self) -> &EntityName {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_key(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.primary_key)
    }

    pub fn options(&self) -> &EntityOptions {
        &self.options
    }

    pub fn model(&self) -> &Arc<ModelSchema> {
        &self.model
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// PascalCase singular name, as a GraphQL adapter would name the object type.
    pub fn type_name(&self) -> String {
        inflect::to_pascal_case(&self.name.singular)
    }

    pub fn is_sortable(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn is_filterable(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn actions(&self) -> Vec<ActionKind> {
        self.options
            .actions
            .clone()
            .unwrap_or_else(|| ActionKind::ALL.to_vec())
    }

    pub fn allows(&self, kind: ActionKind) -> bool {
        match &self.options.actions {
            Some(actions) => actions.contains(&kind),
            None => true,
        }
    }

    /// One level of the association graph, sources resolved.
    pub fn get_relationships(&self) -> Vec<Relationship> {
        self.model
            .associations
            .iter()
            .filter_map(|a| {
                let target = self.catalog.get(&a.target)?;
                let mut relationship = Relationship::named(&a.name).with_source(target);
                relationship.relationship_type = Some(a.kind.into());
                Some(relationship)
            })
            .collect()
    }

    /// Resolve a relationship request tree starting at `source`, or at this entity's model.
    pub fn find_relationship_sources(
        &self,
        relationships: &mut [Relationship],
        source: Option<&Arc<ModelSchema>>,
    ) -> Result<(), ApiError> {
        let source = source.unwrap_or(&self.model);
        relationship::resolve_sources(&self.catalog, relationships, source)
    }

    /// Global hooks first, then the entity's own.
    pub fn get_hooks(&self) -> Vec<Hook> {
        self.global_hooks
            .hooks()
            .iter()
            .chain(self.options.hooks.iter())
            .cloned()
            .collect()
    }

    pub fn find_hooks(&self, trigger: HookTrigger, name: Option<&str>) -> Vec<Hook> {
        hooks::find_hooks(&self.get_hooks(), trigger, name)
    }

    fn is_prevented(&self, trigger: HookTrigger, name: &str) -> bool {
        self.find_hooks(trigger, Some(name)).iter().any(Hook::is_prevented)
    }

    /// Names a client may sort by: fields plus exact-named sort hooks, minus prevented ones.
    pub fn sort_keys(&self) -> Vec<String> {
        self.exposed_keys(HookTrigger::Sort)
    }

    /// Names a client may filter by, computed like [`Entity::sort_keys`].
    pub fn filter_keys(&self) -> Vec<String> {
        self.exposed_keys(HookTrigger::Filter)
    }

    fn exposed_keys(&self, trigger: HookTrigger) -> Vec<String> {
        let mut keys: Vec<String> = self
            .fields
            .iter()
            .filter(|f| !self.is_prevented(trigger, &f.name))
            .map(|f| f.name.clone())
            .collect();
        for hook in self.get_hooks() {
            if hook.trigger() != trigger || hook.is_prevented() {
                continue;
            }
            if let Some(name) = hook.matcher().as_exact() {
                if !keys.iter().any(|k| k == name) {
                    keys.push(name.to_string());
                }
            }
        }
        keys
    }

    /// Relationships not hidden by a prevented `relationship` hook on their lowercased name.
    pub fn exposed_relationships(&self) -> Vec<Relationship> {
        self.get_relationships()
            .into_iter()
            .filter(|r| !self.is_prevented(HookTrigger::Relationship, &r.name.to_lowercase()))
            .collect()
    }

    pub fn new_index_action(self: &Arc<Self>) -> IndexAction {
        IndexAction::new(self.clone())
    }

    pub fn new_show_action(self: &Arc<Self>) -> ShowAction {
        ShowAction::new(self.clone())
    }

    pub fn new_create_action(self: &Arc<Self>) -> CreateAction {
        CreateAction::new(self.clone())
    }

    pub fn new_update_action(self: &Arc<Self>) -> UpdateAction {
        UpdateAction::new(self.clone())
    }

    pub fn new_delete_action(self: &Arc<Self>) -> DeleteAction {
        DeleteAction::new(self.clone())
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("model", &self.model.name)
            .field("fields", &self.fields)
            .field("hooks", &self.options.hooks.len())
            .finish()
    }
}
