//! Raw config types matching the JSON files (models.json, entities.json, hooks.json).

use crate::action::ActionKind;
use crate::entity::EntityName;
use crate::hooks::HookTrigger;
use crate::schema::{AssociationMeta, ColumnMeta};
use serde::{Deserialize, Serialize};

fn default_primary_key() -> String {
    "id".into()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    /// Defaults to `name`.
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    pub columns: Vec<ColumnMeta>,
    #[serde(default)]
    pub associations: Vec<AssociationMeta>,
}

/// `match` of a declarative hook: a plain string matches exactly, `{ "pattern": "..." }` is a regex.
/// Anything else is kept and never matches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchConfig {
    Exact(String),
    Pattern { pattern: String },
    Other(serde_json::Value),
}

/// Declarative hooks carry no callback; they exist to suppress (`prevent`) names.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HookConfig {
    pub trigger: HookTrigger,
    #[serde(rename = "match", default)]
    pub match_: Option<MatchConfig>,
    #[serde(default)]
    pub prevent: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityConfig {
    pub model: String,
    #[serde(default)]
    pub name: Option<EntityName>,
    #[serde(default)]
    pub actions: Option<Vec<ActionKind>>,
    #[serde(default)]
    pub hooks: Vec<HookConfig>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FullConfig {
    pub models: Vec<ModelConfig>,
    /// `None` exposes every model with default options.
    #[serde(default)]
    pub entities: Option<Vec<EntityConfig>>,
    /// Global hooks.
    #[serde(default)]
    pub hooks: Vec<HookConfig>,
}
