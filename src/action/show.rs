use super::factory::{factory_attributes, factory_include};
use super::{ActionKind, Requested, SelectAction};
use crate::entity::{Entity, Field};
use crate::error::ApiError;
use crate::hooks::{call_hooks, HookArgs, HookContext};
use crate::query::QueryOptions;
use crate::relationship::Relationship;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug)]
pub struct ShowAction {
    pub entity: Arc<Entity>,
    pub relationships: Vec<Requested<Relationship>>,
    pub selected_fields: Vec<Field>,
    pub id: Value,
}

impl ShowAction {
    pub fn new(entity: Arc<Entity>) -> Self {
        ShowAction {
            entity,
            relationships: Vec::new(),
            selected_fields: Vec::new(),
            id: Value::Null,
        }
    }

    pub fn build_context(&self) -> Result<QueryOptions, ApiError> {
        let context = factory_attributes(&self.selected_fields, QueryOptions::select());
        let context = factory_include(&self.relationships, context)?;
        let hooks = self.entity.find_hooks(ActionKind::Show.before_trigger(), None);
        call_hooks(&hooks, HookContext::Query(context), HookArgs::default()).into_query()
    }

    pub async fn run(self) -> Result<Value, ApiError> {
        let context = self.build_context()?;
        tracing::debug!(entity = %self.entity.name().plural, action = "show", id = %self.id, "running action");
        let row = self
            .entity
            .store()
            .find_by_key(self.entity.model(), &self.id, &context)
            .await?
            .ok_or_else(|| ApiError::record_not_found("Invalid id"))?;
        let hooks = self.entity.find_hooks(ActionKind::Show.after_trigger(), None);
        call_hooks(&hooks, HookContext::Row(row), HookArgs::default()).into_row()
    }
}

impl SelectAction for ShowAction {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Show
    }

    fn set_relationships(&mut self, relationships: Vec<Requested<Relationship>>) {
        self.relationships = relationships;
    }

    fn set_selected_fields(&mut self, fields: Vec<Field>) {
        self.selected_fields = fields;
    }
}
