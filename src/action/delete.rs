use super::ActionKind;
use crate::entity::Entity;
use crate::error::ApiError;
use crate::hooks::{call_hooks, HookArgs, HookContext};
use crate::query::QueryOptions;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug)]
pub struct DeleteAction {
    pub entity: Arc<Entity>,
    pub id: Value,
}

impl DeleteAction {
    pub fn new(entity: Arc<Entity>) -> Self {
        DeleteAction { entity, id: Value::Null }
    }

    /// Empty destroy options after `delete-before` hooks.
    pub fn build_context(&self) -> Result<QueryOptions, ApiError> {
        let hooks = self.entity.find_hooks(ActionKind::Delete.before_trigger(), None);
        call_hooks(&hooks, HookContext::Query(QueryOptions::default()), HookArgs::default()).into_query()
    }

    /// Returns the row as it was before it was destroyed.
    pub async fn run(self) -> Result<Value, ApiError> {
        let context = self.build_context()?;
        tracing::debug!(entity = %self.entity.name().plural, action = "delete", id = %self.id, "running action");
        let store = self.entity.store();
        let model = self.entity.model();
        let row = store
            .find_by_key(model, &self.id, &QueryOptions::default())
            .await?
            .ok_or_else(|| ApiError::record_not_found("Invalid id"))?;
        store.destroy(model, &self.id, &context).await?;
        let hooks = self.entity.find_hooks(ActionKind::Delete.after_trigger(), None);
        call_hooks(&hooks, HookContext::Row(row), HookArgs::default()).into_row()
    }
}
