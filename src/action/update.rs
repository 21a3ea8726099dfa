use super::ActionKind;
use crate::entity::Entity;
use crate::error::ApiError;
use crate::hooks::{call_hooks, HookArgs, HookContext};
use crate::query::QueryOptions;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug)]
pub struct UpdateAction {
    pub entity: Arc<Entity>,
    pub data: Value,
    pub id: Value,
}

impl UpdateAction {
    pub fn new(entity: Arc<Entity>) -> Self {
        UpdateAction {
            entity,
            data: Value::Object(Default::default()),
            id: Value::Null,
        }
    }

    /// The payload after `update-before` hooks.
    pub fn build_context(&self) -> Result<Value, ApiError> {
        let hooks = self.entity.find_hooks(ActionKind::Update.before_trigger(), None);
        call_hooks(&hooks, HookContext::Payload(self.data.clone()), HookArgs::default()).into_payload()
    }

    /// Fetch, then build, then merge the payload's keys into the fetched row and save it.
    pub async fn run(self) -> Result<Value, ApiError> {
        tracing::debug!(entity = %self.entity.name().plural, action = "update", id = %self.id, "running action");
        let store = self.entity.store();
        let model = self.entity.model();
        let mut row = store
            .find_by_key(model, &self.id, &QueryOptions::default())
            .await?
            .ok_or_else(|| ApiError::record_not_found("Invalid id"))?;
        let context = self.build_context()?;
        if let (Value::Object(row), Value::Object(changes)) = (&mut row, context) {
            for (key, value) in changes {
                if key != model.primary_key {
                    row.insert(key, value);
                }
            }
        }
        let row = store.save(model, &self.id, row).await?;
        let hooks = self.entity.find_hooks(ActionKind::Update.after_trigger(), None);
        call_hooks(&hooks, HookContext::Row(row), HookArgs::default()).into_row()
    }
}
