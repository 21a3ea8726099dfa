use super::ActionKind;
use crate::entity::Entity;
use crate::error::ApiError;
use crate::hooks::{call_hooks, HookArgs, HookContext};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug)]
pub struct CreateAction {
    pub entity: Arc<Entity>,
    pub data: Value,
}

impl CreateAction {
    pub fn new(entity: Arc<Entity>) -> Self {
        CreateAction {
            entity,
            data: Value::Object(Default::default()),
        }
    }

    /// The payload after `create-before` hooks.
    pub fn build_context(&self) -> Result<Value, ApiError> {
        let hooks = self.entity.find_hooks(ActionKind::Create.before_trigger(), None);
        call_hooks(&hooks, HookContext::Payload(self.data.clone()), HookArgs::default()).into_payload()
    }

    pub async fn run(self) -> Result<Value, ApiError> {
        let payload = self.build_context()?;
        tracing::debug!(entity = %self.entity.name().plural, action = "create", "running action");
        let row = self.entity.store().create(self.entity.model(), payload).await?;
        let hooks = self.entity.find_hooks(ActionKind::Create.after_trigger(), None);
        call_hooks(&hooks, HookContext::Row(row), HookArgs::default()).into_row()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::test_support;
    use crate::entity::EntityOptions;
    use crate::hooks::{Hook, HookRegistry, HookTrigger};
    use serde_json::json;

    #[tokio::test]
    async fn before_hook_rewrites_payload() {
        let hook = Hook::new(HookTrigger::CreateBefore).handler(|mut ctx, _| {
            if let Some(payload) = ctx.payload_mut() {
                payload["price"] = json!(0);
            }
            ctx
        });
        let (cars, store) = test_support::entity("Car", EntityOptions::new().hook(hook), HookRegistry::new());
        let mut action = cars.new_create_action();
        action.data = json!({ "name": "Up", "price": 5000 });
        let row = action.run().await.unwrap();
        assert_eq!(row["id"], 4);
        assert_eq!(row["price"], 0);
        assert_eq!(store.rows("Car").len(), 4);
    }

    #[tokio::test]
    async fn mismatched_hook_result_fails() {
        let hook = Hook::new(HookTrigger::CreateAfter).handler(|_, _| HookContext::Rows(vec![]));
        let (cars, _) = test_support::entity("Car", EntityOptions::new().hook(hook), HookRegistry::new());
        let mut action = cars.new_create_action();
        action.data = json!({ "name": "Up" });
        let err = action.run().await.unwrap_err();
        assert_eq!(err.kind(), Some(crate::error::ErrorKind::Unknown));
    }
}
