use super::factory::{factory_attributes, factory_include, factory_order, factory_page, factory_where};
use super::{ActionKind, Filter, IndexResult, Page, Requested, SelectAction, Sort};
use crate::entity::{Entity, Field};
use crate::error::ApiError;
use crate::hooks::{call_hooks, HookArgs, HookContext, HookRequest};
use crate::query::QueryOptions;
use crate::relationship::Relationship;
use std::sync::Arc;

/// List rows with sorting, filtering, pagination and includes.
#[derive(Debug)]
pub struct IndexAction {
    pub entity: Arc<Entity>,
    pub sort: Vec<Requested<Sort>>,
    pub filters: Vec<Requested<Filter>>,
    pub relationships: Vec<Requested<Relationship>>,
    pub page: Page,
    pub page_hooks: Vec<HookRequest>,
    pub selected_fields: Vec<Field>,
}

impl IndexAction {
    pub fn new(entity: Arc<Entity>) -> Self {
        IndexAction {
            entity,
            sort: Vec::new(),
            filters: Vec::new(),
            relationships: Vec::new(),
            page: Page::default(),
            page_hooks: Vec::new(),
            selected_fields: Vec::new(),
        }
    }

    pub fn build_context(&self) -> Result<QueryOptions, ApiError> {
        let context = QueryOptions::select();
        let context = factory_attributes(&self.selected_fields, context);
        let context = factory_include(&self.relationships, context)?;
        let context = factory_where(&self.filters, context)?;
        let context = factory_order(&self.sort, context)?;
        let context = factory_page(&self.page, &self.page_hooks, context)?;
        let hooks = self.entity.find_hooks(ActionKind::Index.before_trigger(), None);
        call_hooks(&hooks, HookContext::Query(context), HookArgs::default()).into_query()
    }

    pub async fn run(self) -> Result<IndexResult, ApiError> {
        let context = self.build_context()?;
        let model = self.entity.model();
        tracing::debug!(entity = %self.entity.name().plural, action = "index", "running action");
        let store = self.entity.store();
        let total_count = store.count(model, &context).await?;
        let rows = store.find_all(model, &context).await?;
        let hooks = self.entity.find_hooks(ActionKind::Index.after_trigger(), None);
        let data = call_hooks(&hooks, HookContext::Rows(rows), HookArgs::default()).into_rows()?;
        Ok(IndexResult { total_count, data })
    }
}

impl SelectAction for IndexAction {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Index
    }

    fn set_relationships(&mut self, relationships: Vec<Requested<Relationship>>) {
        self.relationships = relationships;
    }

    fn set_selected_fields(&mut self, fields: Vec<Field>) {
        self.selected_fields = fields;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::test_support;
    use crate::entity::EntityOptions;
    use crate::hooks::{Hook, HookRegistry, HookTrigger};
    use crate::query::SortCriteria;
    use serde_json::json;

    #[tokio::test]
    async fn runs_with_sort_filter_and_page() {
        let (cars, _) = test_support::entity("Car", EntityOptions::new(), HookRegistry::new());
        let mut action = cars.new_index_action();
        action.filters.push(Requested::Plain(Filter::new("PersonId", json!(1))));
        action.sort.push(Requested::Plain(Sort::new("price", SortCriteria::Desc)));
        action.page = Page {
            limit: Some(1),
            offset: None,
        };
        let result = action.run().await.unwrap();
        assert_eq!(result.total_count, 2);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0]["name"], "Golf");
    }

    #[tokio::test]
    async fn index_after_sees_rows() {
        let hook = Hook::new(HookTrigger::IndexAfter).handler(|mut ctx, _| {
            if let Some(rows) = ctx.rows_mut() {
                rows.retain(|r| r["name"] != "Polo");
            }
            ctx
        });
        let (cars, _) = test_support::entity("Car", EntityOptions::new().hook(hook), HookRegistry::new());
        let result = cars.new_index_action().run().await.unwrap();
        assert_eq!(result.total_count, 3);
        assert_eq!(result.data.len(), 2);
    }

    #[test]
    fn stages_run_before_index_before() {
        let hook = Hook::new(HookTrigger::IndexBefore).handler(|mut ctx, _| {
            if let Some(q) = ctx.query_mut() {
                assert_eq!(q.limit, Some(5));
                q.assign("paranoid", json!(false));
            }
            ctx
        });
        let (cars, _) = test_support::entity("Car", EntityOptions::new().hook(hook), HookRegistry::new());
        let mut action = cars.new_index_action();
        action.page.limit = Some(5);
        let ctx = action.build_context().unwrap();
        assert_eq!(ctx.sub_query, Some(false));
        assert_eq!(ctx.extra("paranoid"), Some(&json!(false)));
        assert!(ctx.include.is_empty());
        assert!(ctx.where_.is_empty());
    }
}
