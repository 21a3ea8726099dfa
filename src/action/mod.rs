//! Request-scoped actions. Each action is built by an [`Entity`](crate::entity::Entity) factory,
//! filled by a parser, then consumed by `run`.

mod create;
mod delete;
pub mod factory;
mod index;
mod show;
mod update;

pub use create::CreateAction;
pub use delete::DeleteAction;
pub use index::IndexAction;
pub use show::ShowAction;
pub use update::UpdateAction;

use crate::entity::{Entity, Field};
use crate::hooks::{HookRequest, HookTrigger};
use crate::query::SortCriteria;
use crate::relationship::Relationship;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Index,
    Show,
    Create,
    Update,
    Delete,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Index,
        ActionKind::Show,
        ActionKind::Create,
        ActionKind::Update,
        ActionKind::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Index => "index",
            ActionKind::Show => "show",
            ActionKind::Create => "create",
            ActionKind::Update => "update",
            ActionKind::Delete => "delete",
        }
    }

    pub fn before_trigger(&self) -> HookTrigger {
        match self {
            ActionKind::Index => HookTrigger::IndexBefore,
            ActionKind::Show => HookTrigger::ShowBefore,
            ActionKind::Create => HookTrigger::CreateBefore,
            ActionKind::Update => HookTrigger::UpdateBefore,
            ActionKind::Delete => HookTrigger::DeleteBefore,
        }
    }

    pub fn after_trigger(&self) -> HookTrigger {
        match self {
            ActionKind::Index => HookTrigger::IndexAfter,
            ActionKind::Show => HookTrigger::ShowAfter,
            ActionKind::Create => HookTrigger::CreateAfter,
            ActionKind::Update => HookTrigger::UpdateAfter,
            ActionKind::Delete => HookTrigger::DeleteAfter,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub name: String,
    pub value: Value,
}

impl Filter {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Filter {
            name: name.into(),
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    pub name: String,
    pub criteria: SortCriteria,
}

impl Sort {
    pub fn new(name: impl Into<String>, criteria: SortCriteria) -> Self {
        Sort {
            name: name.into(),
            criteria,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// A request fragment: either the plain value or a hook invocation that replaces it.
#[derive(Clone, Debug)]
pub enum Requested<T> {
    Plain(T),
    Hooked(HookRequest),
}

impl<T> Requested<T> {
    pub fn as_plain(&self) -> Option<&T> {
        match self {
            Requested::Plain(t) => Some(t),
            Requested::Hooked(_) => None,
        }
    }

    pub fn as_hooked(&self) -> Option<&HookRequest> {
        match self {
            Requested::Plain(_) => None,
            Requested::Hooked(h) => Some(h),
        }
    }
}

impl<T> From<HookRequest> for Requested<T> {
    fn from(request: HookRequest) -> Self {
        Requested::Hooked(request)
    }
}

/// Index result: `{ "totalCount": ..., "data": [...] }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResult {
    pub total_count: u64,
    pub data: Vec<Value>,
}

/// Actions that read rows and accept relationship includes and field selection (index and show).
pub trait SelectAction {
    fn entity(&self) -> &Entity;
    fn kind(&self) -> ActionKind;
    fn set_relationships(&mut self, relationships: Vec<Requested<Relationship>>);
    fn set_selected_fields(&mut self, fields: Vec<Field>);
}
