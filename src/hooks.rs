//! Hook registry and matcher.
//!
//! A [`Hook`] is keyed by a [`HookTrigger`] and an optional name matcher. Hooks are
//! reducers: the handler receives the running [`HookContext`] and must return the
//! context to carry forward (the unchanged input when it has nothing to do).
//! Prevented hooks are never called but still show up in [`find_hooks`], which is how
//! a field is hidden from sorting, filtering or exposure.

use crate::error::ApiError;
use crate::query::QueryOptions;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookTrigger {
    IndexBefore,
    IndexAfter,
    ShowBefore,
    ShowAfter,
    CreateBefore,
    CreateAfter,
    UpdateBefore,
    UpdateAfter,
    DeleteBefore,
    DeleteAfter,
    Filter,
    Relationship,
    Sort,
    Page,
}

impl HookTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookTrigger::IndexBefore => "index-before",
            HookTrigger::IndexAfter => "index-after",
            HookTrigger::ShowBefore => "show-before",
            HookTrigger::ShowAfter => "show-after",
            HookTrigger::CreateBefore => "create-before",
            HookTrigger::CreateAfter => "create-after",
            HookTrigger::UpdateBefore => "update-before",
            HookTrigger::UpdateAfter => "update-after",
            HookTrigger::DeleteBefore => "delete-before",
            HookTrigger::DeleteAfter => "delete-after",
            HookTrigger::Filter => "filter",
            HookTrigger::Relationship => "relationship",
            HookTrigger::Sort => "sort",
            HookTrigger::Page => "page",
        }
    }
}

impl fmt::Display for HookTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name matcher of a hook.
#[derive(Clone, Debug, Default)]
pub enum HookMatch {
    /// No matcher: any name (or none) matches.
    #[default]
    Any,
    Exact(String),
    Pattern(Regex),
    /// A matcher of a shape that cannot be evaluated (only reachable from declarative config).
    Unmatchable,
}

impl HookMatch {
    pub fn matches(&self, name: Option<&str>) -> bool {
        match (self, name) {
            (HookMatch::Any, _) => true,
            (HookMatch::Exact(expected), Some(name)) => expected == name,
            (HookMatch::Pattern(re), Some(name)) => re.is_match(name),
            _ => false,
        }
    }

    /// The literal name when the matcher is an exact string.
    pub fn as_exact(&self) -> Option<&str> {
        match self {
            HookMatch::Exact(s) => Some(s),
            _ => None,
        }
    }
}

/// The value hooks fold over. Which variant a hook sees depends on its trigger:
/// `Query` for `*-before` on index/show/delete and for filter/sort/relationship/page,
/// `Payload` for create/update-before, `Rows` for index-after and `Row` for the other `*-after`.
#[derive(Clone, Debug, PartialEq)]
pub enum HookContext {
    Query(QueryOptions),
    Payload(Value),
    Rows(Vec<Value>),
    Row(Value),
}

impl HookContext {
    pub fn kind(&self) -> &'static str {
        match self {
            HookContext::Query(_) => "query",
            HookContext::Payload(_) => "payload",
            HookContext::Rows(_) => "rows",
            HookContext::Row(_) => "row",
        }
    }

    pub fn query_mut(&mut self) -> Option<&mut QueryOptions> {
        match self {
            HookContext::Query(q) => Some(q),
            _ => None,
        }
    }

    pub fn payload_mut(&mut self) -> Option<&mut Value> {
        match self {
            HookContext::Payload(v) => Some(v),
            _ => None,
        }
    }

    pub fn rows_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            HookContext::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn row_mut(&mut self) -> Option<&mut Value> {
        match self {
            HookContext::Row(row) => Some(row),
            _ => None,
        }
    }

    pub fn into_query(self) -> Result<QueryOptions, ApiError> {
        match self {
            HookContext::Query(q) => Ok(q),
            other => Err(mismatch("query", &other)),
        }
    }

    pub fn into_payload(self) -> Result<Value, ApiError> {
        match self {
            HookContext::Payload(v) => Ok(v),
            other => Err(mismatch("payload", &other)),
        }
    }

    pub fn into_rows(self) -> Result<Vec<Value>, ApiError> {
        match self {
            HookContext::Rows(rows) => Ok(rows),
            other => Err(mismatch("rows", &other)),
        }
    }

    pub fn into_row(self) -> Result<Value, ApiError> {
        match self {
            HookContext::Row(row) => Ok(row),
            other => Err(mismatch("row", &other)),
        }
    }
}

fn mismatch(expected: &str, got: &HookContext) -> ApiError {
    tracing::warn!(expected, got = got.kind(), "hook returned a mismatched context");
    ApiError::unknown(format!("hook returned a {} context where {} was expected", got.kind(), expected))
}

/// Extra parameters passed to a hook next to the context.
#[derive(Clone, Copy, Debug, Default)]
pub struct HookArgs<'a> {
    pub name: Option<&'a str>,
    pub value: Option<&'a Value>,
}

impl<'a> HookArgs<'a> {
    pub fn named(name: &'a str, value: Option<&'a Value>) -> Self {
        HookArgs {
            name: Some(name),
            value,
        }
    }
}

pub type HookFn = Arc<dyn Fn(HookContext, HookArgs<'_>) -> HookContext + Send + Sync>;

#[derive(Clone)]
pub struct Hook {
    trigger: HookTrigger,
    matcher: HookMatch,
    handler: Option<HookFn>,
    prevent: bool,
}

impl Hook {
    pub fn new(trigger: HookTrigger) -> Self {
        Hook {
            trigger,
            matcher: HookMatch::Any,
            handler: None,
            prevent: false,
        }
    }

    /// Match names exactly.
    pub fn matching(mut self, name: impl Into<String>) -> Self {
        self.matcher = HookMatch::Exact(name.into());
        self
    }

    /// Match names against a regex.
    pub fn matching_pattern(mut self, pattern: Regex) -> Self {
        self.matcher = HookMatch::Pattern(pattern);
        self
    }

    pub fn with_matcher(mut self, matcher: HookMatch) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn handler<F>(mut self, f: F) -> Self
    where
        F: Fn(HookContext, HookArgs<'_>) -> HookContext + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(f));
        self
    }

    pub fn prevented(mut self) -> Self {
        self.prevent = true;
        self
    }

    pub fn set_prevent(&mut self, prevent: bool) {
        self.prevent = prevent;
    }

    pub fn trigger(&self) -> HookTrigger {
        self.trigger
    }

    pub fn matcher(&self) -> &HookMatch {
        &self.matcher
    }

    pub fn is_prevented(&self) -> bool {
        self.prevent
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn matches(&self, trigger: HookTrigger, name: Option<&str>) -> bool {
        self.trigger == trigger && self.matcher.matches(name)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("trigger", &self.trigger)
            .field("matcher", &self.matcher)
            .field("handler", &self.handler.as_ref().map(|_| "<fn>"))
            .field("prevent", &self.prevent)
            .finish()
    }
}

/// Hooks matching `trigger` and `name`, in registration order.
pub fn find_hooks(hooks: &[Hook], trigger: HookTrigger, name: Option<&str>) -> Vec<Hook> {
    hooks.iter().filter(|h| h.matches(trigger, name)).cloned().collect()
}

/// Fold `context` through every non-prevented hook with a handler.
pub fn call_hooks(hooks: &[Hook], context: HookContext, args: HookArgs<'_>) -> HookContext {
    hooks.iter().fold(context, |context, hook| match &hook.handler {
        Some(handler) if !hook.prevent => handler(context, args),
        _ => context,
    })
}

/// Hooks registered on the API root; they run before entity-scoped hooks.
#[derive(Clone, Debug, Default)]
pub struct HookRegistry {
    hooks: Vec<Hook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: Hook) {
        self.hooks.push(hook);
    }

    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    pub fn find(&self, trigger: HookTrigger, name: Option<&str>) -> Vec<Hook> {
        find_hooks(&self.hooks, trigger, name)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl FromIterator<Hook> for HookRegistry {
    fn from_iter<I: IntoIterator<Item = Hook>>(iter: I) -> Self {
        HookRegistry {
            hooks: iter.into_iter().collect(),
        }
    }
}

/// Deferred hook invocation standing in for a sort, filter, relationship or page entry.
#[derive(Clone, Debug)]
pub struct HookRequest {
    pub name: String,
    pub value: Option<Value>,
    pub hooks: Vec<Hook>,
}

impl HookRequest {
    pub fn new(name: impl Into<String>, value: Option<Value>, hooks: Vec<Hook>) -> Self {
        HookRequest {
            name: name.into(),
            value,
            hooks,
        }
    }

    /// Run the hooks against a query context with `{ name, value }`.
    pub fn apply(&self, context: QueryOptions) -> Result<QueryOptions, ApiError> {
        let args = HookArgs::named(&self.name, self.value.as_ref());
        call_hooks(&self.hooks, HookContext::Query(context), args).into_query()
    }
}
