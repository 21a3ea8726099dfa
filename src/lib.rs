//! shark-api: declarative API generation over a model catalog, with a hook registry that lets
//! callers rewrite queries, payloads and results at named points of every action.

pub mod action;
pub mod api;
pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod hooks;
pub mod inflect;
pub mod parse;
pub mod query;
pub mod relationship;
pub mod routes;
pub mod schema;
pub mod sql;
pub mod state;
pub mod store;

pub use action::{ActionKind, Filter, IndexResult, Page, Requested, Sort};
pub use api::{Api, ApiBuilder};
pub use config::{load_from_dir, resolve, validate, FullConfig, ResolvedConfig, Settings};
pub use entity::{Entity, EntityName, EntityOptions, Field, FieldType};
pub use error::{ApiError, ConfigError, ErrorKind};
pub use hooks::{Hook, HookArgs, HookContext, HookMatch, HookRegistry, HookRequest, HookTrigger};
pub use query::{Include, OrderBy, QueryOptions, SortCriteria};
pub use relationship::{Relationship, RelationshipType};
pub use routes::{api_routes, common_routes, entity_routes, DEFAULT_BODY_LIMIT};
pub use schema::{AssociationKind, Catalog, ModelSchema};
pub use state::AppState;
pub use store::{MemoryStore, PgStore, Store};
