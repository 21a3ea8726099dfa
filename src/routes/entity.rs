//! Entity routes. Paths are parameterized; handlers resolve the entity by its plural name.

use crate::handlers::entity::{create, delete as delete_handler, list, read, update};
use crate::routes::common_routes;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

/// Request body limit applied by [`api_routes`].
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/:path_segment", get(list).post(create))
        .route(
            "/:path_segment/:id",
            get(read).patch(update).put(update).delete(delete_handler),
        )
        .with_state(state)
}

/// Common routes merged with the entity routes, body size limited.
pub fn api_routes(state: AppState, body_limit: usize) -> Router {
    common_routes(state.clone())
        .merge(entity_routes(state))
        .layer(RequestBodyLimitLayer::new(body_limit))
}
