//! Common routes: health, version, entity listing.

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn entities(State(state): State<AppState>) -> Json<serde_json::Value> {
    let list: Vec<_> = state
        .api
        .entities()
        .iter()
        .map(|e| {
            serde_json::json!({
                "name": e.name(),
                "type": e.type_name(),
                "actions": e.actions(),
                "fields": e.fields(),
                "sortKeys": e.sort_keys(),
                "filterKeys": e.filter_keys(),
            })
        })
        .collect();
    Json(serde_json::Value::Array(list))
}

/// GET /health, GET /version, GET /entities.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/entities", get(entities))
        .with_state(state)
}
