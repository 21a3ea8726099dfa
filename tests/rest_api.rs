mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common::{catalog, memory_store};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shark_api::{api_routes, ActionKind, ApiBuilder, AppState, EntityOptions, Hook, HookTrigger, OrderBy};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let catalog = catalog();
    let store = Arc::new(memory_store(&catalog));
    let newest_first = Hook::new(HookTrigger::Sort).matching("newest").handler(|mut ctx, _| {
        if let Some(q) = ctx.query_mut() {
            q.order.push(OrderBy::new("createdAt", shark_api::SortCriteria::Desc));
        }
        ctx
    });
    let api = ApiBuilder::new(catalog, store)
        .entity("Person", EntityOptions::new().actions([ActionKind::Index, ActionKind::Show]))
        .entity("Car", EntityOptions::new().hook(newest_first))
        .build()
        .unwrap();
    api_routes(AppState::new(Arc::new(api)), 16 * 1024)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health() {
    let (status, body) = send(app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn index_with_sort_filter_page_and_include() {
    let uri = "/cars?sort=-price&filter%5BPersonId%5D=1&page%5Blimit%5D=1&include=person";
    let (status, body) = send(app(), Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], json!(2));
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], json!("Golf"));
    assert_eq!(data[0]["Person"]["name"], json!("Ana"));
}

#[tokio::test]
async fn index_with_hooked_sort() {
    let (status, body) = send(app(), Method::GET, "/cars?sort=newest", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body["data"].as_array().unwrap().iter().map(|r| r["name"].clone()).collect();
    assert_eq!(names, vec![json!("Beetle"), json!("Polo"), json!("Golf")]);
}

#[tokio::test]
async fn invalid_query_fragments_are_rejected() {
    let (status, body) = send(app(), Method::GET, "/cars?sort=color", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "type": "invalid-sort", "message": "property 'color' isn't sortable!" }));

    let (_, body) = send(app(), Method::GET, "/cars?page%5Bsize%5D=3", None).await;
    assert_eq!(body["type"], json!("invalid-pagination"));

    let (_, body) = send(app(), Method::GET, "/cars?include=wheels", None).await;
    assert_eq!(body["type"], json!("invalid-relationship"));
}

#[tokio::test]
async fn show_and_missing_rows() {
    let (status, body) = send(app(), Method::GET, "/cars/1?include=tyres", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Tyres"].as_array().map(Vec::len), Some(2));

    let (status, body) = send(app(), Method::GET, "/cars/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["type"], json!("record-not-found"));

    let (status, _) = send(app(), Method::GET, "/cars/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_update_delete() {
    let app = app();
    let (status, created) = send(
        app.clone(),
        Method::POST,
        "/cars",
        Some(json!({ "name": "Up", "price": 500.0, "PersonId": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], json!(4));

    let (status, updated) = send(app.clone(), Method::PATCH, "/cars/4", Some(json!({ "price": 750.0 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], json!(750.0));
    assert_eq!(updated["name"], json!("Up"));

    let (status, deleted) = send(app.clone(), Method::DELETE, "/cars/4", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["name"], json!("Up"));

    let (status, _) = send(app, Method::GET, "/cars/4", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn disabled_actions_are_not_found() {
    let (status, _) = send(app(), Method::DELETE, "/people/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(app(), Method::GET, "/boats", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(app(), Method::GET, "/people", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], json!(2));
}

#[tokio::test]
async fn entities_listing() {
    let (status, body) = send(app(), Method::GET, "/entities", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], json!({ "plural": "people", "singular": "person" }));
    assert_eq!(body[1]["type"], json!("Car"));
    assert_eq!(body[0]["actions"], json!(["index", "show"]));
    assert!(body[1]["sortKeys"].as_array().unwrap().contains(&json!("newest")));
}
