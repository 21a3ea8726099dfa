//! Example consumer: an in-memory API with code-defined hooks.
//!
//! Run from repo root: `cargo run -p example-consumer`, then try
//! `curl 'localhost:3000/cars?filter%5Bmodel%5D=Golf&sort=-price&include=person'`.

use serde_json::{json, Value};
use shark_api::{
    api_routes, ActionKind, ApiBuilder, AppState, Catalog, EntityOptions, Hook, HookContext, HookTrigger,
    MemoryStore, ModelSchema, Settings, DEFAULT_BODY_LIMIT,
};
use std::sync::Arc;
use tokio::net::TcpListener;

fn catalog() -> Catalog {
    [
        ModelSchema::new("Person")
            .table("People")
            .required_column("name", "STRING")
            .has_many("Cars", "Car", "PersonId"),
        ModelSchema::new("Car")
            .table("Cars")
            .required_column("name", "STRING")
            .column("price", "DECIMAL")
            .column("PersonId", "INTEGER")
            .belongs_to("Person", "Person", "PersonId"),
    ]
    .into_iter()
    .collect()
}

/// `filter[model]=x` is an alias for the `name` column; index results carry a display label.
fn car_hooks() -> Vec<Hook> {
    vec![
        Hook::new(HookTrigger::Filter).matching("model").handler(|mut ctx, args| {
            if let (Some(q), Some(value)) = (ctx.query_mut(), args.value) {
                q.where_.insert("name".into(), value.clone());
            }
            ctx
        }),
        Hook::new(HookTrigger::IndexAfter).handler(|mut ctx, _| {
            if let Some(rows) = ctx.rows_mut() {
                for row in rows.iter_mut() {
                    let label = format!("{} ({})", row["name"].as_str().unwrap_or("?"), row["price"]);
                    if let Some(obj) = row.as_object_mut() {
                        obj.insert("label".into(), Value::String(label));
                    }
                }
            }
            ctx
        }),
    ]
}

/// Stamp every created car with a default price.
fn default_price() -> Hook {
    Hook::new(HookTrigger::CreateBefore).handler(|ctx, _| match ctx {
        HookContext::Payload(mut payload) => {
            if let Some(obj) = payload.as_object_mut() {
                obj.entry("price").or_insert(json!(0));
            }
            HookContext::Payload(payload)
        }
        other => other,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("shark_api=debug")),
        )
        .init();

    let catalog = Arc::new(catalog());
    let store = Arc::new(MemoryStore::new(catalog.clone()));
    store.seed("Person", vec![json!({ "id": 1, "name": "Ana" })]);
    store.seed(
        "Car",
        vec![
            json!({ "id": 1, "name": "Golf", "price": 3000, "PersonId": 1 }),
            json!({ "id": 2, "name": "Polo", "price": 2000, "PersonId": 1 }),
        ],
    );

    let mut cars = EntityOptions::new().hook(default_price());
    for hook in car_hooks() {
        cars = cars.hook(hook);
    }
    let api = ApiBuilder::new(catalog, store)
        .entity("Person", EntityOptions::new().actions([ActionKind::Index, ActionKind::Show]))
        .entity("Car", cars)
        .build()?;

    let settings = Settings::from_env();
    let app = api_routes(AppState::new(Arc::new(api)), DEFAULT_BODY_LIMIT);
    let listener = TcpListener::bind(settings.socket_addr()?).await?;
    tracing::info!("Example consumer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
