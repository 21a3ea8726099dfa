//! Example server: loads models.json / entities.json / hooks.json from CONFIG_PATH, wires the API over
//! PostgreSQL and serves the generated routes.

use shark_api::{api_routes, load_from_dir, resolve, ApiBuilder, AppState, PgStore, Settings, DEFAULT_BODY_LIMIT};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("shark_api=info".parse()?))
        .init();

    let settings = Settings::from_env();
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;

    let config = load_from_dir(&settings.config_path).await?;
    let resolved = resolve(&config)?;
    let api = ApiBuilder::from_config(resolved, Arc::new(PgStore::new(pool))).build()?;
    let state = AppState::new(Arc::new(api));

    let app = axum::Router::new().nest("/api/v1", api_routes(state, DEFAULT_BODY_LIMIT));

    let listener = TcpListener::bind(settings.socket_addr()?).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
