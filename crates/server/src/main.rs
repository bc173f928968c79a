mod error;
mod routes;
mod state;

use std::net::SocketAddr;

use db::DBService;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    utils::logging::init("info,sqlx=warn,tower_http=debug");

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:verdant.db".to_string());
    let usage_log_path =
        std::env::var("USAGE_LOG_PATH").unwrap_or_else(|_| "usage-log.jsonl".to_string());
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3001".to_string())
        .parse()?;

    let db = DBService::new(&database_url).await?;
    let state = AppState::new(db, usage_log_path);

    let app = routes::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
