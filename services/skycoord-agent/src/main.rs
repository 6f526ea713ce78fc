use axum::{
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use skycoord_core::{logging, Config};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{info, warn};

mod handlers;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::var("SKYCOORD_CONFIG") {
        Ok(path) => Config::from_file(&path)?,
        Err(_) => Config::default_config(),
    };

    if config.service.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    let state = Arc::new(AppState::load(config.clone())?);
    for row_error in &state.load_warnings {
        warn!(%row_error, "roster row skipped at load");
    }

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/request", post(handlers::handle_request))
        .route("/snapshot", get(handlers::snapshot))
        .with_state(state)
        .layer(ServiceBuilder::new().into_inner());

    let bind_addr = format!("0.0.0.0:{}", config.service.listen_port);
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("SkyCoord agent listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "skycoord-agent",
        "timestamp": Utc::now().to_rfc3339()
    })))
}
