use crate::config::AppConfig;
use crate::db::DbPool;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

pub mod auth;
pub mod error;
pub mod incidents;

use auth::Credentials;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub credentials: Arc<Credentials>,
}

impl AppState {
    pub fn new(pool: DbPool, credentials: Credentials) -> Self {
        Self {
            pool,
            credentials: Arc::new(credentials),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/incidents", get(incidents::list_recent))
        .route("/incidents/registrar", post(incidents::register))
        .route("/incidents/:id", delete(incidents::remove))
        .layer(middleware::from_fn(request_span))
        .with_state(state)
}

async fn request_span(req: Request, next: Next) -> Response {
    let span = info_span!(
        "request",
        id = %Uuid::new_v4(),
        method = %req.method(),
        path = %req.uri().path(),
    );
    next.run(req).instrument(span).await
}

/// Serves the incident API until Ctrl-C.
pub async fn serve(config: &AppConfig, pool: DbPool) -> anyhow::Result<()> {
    let state = AppState::new(pool, Credentials::from_config(config));
    if config.api_token.is_empty() && config.admin_token.is_empty() {
        warn!("API_TOKEN and ADMIN_TOKEN are both empty; every request will be refused");
    }

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown requested");
        })
        .await?;

    Ok(())
}
