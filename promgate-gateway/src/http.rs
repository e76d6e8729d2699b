//! HTTP server exposing the push adapters.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, get, post};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::adapter::{IDENTIFY_PARAM, JOB_PARAM, flat_push, structured_push};
use crate::config::RoutesConfig;
use crate::state::GatewayState;

/// Create the HTTP router.
///
/// Each push prefix is routed with its token segment and also bare, so that
/// a missing token is answered by the adapter rather than with a 404.
pub fn create_router(state: GatewayState, routes: &RoutesConfig) -> Router {
    let structured = || post(structured_push).put(structured_push);
    let flat = || post(flat_push).put(flat_push);

    let router = Router::new();
    let router = add_push_routes(router, &routes.structured_prefix, JOB_PARAM, structured);
    let router = add_push_routes(router, &routes.flat_prefix, IDENTIFY_PARAM, flat);

    router
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn add_push_routes(
    router: Router<GatewayState>,
    prefix: &str,
    param: &str,
    handler: impl Fn() -> MethodRouter<GatewayState>,
) -> Router<GatewayState> {
    router
        .route(&format!("{}/:{}", prefix, param), handler())
        .route(&format!("{}/", prefix), handler())
        .route(prefix, handler())
}

/// Handler for the /health endpoint.
async fn health_handler() -> Response {
    (StatusCode::OK, "healthy\n").into_response()
}

/// Handler for the /stats endpoint.
async fn stats_handler(State(state): State<GatewayState>) -> Response {
    axum::Json(state.stats()).into_response()
}

/// HTTP server configuration.
pub struct HttpServer {
    state: GatewayState,
    routes: RoutesConfig,
    listen_addr: SocketAddr,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(state: GatewayState, routes: RoutesConfig, listen_addr: SocketAddr) -> Self {
        Self {
            state,
            routes,
            listen_addr,
        }
    }

    /// Bind the listen address and serve until the shutdown signal is received.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        info!(addr = %self.listen_addr, "Starting HTTP server");

        let listener = TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.listen_addr, e))?;

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until the shutdown signal is received.
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        let local_addr = listener.local_addr()?;
        let router = create_router(self.state, &self.routes);

        info!(
            addr = %local_addr,
            structured = %self.routes.structured_prefix,
            flat = %self.routes.flat_prefix,
            "HTTP server listening"
        );

        // Run server with graceful shutdown
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                loop {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                    if *shutdown.borrow() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
