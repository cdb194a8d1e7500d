use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use fwsync_config::AppConfig;
use fwsync_engine::Reconciler;

use crate::{handlers, middleware as app_middleware};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<Reconciler>,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        // The reconciliation trigger
        .route("/firewall/rules", post(handlers::update_firewall_rules))
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct FwsyncServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    reconciler: Arc<Reconciler>,
}

impl ServerBuilder {
    pub fn new(cfg: &AppConfig, reconciler: Arc<Reconciler>) -> Self {
        Self {
            addr: cfg.addr(),
            reconciler,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn build(self) -> FwsyncServer {
        let app = build_app(AppState {
            reconciler: self.reconciler,
        });
        FwsyncServer {
            addr: self.addr,
            app,
        }
    }
}

impl FwsyncServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
