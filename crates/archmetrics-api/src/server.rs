use crate::{create_router, AppState};
use anyhow::{Context, Result};
use archmetrics_core::Settings;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

pub struct Server {
    state: AppState,
    addr: SocketAddr,
}

impl Server {
    pub fn new(settings: Settings) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
            .parse()
            .context("invalid server.host/server.port")?;
        let state = AppState::new(settings)?;
        Ok(Self { state, addr })
    }

    pub async fn run(self) -> Result<()> {
        let router = create_router(self.state);
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("binding {}", self.addr))?;

        info!("ArchMetrics API listening on http://{}", self.addr);
        info!("  GET    /health");
        info!("  GET    /api/summary/architecture/{{org}}/{{repo}}?branch=&path=");
        info!("  GET    /api/repos/architecture/{{org}}/{{repo}}?branch=&path=");
        info!("  GET    /api/adf/{{org}}/{{repo}}[/export?format=json|yaml|graphml]");
        info!("  GET    /api/adf/cache/stats");
        info!("  DELETE /api/adf/cache");
        info!("  GET    /api/repos/{{org}}?limit=");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
