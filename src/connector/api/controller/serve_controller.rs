use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::connector::http::build_router;

use super::super::Container;

pub struct ServeController<'a> {
    container: &'a Container,
}

impl<'a> ServeController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Serves the API until Ctrl-C.
    pub async fn serve(&self, host: String, port: u16) -> Result<String> {
        let addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        let local_addr = listener.local_addr()?;
        info!("Coderr API listening on http://{}/api/", local_addr);

        let app = build_router(self.container.clone());
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutdown signal received");
            })
            .await
            .context("HTTP server failed")?;

        Ok(format!("Server on {} stopped.", local_addr))
    }
}
