//! Web server for ChatVault.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::auth::SessionService;
use crate::config::Config;
use crate::file::ShareLinkService;
use crate::storage::StorageRouter;
use crate::{Database, Result, VaultError};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// Headroom over the largest backend limit so multipart framing never trips
/// the body limit before the size check does.
const BODY_LIMIT_OVERHEAD: usize = 1024 * 1024;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
    /// Request body limit in bytes.
    max_body_bytes: usize,
    /// Cleanup sweep interval in seconds.
    cleanup_interval_secs: u64,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, db: &Database, router: StorageRouter) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| VaultError::Config(format!("invalid server address: {e}")))?;

        let max_backend = router
            .platforms()
            .iter()
            .filter_map(|p| router.get(*p).ok())
            .map(|b| b.max_upload_size() as usize)
            .max()
            .unwrap_or(0);

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(db, router, config)),
            cors_origins: config.server.cors_origins.clone(),
            max_body_bytes: max_backend + BODY_LIMIT_OVERHEAD,
            cleanup_interval_secs: config.session.cleanup_interval_secs,
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the periodic cleanup task.
    ///
    /// Each sweep removes expired sessions and expired share links.
    fn start_cleanup_task(
        sessions: SessionService,
        shares: ShareLinkService,
        interval_secs: u64,
    ) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                match sessions.cleanup_expired().await {
                    Ok(count) if count > 0 => {
                        tracing::info!(deleted_count = count, "Cleaned up expired sessions");
                    }
                    Ok(_) => {
                        tracing::debug!("No expired sessions to clean up");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to cleanup sessions");
                    }
                }

                match shares.cleanup_expired().await {
                    Ok(count) if count > 0 => {
                        tracing::info!(deleted_count = count, "Cleaned up expired share links");
                    }
                    Ok(_) => {
                        tracing::debug!("No expired share links to clean up");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to cleanup share links");
                    }
                }
            }
        });
    }

    async fn bind(self) -> std::io::Result<(TcpListener, axum::Router)> {
        let sessions = self.app_state.sessions.clone();
        let shares = self.app_state.shares.clone();

        let router = create_router(self.app_state, &self.cors_origins, self.max_body_bytes)
            .merge(create_health_router());

        let listener = TcpListener::bind(self.addr).await?;

        // Start the cleanup task only after a successful bind
        Self::start_cleanup_task(sessions, shares, self.cleanup_interval_secs);
        tracing::info!(
            interval_secs = self.cleanup_interval_secs,
            "Cleanup task started"
        );

        Ok((listener, router))
    }

    /// Run the web server.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.bind().await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
