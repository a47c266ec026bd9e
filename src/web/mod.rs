//! Dashboard server: static files plus the refresh/status API.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | `dashboard.html` from the static directory |
//! | `GET /news_data.json` | the persisted news document |
//! | `GET /api/refresh` | start a background refresh, reply immediately |
//! | `GET /api/status` | timestamp of the last completed refresh |
//! | anything else | static files |

pub mod handlers;
pub mod trigger;

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use trigger::{Job, JobTrigger};

/// Build the dashboard router.
pub fn create_router(trigger: Arc<JobTrigger>, static_dir: &Path, document: &Path) -> Router {
    let api = Router::new()
        .route("/refresh", get(handlers::refresh))
        .route("/status", get(handlers::status))
        .layer(CorsLayer::permissive())
        .with_state(trigger);

    Router::new()
        .nest("/api", api)
        .route_service("/", ServeFile::new(static_dir.join("dashboard.html")))
        .route_service("/news_data.json", ServeFile::new(document))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}

/// Serve `router` on `bind` until Ctrl-C.
pub async fn serve(router: Router, bind: &str) -> Result<(), Box<dyn Error>> {
    let listener = TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "Dashboard server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Dashboard server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
}
