//! Local dashboard server: JSON API, live-update stream, static files, and optionally the
//! MCP tools over streamable HTTP.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `/api/notes`, `/api/notes/{id}`, `/api/notes/{id}/status` | notes |
//! | `/api/contexts`, `/api/teams/{id}` | teams and projects |
//! | `/api/periods`, `/api/tickets/...` | planning |
//! | `/api/milestones`, `/api/milestones/{id}` | milestones |
//! | `/api/archived` | archive view |
//! | `/api/events` | server-sent events |
//! | `/mcp` | MCP (when enabled) |
//! | anything else | files under the web root |

pub mod api;
pub mod assets;
mod error;
pub mod events;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::Router;

pub use error::ApiError;
pub use events::{DashboardEvent, EventHub};

use crate::config::AppConfig;
use crate::storage::Store;
use crate::tools::ContextTools;

/// Process-lifetime state shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Store,
    pub events: EventHub,
    pub web_root: PathBuf,
    pub keepalive: Duration,
}

impl AppState {
    pub fn new(store: Store, web_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            events: EventHub::new(),
            web_root: web_root.into(),
            keepalive: Duration::from_secs(30),
        }
    }
}

/// Answer preflight requests and stamp permissive CORS headers on every response.
async fn cors(req: Request, next: Next) -> Response {
    let mut res = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };
    let headers = res.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    res
}

/// Build the dashboard router. With `mcp_endpoint`, the tool handler is also served at
/// `/mcp` against the same store.
pub fn router(state: AppState, mcp_endpoint: bool) -> Router {
    let mut app = Router::new()
        .route("/api/notes", get(api::list_notes).post(api::create_note))
        .route("/api/notes/{id}", put(api::update_note))
        .route("/api/notes/{id}/status", put(api::update_note_status))
        .route("/api/contexts", get(api::get_contexts))
        .route("/api/teams/{id}", get(api::get_team).put(api::update_team))
        .route("/api/periods", get(api::list_periods).post(api::create_period))
        .route("/api/tickets", get(api::list_tickets).post(api::create_ticket))
        .route("/api/tickets/{id}", put(api::update_ticket))
        .route("/api/tickets/{id}/restore", put(api::restore_ticket))
        .route(
            "/api/tickets/{id}/subdeliverables/{index}",
            put(api::set_sub_deliverable),
        )
        .route("/api/milestones", get(api::list_milestones))
        .route("/api/milestones/{id}", put(api::update_milestone))
        .route("/api/archived", get(api::archived))
        .route("/api/events", get(events::stream));

    if mcp_endpoint {
        let store = state.store.clone();
        let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
            move || Ok(ContextTools::new(store.clone())),
            rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
                .into(),
            Default::default(),
        );
        app = app.nest_service("/mcp", service);
    }

    app.fallback(assets::serve_file)
        .with_state(state)
        .layer(middleware::from_fn(cors))
}

/// Run the dashboard server until ctrl-c.
pub async fn serve(config: AppConfig) -> Result<()> {
    let store = Store::new(config.resolved_data_dir());
    store
        .ensure_initialized()
        .context("failed to initialize data directory")?;

    let mut state = AppState::new(store, config.resolved_web_root());
    state.keepalive = Duration::from_secs(config.web.keepalive_secs);

    // Live reload is best-effort; the API works without it.
    let _watcher = match events::watch_data_dir(
        state.store.root(),
        state.events.clone(),
        Duration::from_millis(config.web.debounce_ms),
    ) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(error = %e, "file watcher unavailable, live reload disabled");
            None
        }
    };

    tracing::info!(
        data = %state.store.root().display(),
        web_root = %state.web_root.display(),
        "dashboard state ready"
    );
    let app = router(state, config.web.mcp_endpoint);

    let bind_addr = format!("{}:{}", config.web.host, config.web.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "ContextBuddy dashboard running at http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down dashboard server");
        })
        .await?;

    Ok(())
}
