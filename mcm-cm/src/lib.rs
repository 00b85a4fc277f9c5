//! mcm-cm library - Museum Content Manager service
//!
//! Admin-facing HTTP API over the exhibit tree: node hierarchy CRUD,
//! content items, outline submission, and playlist assembly.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod outline;

use outline::reconciler::NodeLocks;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Per-node locks serializing outline reconciliation
    pub node_locks: NodeLocks,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            node_locks: NodeLocks::default(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        // Node hierarchy
        .route("/nodes", get(api::nodes::list_nodes).post(api::nodes::create_node))
        .route("/nodes/museums", get(api::nodes::list_museums))
        .route("/nodes/:id", get(api::nodes::get_node).patch(api::nodes::update_node))
        .route("/nodes/:id/children", get(api::nodes::get_children))
        .route("/nodes/:id/content-items", get(api::content::node_content_items))
        // Outline submission and playlist assembly
        .route("/nodes/:id/outline", post(api::outline::submit_outline))
        .route("/nodes/:id/playlist", get(api::playlist::get_playlist))
        // Content items
        .route(
            "/content-items",
            get(api::content::list_content_items).post(api::content::create_content_item),
        )
        .route(
            "/content-items/:id",
            get(api::content::get_content_item).patch(api::content::update_content_item),
        )
        .merge(api::health_routes())
        // The admin web app is served from another origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
