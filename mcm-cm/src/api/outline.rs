//! Outline submission endpoint

use axum::extract::{Path, State};
use axum::Json;
use mcm_common::Error;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::nodes::require_node;
use crate::api::ApiError;
use crate::outline::{reconciler, validator};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OutlineSubmission {
    outline: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineResponse {
    pub success: bool,
    pub node_id: String,
    pub placements_created: u32,
    pub content_items_created: u32,
}

/// POST /nodes/:id/outline - Validate an outline and reconcile placements
///
/// Validation rejects the whole document before any write. Reconciliation
/// for one node runs under that node's lock; submissions for the same node
/// are serialized, different nodes proceed in parallel.
pub async fn submit_outline(
    State(state): State<AppState>,
    Path(node_id): Path<Uuid>,
    Json(req): Json<OutlineSubmission>,
) -> Result<Json<OutlineResponse>, ApiError> {
    let raw = req.outline.ok_or_else(|| {
        Error::InvalidShape("request body must contain an 'outline' document".to_string())
    })?;

    let node = require_node(&state, &node_id).await?;
    let validated = validator::validate(&raw)?;

    let _guard = state.node_locks.acquire(&node.guid).await;
    let outcome = reconciler::reconcile(&state.db, &node.guid, &validated, &raw).await?;

    Ok(Json(OutlineResponse {
        success: true,
        node_id: node.guid,
        placements_created: outcome.placements_created,
        content_items_created: outcome.content_items_created,
    }))
}
