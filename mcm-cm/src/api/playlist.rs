//! Playlist assembly endpoint
//!
//! Read side of the outline subsystem: placements joined with their content
//! items, grouped per role in slot order.

use axum::extract::{Path, State};
use axum::Json;
use mcm_common::db::models::{ContentItem, NodeType};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::api::nodes::require_node;
use crate::api::ApiError;
use crate::db;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PlaylistNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub id: String,
    pub sort_order: i64,
    pub content_item: ContentItem,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub node: PlaylistNode,
    /// Role name → entries in slot order; empty when the node has no
    /// placements (that is not an error)
    pub roles: BTreeMap<String, Vec<PlaylistEntry>>,
}

/// GET /nodes/:id/playlist - Assembled playlist for a node
pub async fn get_playlist(
    State(state): State<AppState>,
    Path(node_id): Path<Uuid>,
) -> Result<Json<PlaylistResponse>, ApiError> {
    let node = require_node(&state, &node_id).await?;

    let mut roles: BTreeMap<String, Vec<PlaylistEntry>> = BTreeMap::new();
    for (placement, item) in db::placements::playlist_rows(&state.db, &node.guid).await? {
        let entry = PlaylistEntry {
            id: placement.guid,
            sort_order: placement.sort_order,
            content_item: item,
        };
        roles.entry(placement.role).or_default().push(entry);
    }

    Ok(Json(PlaylistResponse {
        node: PlaylistNode {
            id: node.guid,
            node_type: node.node_type,
            name: node.name,
        },
        roles,
    }))
}
