//! Content item handlers
//!
//! Direct access to content items outside the outline flow: the admin UI
//! edits generated body text and audio URLs here. Reconciliation never
//! touches those two fields.

use axum::extract::{Path, Query, State};
use axum::Json;
use mcm_common::db::models::ContentItem;
use mcm_common::Error;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::nodes::require_node;
use crate::api::ApiError;
use crate::db;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentItemRequest {
    node_id: Option<String>,
    #[serde(rename = "type")]
    item_type: Option<String>,
    title: Option<String>,
    body: Option<String>,
    audio_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentItemRequest {
    body: Option<String>,
    audio_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContentItemsQuery {
    node_id: Option<String>,
}

/// GET /content-items - List content items, optionally for one node
pub async fn list_content_items(
    State(state): State<AppState>,
    Query(query): Query<ListContentItemsQuery>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    let items = match query.node_id {
        Some(node_id) => db::content::list_items_for_node(&state.db, &node_id).await?,
        None => db::content::list_items(&state.db).await?,
    };
    Ok(Json(items))
}

/// GET /nodes/:id/content-items - Content items scoped to a node
pub async fn node_content_items(
    State(state): State<AppState>,
    Path(node_id): Path<Uuid>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    let node = require_node(&state, &node_id).await?;
    Ok(Json(db::content::list_items_for_node(&state.db, &node.guid).await?))
}

/// POST /content-items - Create a content item directly
///
/// Items created here carry no outline key and are never touched by
/// reconciliation.
pub async fn create_content_item(
    State(state): State<AppState>,
    Json(req): Json<CreateContentItemRequest>,
) -> Result<Json<ContentItem>, ApiError> {
    let (node_id, item_type, title) = match (req.node_id, req.item_type, req.title) {
        (Some(n), Some(t), Some(title)) if !title.is_empty() => (n, t, title),
        _ => {
            return Err(
                Error::InvalidShape("nodeId, type, and title are required".to_string()).into()
            );
        }
    };

    let node = db::nodes::fetch_node(&state.db, &node_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Node {} not found", node_id)))?;

    let item = ContentItem {
        guid: Uuid::new_v4().to_string(),
        node_id: node.guid,
        item_type,
        title,
        body: req.body.unwrap_or_default(),
        audio_url: req.audio_url.filter(|s| !s.is_empty()),
        outline_key: None,
    };
    db::content::insert_item(&state.db, &item).await?;

    Ok(Json(item))
}

/// GET /content-items/:id - Get one content item
pub async fn get_content_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ContentItem>, ApiError> {
    let item = require_item(&state, &item_id).await?;
    Ok(Json(item))
}

/// PATCH /content-items/:id - Edit body text and audio URL
///
/// An empty audioUrl clears the column; omitted fields are untouched.
pub async fn update_content_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(req): Json<UpdateContentItemRequest>,
) -> Result<Json<ContentItem>, ApiError> {
    let mut item = require_item(&state, &item_id).await?;

    if let Some(body) = req.body {
        item.body = body;
    }
    if let Some(url) = req.audio_url {
        item.audio_url = if url.is_empty() { None } else { Some(url) };
    }

    db::content::update_item(&state.db, &item).await?;
    Ok(Json(item))
}

async fn require_item(state: &AppState, item_id: &Uuid) -> Result<ContentItem, Error> {
    db::content::fetch_item(&state.db, &item_id.to_string())
        .await?
        .ok_or_else(|| Error::NotFound(format!("Content item {} not found", item_id)))
}
