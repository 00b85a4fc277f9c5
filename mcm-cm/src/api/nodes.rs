//! Node hierarchy handlers
//!
//! The tree is fixed at three levels: MUSEUM at the root, ROOM below a
//! museum, ARTIFACT below a room. Parent-type compatibility is checked
//! here on creation; scalar updates are independent of the outline and
//! placement subsystem and never cascade.

use axum::extract::{Path, State};
use axum::Json;
use mcm_common::db::models::{Node, NodeType};
use mcm_common::Error;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::api::ApiError;
use crate::db;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeRequest {
    #[serde(rename = "type")]
    node_type: Option<String>,
    name: Option<String>,
    parent_id: Option<String>,
    knowledge_text: Option<String>,
    further_reading: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNodeRequest {
    name: Option<String>,
    knowledge_text: Option<String>,
    further_reading: Option<Value>,
}

/// GET /nodes - List all nodes
pub async fn list_nodes(State(state): State<AppState>) -> Result<Json<Vec<Node>>, ApiError> {
    Ok(Json(db::nodes::list_nodes(&state.db).await?))
}

/// GET /nodes/museums - List top-level museums
pub async fn list_museums(State(state): State<AppState>) -> Result<Json<Vec<Node>>, ApiError> {
    Ok(Json(db::nodes::list_museums(&state.db).await?))
}

/// GET /nodes/:id - Get one node
pub async fn get_node(
    State(state): State<AppState>,
    Path(node_id): Path<Uuid>,
) -> Result<Json<Node>, ApiError> {
    let node = require_node(&state, &node_id).await?;
    Ok(Json(node))
}

/// GET /nodes/:id/children - Children of a node
pub async fn get_children(
    State(state): State<AppState>,
    Path(node_id): Path<Uuid>,
) -> Result<Json<Vec<Node>>, ApiError> {
    let node = require_node(&state, &node_id).await?;
    Ok(Json(db::nodes::fetch_children(&state.db, &node.guid).await?))
}

/// POST /nodes - Create a node
///
/// Validates parent-type compatibility: MUSEUM takes no parent, ROOM needs
/// a MUSEUM parent, ARTIFACT needs a ROOM parent.
pub async fn create_node(
    State(state): State<AppState>,
    Json(req): Json<CreateNodeRequest>,
) -> Result<Json<Node>, ApiError> {
    let (type_str, name) = match (req.node_type, req.name) {
        (Some(t), Some(n)) if !n.is_empty() => (t, n),
        _ => {
            return Err(Error::InvalidShape("type and name are required".to_string()).into());
        }
    };
    let node_type = NodeType::parse(&type_str).ok_or_else(|| {
        Error::InvalidShape("type must be MUSEUM, ROOM, or ARTIFACT".to_string())
    })?;

    let parent_id = validate_parent(&state, node_type, req.parent_id).await?;
    let further_reading = match req.further_reading {
        Some(value) => parse_further_reading(&value)?,
        None => Vec::new(),
    };

    let node = Node {
        guid: Uuid::new_v4().to_string(),
        node_type,
        name,
        parent_id,
        knowledge_text: req.knowledge_text.filter(|s| !s.is_empty()),
        further_reading,
        outline: None,
        outline_updated_at: None,
    };
    db::nodes::insert_node(&state.db, &node).await?;
    info!("Created {} node {} ({})", node.node_type, node.guid, node.name);

    Ok(Json(node))
}

/// PATCH /nodes/:id - Update a node's scalar fields
///
/// Touches name, knowledgeText, and furtherReading only. An empty
/// knowledgeText clears the column.
pub async fn update_node(
    State(state): State<AppState>,
    Path(node_id): Path<Uuid>,
    Json(req): Json<UpdateNodeRequest>,
) -> Result<Json<Node>, ApiError> {
    let mut node = require_node(&state, &node_id).await?;

    if let Some(name) = req.name {
        if name.is_empty() {
            return Err(Error::InvalidShape("name must not be empty".to_string()).into());
        }
        node.name = name;
    }
    if let Some(text) = req.knowledge_text {
        node.knowledge_text = if text.is_empty() { None } else { Some(text) };
    }
    if let Some(value) = req.further_reading {
        node.further_reading = parse_further_reading(&value)?;
    }

    db::nodes::update_scalars(&state.db, &node).await?;
    Ok(Json(node))
}

/// Fetch a node or fail with NotFound
pub(crate) async fn require_node(state: &AppState, node_id: &Uuid) -> Result<Node, Error> {
    db::nodes::fetch_node(&state.db, &node_id.to_string())
        .await?
        .ok_or_else(|| Error::NotFound(format!("Node {} not found", node_id)))
}

/// Check the parent rules for a node type and return the effective parent id
async fn validate_parent(
    state: &AppState,
    node_type: NodeType,
    parent_id: Option<String>,
) -> Result<Option<String>, Error> {
    match node_type {
        NodeType::Museum => {
            if parent_id.is_some() {
                return Err(Error::InvariantViolation(
                    "MUSEUM nodes must have no parent".to_string(),
                ));
            }
            Ok(None)
        }
        NodeType::Room | NodeType::Artifact => {
            let expected_parent = match node_type {
                NodeType::Room => NodeType::Museum,
                _ => NodeType::Room,
            };
            let parent_id = parent_id.ok_or_else(|| {
                Error::InvariantViolation(format!("{} nodes require a parentId", node_type))
            })?;
            let parent = db::nodes::fetch_node(&state.db, &parent_id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Parent node {} not found", parent_id)))?;
            if parent.node_type != expected_parent {
                return Err(Error::InvariantViolation(format!(
                    "{} parent must be a {} node",
                    node_type, expected_parent
                )));
            }
            Ok(Some(parent.guid))
        }
    }
}

fn parse_further_reading(value: &Value) -> Result<Vec<String>, Error> {
    let items = value.as_array().ok_or_else(|| {
        Error::InvalidShape("furtherReading must be an array of strings".to_string())
    })?;
    items
        .iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                Error::InvalidShape("furtherReading must be an array of strings".to_string())
            })
        })
        .collect()
}
