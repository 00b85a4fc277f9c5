//! Database models
//!
//! These double as the wire types: field names follow the JSON contract
//! (camelCase, `id`/`type` aliases) so handlers can return them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Node kind within the fixed three-level exhibit tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Museum,
    Room,
    Artifact,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Museum => "MUSEUM",
            NodeType::Room => "ROOM",
            NodeType::Artifact => "ARTIFACT",
        }
    }

    /// Parse the wire spelling; unknown strings are a caller error
    pub fn parse(s: &str) -> Option<NodeType> {
        match s {
            "MUSEUM" => Some(NodeType::Museum),
            "ROOM" => Some(NodeType::Room),
            "ARTIFACT" => Some(NodeType::Artifact),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tree element of type Museum, Room, or Artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(rename = "id")]
    pub guid: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: String,
    pub parent_id: Option<String>,
    pub knowledge_text: Option<String>,
    pub further_reading: Vec<String>,
    /// Raw outline document as last submitted (None until first submission)
    pub outline: Option<serde_json::Value>,
    pub outline_updated_at: Option<DateTime<Utc>>,
}

/// Reusable generated content scoped to a node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(rename = "id")]
    pub guid: String,
    pub node_id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub title: String,
    pub body: String,
    pub audio_url: Option<String>,
    /// Key addressing this item within its node's outline namespace;
    /// None for items created directly rather than via an outline
    pub outline_key: Option<String>,
}

/// Positional link between a node+role+order and a content item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    #[serde(rename = "id")]
    pub guid: String,
    pub node_id: String,
    pub content_item_id: String,
    pub role: String,
    pub sort_order: i64,
}
