//! Node queries

use chrono::{DateTime, Utc};
use mcm_common::db::models::{Node, NodeType};
use mcm_common::{Error, Result};
use sqlx::SqlitePool;

const NODE_COLUMNS: &str =
    "guid, node_type, name, parent_id, knowledge_text, further_reading, outline, outline_updated_at";

/// Raw row as stored; JSON columns and timestamps decode in [`NodeRow::into_node`]
#[derive(sqlx::FromRow)]
struct NodeRow {
    guid: String,
    node_type: String,
    name: String,
    parent_id: Option<String>,
    knowledge_text: Option<String>,
    further_reading: String,
    outline: Option<String>,
    outline_updated_at: Option<String>,
}

impl NodeRow {
    fn into_node(self) -> Result<Node> {
        let node_type = NodeType::parse(&self.node_type)
            .ok_or_else(|| Error::Internal(format!("unknown node_type '{}'", self.node_type)))?;
        let further_reading: Vec<String> = serde_json::from_str(&self.further_reading)
            .map_err(|e| Error::Internal(format!("bad further_reading JSON: {}", e)))?;
        let outline = match self.outline {
            Some(raw) => Some(
                serde_json::from_str(&raw)
                    .map_err(|e| Error::Internal(format!("bad outline JSON: {}", e)))?,
            ),
            None => None,
        };
        let outline_updated_at = match self.outline_updated_at {
            Some(ts) => Some(
                DateTime::parse_from_rfc3339(&ts)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| Error::Internal(format!("bad outline_updated_at: {}", e)))?,
            ),
            None => None,
        };
        Ok(Node {
            guid: self.guid,
            node_type,
            name: self.name,
            parent_id: self.parent_id,
            knowledge_text: self.knowledge_text,
            further_reading,
            outline,
            outline_updated_at,
        })
    }
}

fn rows_into_nodes(rows: Vec<NodeRow>) -> Result<Vec<Node>> {
    rows.into_iter().map(NodeRow::into_node).collect()
}

pub async fn insert_node(pool: &SqlitePool, node: &Node) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO nodes (guid, node_type, name, parent_id, knowledge_text, further_reading)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&node.guid)
    .bind(node.node_type.as_str())
    .bind(&node.name)
    .bind(&node.parent_id)
    .bind(&node.knowledge_text)
    .bind(serde_json::to_string(&node.further_reading).unwrap_or_else(|_| "[]".to_string()))
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_node(pool: &SqlitePool, guid: &str) -> Result<Option<Node>> {
    let row: Option<NodeRow> =
        sqlx::query_as(&format!("SELECT {} FROM nodes WHERE guid = ?", NODE_COLUMNS))
            .bind(guid)
            .fetch_optional(pool)
            .await?;
    row.map(NodeRow::into_node).transpose()
}

pub async fn list_nodes(pool: &SqlitePool) -> Result<Vec<Node>> {
    let rows: Vec<NodeRow> =
        sqlx::query_as(&format!("SELECT {} FROM nodes ORDER BY created_at, guid", NODE_COLUMNS))
            .fetch_all(pool)
            .await?;
    rows_into_nodes(rows)
}

/// Top-level museums (MUSEUM type, no parent)
pub async fn list_museums(pool: &SqlitePool) -> Result<Vec<Node>> {
    let rows: Vec<NodeRow> = sqlx::query_as(&format!(
        "SELECT {} FROM nodes WHERE node_type = 'MUSEUM' AND parent_id IS NULL ORDER BY created_at, guid",
        NODE_COLUMNS
    ))
    .fetch_all(pool)
    .await?;
    rows_into_nodes(rows)
}

pub async fn fetch_children(pool: &SqlitePool, parent_guid: &str) -> Result<Vec<Node>> {
    let rows: Vec<NodeRow> = sqlx::query_as(&format!(
        "SELECT {} FROM nodes WHERE parent_id = ? ORDER BY created_at, guid",
        NODE_COLUMNS
    ))
    .bind(parent_guid)
    .fetch_all(pool)
    .await?;
    rows_into_nodes(rows)
}

/// Write back the editable scalar fields of a node
pub async fn update_scalars(pool: &SqlitePool, node: &Node) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE nodes
        SET name = ?, knowledge_text = ?, further_reading = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&node.name)
    .bind(&node.knowledge_text)
    .bind(serde_json::to_string(&node.further_reading).unwrap_or_else(|_| "[]".to_string()))
    .bind(&node.guid)
    .execute(pool)
    .await?;
    Ok(())
}

/// Persist the raw outline document and stamp outline_updated_at
pub async fn store_outline(
    pool: &SqlitePool,
    node_guid: &str,
    outline: &serde_json::Value,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE nodes
        SET outline = ?, outline_updated_at = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(outline.to_string())
    .bind(Utc::now().to_rfc3339())
    .bind(node_guid)
    .execute(pool)
    .await?;
    Ok(())
}
