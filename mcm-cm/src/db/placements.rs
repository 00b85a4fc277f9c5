//! Placement read-side queries
//!
//! The write side lives in the reconciler, which runs its statements inside
//! a per-role transaction.

use mcm_common::db::models::{ContentItem, Placement};
use mcm_common::Result;
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct PlaylistRow {
    placement_guid: String,
    role: String,
    sort_order: i64,
    item_guid: String,
    item_node_id: String,
    item_type: String,
    title: String,
    body: String,
    audio_url: Option<String>,
    outline_key: Option<String>,
}

/// All placements of a node joined with their content items, ordered by
/// (role ascending, sort_order ascending)
pub async fn playlist_rows(
    pool: &SqlitePool,
    node_guid: &str,
) -> Result<Vec<(Placement, ContentItem)>> {
    let rows: Vec<PlaylistRow> = sqlx::query_as(
        r#"
        SELECT
            p.guid        AS placement_guid,
            p.role        AS role,
            p.sort_order  AS sort_order,
            c.guid        AS item_guid,
            c.node_id     AS item_node_id,
            c.item_type   AS item_type,
            c.title       AS title,
            c.body        AS body,
            c.audio_url   AS audio_url,
            c.outline_key AS outline_key
        FROM placements p
        JOIN content_items c ON c.guid = p.content_item_id
        WHERE p.node_id = ?
        ORDER BY p.role ASC, p.sort_order ASC
        "#,
    )
    .bind(node_guid)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let placement = Placement {
                guid: row.placement_guid,
                node_id: row.item_node_id.clone(),
                content_item_id: row.item_guid.clone(),
                role: row.role,
                sort_order: row.sort_order,
            };
            let item = ContentItem {
                guid: row.item_guid,
                node_id: row.item_node_id,
                item_type: row.item_type,
                title: row.title,
                body: row.body,
                audio_url: row.audio_url,
                outline_key: row.outline_key,
            };
            (placement, item)
        })
        .collect())
}
