//! Content item queries

use mcm_common::db::models::ContentItem;
use mcm_common::Result;
use sqlx::SqlitePool;

const ITEM_COLUMNS: &str = "guid, node_id, item_type, title, body, audio_url, outline_key";

#[derive(sqlx::FromRow)]
struct ItemRow {
    guid: String,
    node_id: String,
    item_type: String,
    title: String,
    body: String,
    audio_url: Option<String>,
    outline_key: Option<String>,
}

impl From<ItemRow> for ContentItem {
    fn from(row: ItemRow) -> Self {
        ContentItem {
            guid: row.guid,
            node_id: row.node_id,
            item_type: row.item_type,
            title: row.title,
            body: row.body,
            audio_url: row.audio_url,
            outline_key: row.outline_key,
        }
    }
}

pub async fn insert_item(pool: &SqlitePool, item: &ContentItem) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO content_items (guid, node_id, item_type, title, body, audio_url, outline_key)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.guid)
    .bind(&item.node_id)
    .bind(&item.item_type)
    .bind(&item.title)
    .bind(&item.body)
    .bind(&item.audio_url)
    .bind(&item.outline_key)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_item(pool: &SqlitePool, guid: &str) -> Result<Option<ContentItem>> {
    let row: Option<ItemRow> =
        sqlx::query_as(&format!("SELECT {} FROM content_items WHERE guid = ?", ITEM_COLUMNS))
            .bind(guid)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(ContentItem::from))
}

pub async fn list_items(pool: &SqlitePool) -> Result<Vec<ContentItem>> {
    let rows: Vec<ItemRow> = sqlx::query_as(&format!(
        "SELECT {} FROM content_items ORDER BY created_at, guid",
        ITEM_COLUMNS
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(ContentItem::from).collect())
}

pub async fn list_items_for_node(pool: &SqlitePool, node_guid: &str) -> Result<Vec<ContentItem>> {
    let rows: Vec<ItemRow> = sqlx::query_as(&format!(
        "SELECT {} FROM content_items WHERE node_id = ? ORDER BY created_at, guid",
        ITEM_COLUMNS
    ))
    .bind(node_guid)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(ContentItem::from).collect())
}

/// Write back the user-editable fields of a content item
pub async fn update_item(pool: &SqlitePool, item: &ContentItem) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE content_items
        SET body = ?, audio_url = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&item.body)
    .bind(&item.audio_url)
    .bind(&item.guid)
    .execute(pool)
    .await?;
    Ok(())
}
