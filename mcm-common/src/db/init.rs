//! Database initialization
//!
//! Creates the database on first run and keeps schema creation idempotent,
//! so every module entry point can call it unconditionally.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Wait out short-lived lock contention instead of failing immediately
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent - safe to call multiple times)
///
/// Split out of [`init_database`] so tests can run against an in-memory pool.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_nodes_table(pool).await?;
    create_content_items_table(pool).await?;
    create_placements_table(pool).await?;
    Ok(())
}

/// Create the nodes table
///
/// Stores the exhibit tree: MUSEUM at the top, ROOM below it, ARTIFACT at
/// the leaves. Parent-type compatibility is cross-row and enforced by the
/// node handlers; the CHECK below only ties MUSEUM to a NULL parent.
pub async fn create_nodes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS nodes (
            guid TEXT PRIMARY KEY,
            node_type TEXT NOT NULL CHECK (node_type IN ('MUSEUM', 'ROOM', 'ARTIFACT')),
            name TEXT NOT NULL,
            parent_id TEXT REFERENCES nodes(guid) ON DELETE CASCADE,
            knowledge_text TEXT,
            further_reading TEXT NOT NULL DEFAULT '[]',
            outline TEXT,
            outline_updated_at TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK ((node_type = 'MUSEUM') = (parent_id IS NULL))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_nodes_parent ON nodes(parent_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_nodes_type ON nodes(node_type)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the content_items table
///
/// Content is scoped to one node and addressed by outline key within that
/// node. Rows with a NULL outline_key were created directly (not via an
/// outline) and stay outside the uniqueness constraint.
pub async fn create_content_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS content_items (
            guid TEXT PRIMARY KEY,
            node_id TEXT NOT NULL REFERENCES nodes(guid) ON DELETE CASCADE,
            item_type TEXT NOT NULL,
            title TEXT NOT NULL,
            body TEXT NOT NULL DEFAULT '',
            audio_url TEXT,
            outline_key TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (node_id, outline_key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_content_items_node ON content_items(node_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the placements table
///
/// Positional link between a node+role+order and a content item. At most
/// one placement occupies a given (node, role, slot) coordinate.
pub async fn create_placements_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS placements (
            guid TEXT PRIMARY KEY,
            node_id TEXT NOT NULL REFERENCES nodes(guid) ON DELETE CASCADE,
            content_item_id TEXT NOT NULL REFERENCES content_items(guid) ON DELETE CASCADE,
            role TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (node_id, role, sort_order),
            CHECK (sort_order >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_placements_node_role ON placements(node_id, role, sort_order)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_placements_content_item ON placements(content_item_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
