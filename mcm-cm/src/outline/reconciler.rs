//! Placement reconciliation
//!
//! Makes the placement/content-item store reflect a validated outline
//! exactly, reusing content items addressed by (node, outline key) so that
//! user-edited body text and audio survive outline edits.
//!
//! Each role is rewritten inside its own transaction: the target slots are
//! cleared first (the (node, role, slot) coordinate is unique, so the
//! rewrite must not collide with rows it is about to replace), then every
//! item is placed in outline order, then stale slots past the new item
//! count are pruned. Content items are never deleted here; rows dropped
//! from an outline simply lose their placements.

use crate::db;
use crate::outline::validator::{OutlineItem, ValidatedOutline};
use mcm_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info};
use uuid::Uuid;

/// Per-node mutual exclusion for outline submissions
///
/// The slot-clear/rewrite pattern is not safe under concurrent writers for
/// the same node, and content-item find-or-create keyed by (node, outline
/// key) must not race either. Handlers hold a node's guard for the whole
/// reconciliation. Entries live for the process lifetime.
#[derive(Clone, Default)]
pub struct NodeLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl NodeLocks {
    pub async fn acquire(&self, node_guid: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(node_guid.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Totals reported back to the caller after a successful reconciliation
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOutcome {
    pub placements_created: u32,
    pub content_items_created: u32,
}

impl ReconcileOutcome {
    fn absorb(&mut self, other: ReconcileOutcome) {
        self.placements_created += other.placements_created;
        self.content_items_created += other.content_items_created;
    }
}

/// Reconcile a node's placements with a validated outline
///
/// Roles are processed sequentially; cross-role order does not matter. A
/// role whose transaction fails rolls back whole, aborts the remaining
/// roles, and surfaces as `PartialFailure`; roles committed before it stay
/// applied. The raw outline document and its timestamp are persisted on the
/// node regardless of per-role outcomes.
///
/// Callers must hold the node's [`NodeLocks`] guard.
pub async fn reconcile(
    pool: &SqlitePool,
    node_guid: &str,
    outline: &ValidatedOutline,
    raw_outline: &serde_json::Value,
) -> Result<ReconcileOutcome> {
    let mut outcome = ReconcileOutcome::default();
    let mut failed: Option<(String, String)> = None;

    for (role, items) in &outline.roles {
        match reconcile_role(pool, node_guid, role, items).await {
            Ok(role_outcome) => outcome.absorb(role_outcome),
            Err(e) => {
                error!(
                    "Reconciliation failed for node {} in role '{}': {}",
                    node_guid, role, e
                );
                failed = Some((role.clone(), e.to_string()));
                break;
            }
        }
    }

    db::nodes::store_outline(pool, node_guid, raw_outline).await?;

    match failed {
        Some((role, detail)) => Err(Error::PartialFailure { role, detail }),
        None => {
            info!(
                "Reconciled outline for node {}: {} placements written, {} content items created",
                node_guid, outcome.placements_created, outcome.content_items_created
            );
            Ok(outcome)
        }
    }
}

/// Rewrite one role's placements inside a single transaction
async fn reconcile_role(
    pool: &SqlitePool,
    node_guid: &str,
    role: &str,
    items: &[OutlineItem],
) -> Result<ReconcileOutcome> {
    let mut tx = pool.begin().await?;
    let mut outcome = ReconcileOutcome::default();
    let slot_count = items.len() as i64;

    // Clear the target slots up front; the (node, role, slot) coordinate is
    // unique and the new placements land on exactly these slots.
    sqlx::query("DELETE FROM placements WHERE node_id = ? AND role = ? AND sort_order < ?")
        .bind(node_guid)
        .bind(role)
        .bind(slot_count)
        .execute(&mut *tx)
        .await?;

    for (index, item) in items.iter().enumerate() {
        let existing: Option<(String, String, String)> = sqlx::query_as(
            "SELECT guid, item_type, title FROM content_items WHERE node_id = ? AND outline_key = ?",
        )
        .bind(node_guid)
        .bind(&item.key)
        .fetch_optional(&mut *tx)
        .await?;

        let item_guid = match existing {
            None => {
                // New key for this node: fresh content item with empty body,
                // no audio; both are user-edited later.
                let guid = Uuid::new_v4().to_string();
                sqlx::query(
                    r#"
                    INSERT INTO content_items (guid, node_id, item_type, title, body, audio_url, outline_key)
                    VALUES (?, ?, ?, ?, '', NULL, ?)
                    "#,
                )
                .bind(&guid)
                .bind(node_guid)
                .bind(&item.content_type)
                .bind(&item.title)
                .bind(&item.key)
                .execute(&mut *tx)
                .await?;
                outcome.content_items_created += 1;
                guid
            }
            Some((guid, item_type, title)) => {
                // Key persists: only title/type follow the outline; body and
                // audio_url stay untouched.
                if item_type != item.content_type || title != item.title {
                    sqlx::query(
                        "UPDATE content_items SET item_type = ?, title = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
                    )
                    .bind(&item.content_type)
                    .bind(&item.title)
                    .bind(&guid)
                    .execute(&mut *tx)
                    .await?;
                }
                guid
            }
        };

        sqlx::query(
            r#"
            INSERT INTO placements (guid, node_id, content_item_id, role, sort_order)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(node_guid)
        .bind(&item_guid)
        .bind(role)
        .bind(index as i64)
        .execute(&mut *tx)
        .await?;
        outcome.placements_created += 1;
    }

    // Prune slots past the new item count. This covers every placement the
    // outline no longer produces for this role, including a stale tail slot
    // whose content item moved into the rewritten range.
    let pruned = sqlx::query("DELETE FROM placements WHERE node_id = ? AND role = ? AND sort_order >= ?")
        .bind(node_guid)
        .bind(role)
        .bind(slot_count)
        .execute(&mut *tx)
        .await?;
    if pruned.rows_affected() > 0 {
        debug!(
            "Pruned {} stale placement(s) for node {} role '{}'",
            pruned.rows_affected(),
            node_guid,
            role
        );
    }

    tx.commit().await?;
    Ok(outcome)
}
