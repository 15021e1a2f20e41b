//! Database layer: migrations, queries, and cursor management.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::errors::Result;
use crate::events::{ContributionRecord, EventRecord, PoolEvent, PoolSnapshot};
use crate::projection;

const EVENT_COLUMNS: &str = "id, event_id, event_type, actor, amount, contribution, entitlement, \
     total, status, new_owner, ledger, timestamp, contract_id, tx_hash, created_at";

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    init_pool_with(database_url, 5).await
}

/// Same as [`init_pool`] with an explicit connection ceiling.
///
/// In-memory databases are per-connection, so tests pass `1`.
pub async fn init_pool_with(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    // Make sure the file is created if it doesn't exist yet.
    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger from the cursor row.
/// Returns `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger (and optionally a pagination cursor string).
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Read back the raw cursor string (used to resume pagination mid-ledger).
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events and fold each new one into the
/// projection, all inside one transaction.
///
/// Events whose `event_id` is already stored are ignored, so replaying a
/// page after a restart neither duplicates rows nor re-applies them.
pub async fn insert_events(pool: &SqlitePool, events: &[PoolEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, actor, amount, contribution, entitlement, total,
                 status, new_owner, ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&ev.event_id)
        .bind(&ev.event_type)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(&ev.contribution)
        .bind(&ev.entitlement)
        .bind(&ev.total)
        .bind(ev.status)
        .bind(&ev.new_owner)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            debug!("Skipping already indexed event {}", ev.event_id);
            continue;
        }

        projection::apply(&mut *tx, ev).await?;
        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events triggered by `actor`, ordered by ledger ascending.
pub async fn get_events_for_actor(pool: &SqlitePool, actor: &str) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE actor = ?1 ORDER BY ledger ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .bind(actor)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Fetch all events, ordered by ledger ascending.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY ledger ASC, id ASC");
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

// ─────────────────────────────────────────────────────────
// Projection reads
// ─────────────────────────────────────────────────────────

/// The projected pool record, or `None` before the `init` event is indexed.
pub async fn get_pool_snapshot(pool: &SqlitePool) -> Result<Option<PoolSnapshot>> {
    let row = sqlx::query_as::<_, PoolSnapshot>(
        r#"
        SELECT contract_id, owner, payment_asset, offering_asset,
               rate, soft_cap, hard_cap, min_contribution, max_contribution,
               start_time, end_time, refund_end_time, status,
               total_raised, total_distributed, total_refunded,
               offering_deposited_amount, offering_deposited, participant_count,
               last_ledger
        FROM   pool_snapshot
        WHERE  id = 1
        "#,
    )
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Every participant with a recorded contribution.
pub async fn get_contributions(pool: &SqlitePool) -> Result<Vec<ContributionRecord>> {
    let rows = sqlx::query_as::<_, ContributionRecord>(
        r#"
        SELECT address, amount, entitlement, claimed_tokens, claimed_refund, last_ledger
        FROM   contributions
        ORDER  BY address ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_contribution(
    pool: &SqlitePool,
    address: &str,
) -> Result<Option<ContributionRecord>> {
    let row = sqlx::query_as::<_, ContributionRecord>(
        r#"
        SELECT address, amount, entitlement, claimed_tokens, claimed_refund, last_ledger
        FROM   contributions
        WHERE  address = ?1
        "#,
    )
    .bind(address)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
