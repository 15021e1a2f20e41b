//! Folds decoded pool events into the `pool_snapshot` and `contributions`
//! tables.
//!
//! Every pool event carries absolute values (running totals, the cumulative
//! contribution and entitlement, the resulting status), so applying an event
//! overwrites rather than accumulates. The projection converges on the
//! on-chain record no matter how often a page is replayed.

use sqlx::SqliteConnection;

use crate::errors::Result;
use crate::events::{EventKind, PoolEvent, PoolSchedule, PoolTerms};

/// Apply one newly stored event to the projection.
pub async fn apply(conn: &mut SqliteConnection, ev: &PoolEvent) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO pool_snapshot (id, contract_id) VALUES (1, ?1)")
        .bind(&ev.contract_id)
        .execute(&mut *conn)
        .await?;

    match ev.kind() {
        EventKind::PoolCreated => {
            set_snapshot(conn, "owner", ev.actor.as_deref()).await?;
            set_snapshot(conn, "payment_asset", ev.payment_asset.as_deref()).await?;
            set_snapshot(conn, "offering_asset", ev.offering_asset.as_deref()).await?;
            if let Some(terms) = &ev.terms {
                set_terms(conn, terms).await?;
            }
        }
        EventKind::ParametersUpdated => {
            if let Some(terms) = &ev.terms {
                set_terms(conn, terms).await?;
            }
            set_offering_covered(conn, ev.offering_deposited).await?;
        }
        EventKind::OfferingDeposited => {
            set_snapshot(conn, "offering_deposited_amount", ev.total.as_deref()).await?;
            set_offering_covered(conn, ev.offering_deposited).await?;
        }
        EventKind::PoolActivated | EventKind::ScheduleUpdated => {
            if let Some(schedule) = &ev.schedule {
                set_schedule(conn, schedule).await?;
            }
        }
        EventKind::TokensPurchased => {
            set_snapshot(conn, "total_raised", ev.total.as_deref()).await?;
            if let Some(address) = ev.actor.as_deref() {
                record_purchase(conn, address, ev).await?;
            }
        }
        EventKind::PoolFinalized | EventKind::RefundEnabled | EventKind::PoolCancelled => {
            set_snapshot(conn, "total_raised", ev.total.as_deref()).await?
        }
        EventKind::TokensClaimed => {
            set_snapshot(conn, "total_distributed", ev.total.as_deref()).await?;
            if let Some(address) = ev.actor.as_deref() {
                mark_settled(conn, address, "claimed_tokens", ev.ledger).await?;
            }
        }
        EventKind::RefundClaimed => {
            set_snapshot(conn, "total_refunded", ev.total.as_deref()).await?;
            if let Some(address) = ev.actor.as_deref() {
                mark_settled(conn, address, "claimed_refund", ev.ledger).await?;
            }
        }
        EventKind::OwnershipTransferred => {
            set_snapshot(conn, "owner", ev.new_owner.as_deref()).await?
        }
        EventKind::FundsWithdrawn | EventKind::UnsoldWithdrawn | EventKind::Unknown => {}
    }

    sqlx::query(
        r#"
        UPDATE pool_snapshot
        SET    status = COALESCE(?1, status),
               last_ledger = MAX(last_ledger, ?2)
        WHERE  id = 1
        "#,
    )
    .bind(ev.status)
    .bind(ev.ledger)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn set_terms(conn: &mut SqliteConnection, terms: &PoolTerms) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE pool_snapshot
        SET    rate = ?1,
               soft_cap = ?2,
               hard_cap = ?3,
               min_contribution = ?4,
               max_contribution = ?5
        WHERE  id = 1
        "#,
    )
    .bind(&terms.rate)
    .bind(&terms.soft_cap)
    .bind(&terms.hard_cap)
    .bind(&terms.min_contribution)
    .bind(&terms.max_contribution)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn set_schedule(conn: &mut SqliteConnection, schedule: &PoolSchedule) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE pool_snapshot
        SET    start_time = ?1,
               end_time = ?2,
               refund_end_time = ?3
        WHERE  id = 1
        "#,
    )
    .bind(schedule.start_time)
    .bind(schedule.end_time)
    .bind(schedule.refund_end_time)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn set_offering_covered(conn: &mut SqliteConnection, covered: Option<bool>) -> Result<()> {
    let Some(covered) = covered else {
        return Ok(());
    };
    sqlx::query("UPDATE pool_snapshot SET offering_deposited = ?1 WHERE id = 1")
        .bind(covered)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// `column` is always one of the fixed snapshot column names above.
async fn set_snapshot(
    conn: &mut SqliteConnection,
    column: &'static str,
    value: Option<&str>,
) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let sql = format!("UPDATE pool_snapshot SET {column} = ?1 WHERE id = 1");
    sqlx::query(&sql).bind(value).execute(&mut *conn).await?;
    Ok(())
}

/// Upsert the buyer's cumulative record and recount participants.
async fn record_purchase(
    conn: &mut SqliteConnection,
    address: &str,
    ev: &PoolEvent,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO contributions (address, amount, entitlement, last_ledger)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (address) DO UPDATE
        SET    amount = excluded.amount,
               entitlement = excluded.entitlement,
               last_ledger = excluded.last_ledger
        "#,
    )
    .bind(address)
    .bind(ev.contribution.as_deref().unwrap_or("0"))
    .bind(ev.entitlement.as_deref().unwrap_or("0"))
    .bind(ev.ledger)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        UPDATE pool_snapshot
        SET    participant_count = (SELECT COUNT(*) FROM contributions WHERE amount != '0')
        WHERE  id = 1
        "#,
    )
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// `flag` is `claimed_tokens` or `claimed_refund`.
async fn mark_settled(
    conn: &mut SqliteConnection,
    address: &str,
    flag: &'static str,
    ledger: i64,
) -> Result<()> {
    let sql = format!(
        r#"
        INSERT INTO contributions (address, {flag}, last_ledger)
        VALUES (?1, 1, ?2)
        ON CONFLICT (address) DO UPDATE
        SET    {flag} = 1,
               last_ledger = MAX(last_ledger, excluded.last_ledger)
        "#
    );
    sqlx::query(&sql)
        .bind(address)
        .bind(ledger)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
