//! Session Repository

use super::{RepoError, RepoResult};
use shared::models::{PaymentStatus, Session, SessionCreate, SessionStatus};
use sqlx::SqlitePool;

const SELECT_SESSION: &str = "SELECT branch_id, id, seat_id, status, start_time, duration_minutes, played_minutes, seat_subtotal, orders_total, subtotal, discount, tax_percent, tax_amount, bill_amount, invoice_number, payment_status, closed_at, closed_by, created_at, updated_at FROM session";

/// Upper bound on a session's planned duration (one year). Keeps
/// `start_time + duration_minutes * 60000` far from i64 overflow in the
/// planned-end math and the overdue scan.
pub const MAX_DURATION_MINUTES: i64 = 366 * 24 * 60;

pub async fn find_by_id(
    pool: &SqlitePool,
    branch_id: &str,
    id: &str,
) -> RepoResult<Option<Session>> {
    let sql = format!("{SELECT_SESSION} WHERE branch_id = ? AND id = ?");
    let session = sqlx::query_as::<_, Session>(&sql)
        .bind(branch_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(session)
}

pub async fn find_all(
    pool: &SqlitePool,
    branch_id: &str,
    status: Option<SessionStatus>,
) -> RepoResult<Vec<Session>> {
    let sessions = match status {
        Some(status) => {
            let sql =
                format!("{SELECT_SESSION} WHERE branch_id = ? AND status = ? ORDER BY created_at DESC");
            sqlx::query_as::<_, Session>(&sql)
                .bind(branch_id)
                .bind(status)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("{SELECT_SESSION} WHERE branch_id = ? ORDER BY created_at DESC");
            sqlx::query_as::<_, Session>(&sql)
                .bind(branch_id)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(sessions)
}

pub async fn create(
    pool: &SqlitePool,
    branch_id: &str,
    data: SessionCreate,
) -> RepoResult<Session> {
    if data.duration_minutes < 0 {
        return Err(RepoError::Validation(format!(
            "duration_minutes cannot be negative: {}",
            data.duration_minutes
        )));
    }
    if data.duration_minutes > MAX_DURATION_MINUTES {
        return Err(RepoError::Validation(format!(
            "duration_minutes cannot exceed {MAX_DURATION_MINUTES}: {}",
            data.duration_minutes
        )));
    }

    let now = shared::util::now_millis();
    let id = data
        .id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let status = if data.start_time.is_some() {
        SessionStatus::Active
    } else {
        SessionStatus::Reserved
    };

    sqlx::query(
        "INSERT INTO session (branch_id, id, seat_id, status, start_time, duration_minutes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(branch_id)
    .bind(&id)
    .bind(&data.seat_id)
    .bind(status)
    .bind(data.start_time)
    .bind(data.duration_minutes)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, branch_id, &id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create session".into()))
}

/// Transition RESERVED → ACTIVE, stamping the start instant.
pub async fn start(
    pool: &SqlitePool,
    branch_id: &str,
    id: &str,
    start_ms: i64,
) -> RepoResult<Session> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE session SET status = 'ACTIVE', start_time = ?, updated_at = ? WHERE branch_id = ? AND id = ? AND status = 'RESERVED'",
    )
    .bind(start_ms)
    .bind(now)
    .bind(branch_id)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Session {id} not found or already started"
        )));
    }
    find_by_id(pool, branch_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Session {id} not found")))
}

/// ACTIVE sessions whose planned end has passed (sweep candidates).
pub async fn find_overdue_active(pool: &SqlitePool, now_ms: i64) -> RepoResult<Vec<Session>> {
    let sql = format!(
        "{SELECT_SESSION} WHERE status = 'ACTIVE' AND start_time IS NOT NULL AND start_time + duration_minutes * 60000 < ? ORDER BY start_time"
    );
    let sessions = sqlx::query_as::<_, Session>(&sql)
        .bind(now_ms)
        .fetch_all(pool)
        .await?;
    Ok(sessions)
}

/// Finalized bill fields committed in one conditional update.
#[derive(Debug, Clone)]
pub struct BillCommit<'a> {
    pub played_minutes: i64,
    pub seat_subtotal: f64,
    pub orders_total: f64,
    pub subtotal: f64,
    pub discount: f64,
    pub tax_percent: f64,
    pub tax_amount: f64,
    pub bill_amount: f64,
    pub invoice_number: &'a str,
    pub payment_status: PaymentStatus,
    pub closed_at: i64,
    pub closed_by: Option<&'a str>,
    /// Widen the precondition to already-invoiced COMPLETED sessions
    pub repair: bool,
}

/// Commit a finalized bill with an optimistic status precondition.
///
/// Eligible rows are ACTIVE sessions and COMPLETED sessions that never got
/// an invoice (older zero-bill closes); `repair` additionally admits
/// already-invoiced COMPLETED sessions. Returns whether this caller won the
/// transition — `false` means a concurrent finalize (or an ineligible
/// status) and the caller decides between no-op and conflict.
pub async fn commit_bill(
    pool: &SqlitePool,
    branch_id: &str,
    id: &str,
    commit: BillCommit<'_>,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE session SET status = 'COMPLETED', payment_status = ?, played_minutes = ?, seat_subtotal = ?, orders_total = ?, subtotal = ?, discount = ?, tax_percent = ?, tax_amount = ?, bill_amount = ?, invoice_number = ?, closed_at = ?, closed_by = COALESCE(?, closed_by), updated_at = ? WHERE branch_id = ? AND id = ? AND (status = 'ACTIVE' OR (status = 'COMPLETED' AND invoice_number IS NULL) OR (? AND status = 'COMPLETED'))",
    )
    .bind(commit.payment_status)
    .bind(commit.played_minutes)
    .bind(commit.seat_subtotal)
    .bind(commit.orders_total)
    .bind(commit.subtotal)
    .bind(commit.discount)
    .bind(commit.tax_percent)
    .bind(commit.tax_amount)
    .bind(commit.bill_amount)
    .bind(commit.invoice_number)
    .bind(commit.closed_at)
    .bind(commit.closed_by)
    .bind(now)
    .bind(branch_id)
    .bind(id)
    .bind(commit.repair)
    .execute(pool)
    .await?;

    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }

    #[tokio::test]
    async fn create_defaults_to_reserved_without_start_time() {
        let pool = pool().await;
        let s = create(
            &pool,
            "b1",
            SessionCreate {
                id: Some("s1".into()),
                seat_id: Some("seat1".into()),
                duration_minutes: 60,
                start_time: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(s.status, SessionStatus::Reserved);
        assert!(s.start_time.is_none());
    }

    #[tokio::test]
    async fn create_rejects_durations_beyond_the_cap() {
        let pool = pool().await;
        let result = create(
            &pool,
            "b1",
            SessionCreate {
                id: Some("s1".into()),
                seat_id: None,
                duration_minutes: i64::MAX / 60_000,
                start_time: Some(0),
            },
        )
        .await;
        assert!(matches!(result, Err(RepoError::Validation(_))));

        // The cap itself is still accepted
        create(
            &pool,
            "b1",
            SessionCreate {
                id: Some("s2".into()),
                seat_id: None,
                duration_minutes: MAX_DURATION_MINUTES,
                start_time: Some(0),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn start_transitions_reserved_only_once() {
        let pool = pool().await;
        create(
            &pool,
            "b1",
            SessionCreate {
                id: Some("s1".into()),
                seat_id: None,
                duration_minutes: 30,
                start_time: None,
            },
        )
        .await
        .unwrap();

        let started = start(&pool, "b1", "s1", 1_000).await.unwrap();
        assert_eq!(started.status, SessionStatus::Active);
        assert_eq!(started.start_time, Some(1_000));

        // Second start must fail: the precondition no longer matches
        assert!(matches!(
            start(&pool, "b1", "s1", 2_000).await,
            Err(RepoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn overdue_scan_skips_sessions_within_plan() {
        let pool = pool().await;
        for (id, start_ms, minutes) in [("done", 0i64, 10i64), ("running", 0, 1_000)] {
            create(
                &pool,
                "b1",
                SessionCreate {
                    id: Some(id.into()),
                    seat_id: None,
                    duration_minutes: minutes,
                    start_time: Some(start_ms),
                },
            )
            .await
            .unwrap();
        }

        let overdue = find_overdue_active(&pool, 20 * 60_000).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, "done");
    }
}
