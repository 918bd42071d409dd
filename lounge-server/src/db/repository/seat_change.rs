//! Seat Change Repository
//!
//! Append-only occupancy change log. Read ordered by `changed_at`, never by
//! insertion order: change instants are externally assigned and may arrive
//! out of order.

use super::{RepoError, RepoResult};
use shared::models::{SeatChange, SeatChangeCreate};
use sqlx::SqlitePool;

pub async fn append(
    pool: &SqlitePool,
    branch_id: &str,
    session_id: &str,
    data: SeatChangeCreate,
) -> RepoResult<SeatChange> {
    let changed_at = data.changed_at.unwrap_or_else(shared::util::now_millis);

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO seat_change (branch_id, session_id, to_seat_id, changed_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(branch_id)
    .bind(session_id)
    .bind(&data.to_seat_id)
    .bind(changed_at)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to append seat change".into()))
}

async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<SeatChange>> {
    let change = sqlx::query_as::<_, SeatChange>(
        "SELECT id, branch_id, session_id, to_seat_id, changed_at FROM seat_change WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(change)
}

pub async fn find_by_session(
    pool: &SqlitePool,
    branch_id: &str,
    session_id: &str,
) -> RepoResult<Vec<SeatChange>> {
    let changes = sqlx::query_as::<_, SeatChange>(
        "SELECT id, branch_id, session_id, to_seat_id, changed_at FROM seat_change WHERE branch_id = ? AND session_id = ? ORDER BY changed_at",
    )
    .bind(branch_id)
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(changes)
}
