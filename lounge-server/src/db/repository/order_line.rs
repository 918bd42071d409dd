//! Order Line Repository

use super::{RepoError, RepoResult};
use shared::models::{OrderLine, OrderLineCreate};
use sqlx::SqlitePool;

pub async fn append(
    pool: &SqlitePool,
    branch_id: &str,
    session_id: &str,
    data: OrderLineCreate,
) -> RepoResult<OrderLine> {
    if !data.price.is_finite() {
        return Err(RepoError::Validation(format!(
            "price must be a finite number: {}",
            data.price
        )));
    }

    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO order_line (branch_id, session_id, name, price, qty, total, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(branch_id)
    .bind(session_id)
    .bind(&data.name)
    .bind(data.price)
    .bind(data.qty)
    .bind(&data.total)
    .bind(now)
    .fetch_one(pool)
    .await?;

    let line = sqlx::query_as::<_, OrderLine>(
        "SELECT id, branch_id, session_id, name, price, qty, total, created_at FROM order_line WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    line.ok_or_else(|| RepoError::Database("Failed to append order line".into()))
}

pub async fn find_by_session(
    pool: &SqlitePool,
    branch_id: &str,
    session_id: &str,
) -> RepoResult<Vec<OrderLine>> {
    let lines = sqlx::query_as::<_, OrderLine>(
        "SELECT id, branch_id, session_id, name, price, qty, total, created_at FROM order_line WHERE branch_id = ? AND session_id = ? ORDER BY id",
    )
    .bind(branch_id)
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(lines)
}
