//! Seat Repository

use super::{RepoError, RepoResult};
use shared::models::{Seat, SeatCreate, SeatPricing, SeatUpdate};
use sqlx::SqlitePool;

const SELECT_SEAT: &str = "SELECT branch_id, id, name, rate_per_hour, rate30_single, rate30_multi, rate60_single, rate60_multi, is_active, created_at, updated_at FROM seat";

fn validate_rate(value: f64, field: &str) -> RepoResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(RepoError::Validation(format!(
            "{field} must be a non-negative finite number: {value}"
        )));
    }
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, branch_id: &str, id: &str) -> RepoResult<Option<Seat>> {
    let sql = format!("{SELECT_SEAT} WHERE branch_id = ? AND id = ?");
    let seat = sqlx::query_as::<_, Seat>(&sql)
        .bind(branch_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(seat)
}

pub async fn find_all(pool: &SqlitePool, branch_id: &str) -> RepoResult<Vec<Seat>> {
    let sql = format!("{SELECT_SEAT} WHERE branch_id = ? ORDER BY id");
    let seats = sqlx::query_as::<_, Seat>(&sql)
        .bind(branch_id)
        .fetch_all(pool)
        .await?;
    Ok(seats)
}

/// Rate catalog lookup used by the billing engine. A missing seat resolves
/// to `None`; the engine then bills the segment at zero rate rather than
/// erroring.
pub async fn find_pricing(
    pool: &SqlitePool,
    branch_id: &str,
    id: &str,
) -> RepoResult<Option<SeatPricing>> {
    let pricing = sqlx::query_as::<_, SeatPricing>(
        "SELECT rate_per_hour, rate30_single, rate30_multi, rate60_single, rate60_multi FROM seat WHERE branch_id = ? AND id = ?",
    )
    .bind(branch_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(pricing)
}

pub async fn create(pool: &SqlitePool, branch_id: &str, data: SeatCreate) -> RepoResult<Seat> {
    validate_rate(data.rate_per_hour, "rate_per_hour")?;
    for (value, field) in [
        (data.rate30_single, "rate30_single"),
        (data.rate30_multi, "rate30_multi"),
        (data.rate60_single, "rate60_single"),
        (data.rate60_multi, "rate60_multi"),
    ] {
        if let Some(v) = value {
            validate_rate(v, field)?;
        }
    }

    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO seat (branch_id, id, name, rate_per_hour, rate30_single, rate30_multi, rate60_single, rate60_multi, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(branch_id)
    .bind(&data.id)
    .bind(&data.name)
    .bind(data.rate_per_hour)
    .bind(data.rate30_single)
    .bind(data.rate30_multi)
    .bind(data.rate60_single)
    .bind(data.rate60_multi)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, branch_id, &data.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create seat".into()))
}

pub async fn update(
    pool: &SqlitePool,
    branch_id: &str,
    id: &str,
    data: SeatUpdate,
) -> RepoResult<Seat> {
    for (value, field) in [
        (data.rate_per_hour, "rate_per_hour"),
        (data.rate30_single, "rate30_single"),
        (data.rate30_multi, "rate30_multi"),
        (data.rate60_single, "rate60_single"),
        (data.rate60_multi, "rate60_multi"),
    ] {
        if let Some(v) = value {
            validate_rate(v, field)?;
        }
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE seat SET name = COALESCE(?, name), rate_per_hour = COALESCE(?, rate_per_hour), rate30_single = COALESCE(?, rate30_single), rate30_multi = COALESCE(?, rate30_multi), rate60_single = COALESCE(?, rate60_single), rate60_multi = COALESCE(?, rate60_multi), is_active = COALESCE(?, is_active), updated_at = ? WHERE branch_id = ? AND id = ?",
    )
    .bind(&data.name)
    .bind(data.rate_per_hour)
    .bind(data.rate30_single)
    .bind(data.rate30_multi)
    .bind(data.rate60_single)
    .bind(data.rate60_multi)
    .bind(data.is_active)
    .bind(now)
    .bind(branch_id)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Seat {id} not found")));
    }
    find_by_id(pool, branch_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Seat {id} not found")))
}
