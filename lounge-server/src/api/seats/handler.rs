//! Seat API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::seat;
use crate::utils::validation::{MAX_ID_LEN, MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::models::{Seat, SeatCreate, SeatUpdate};

/// GET /api/branches/:branch_id/seats - 获取分店所有座位
pub async fn list(
    State(state): State<ServerState>,
    Path(branch_id): Path<String>,
) -> AppResult<Json<Vec<Seat>>> {
    let seats = seat::find_all(state.pool(), &branch_id).await?;
    Ok(Json(seats))
}

/// GET /api/branches/:branch_id/seats/:id - 获取单个座位
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path((branch_id, id)): Path<(String, String)>,
) -> AppResult<Json<Seat>> {
    let seat = seat::find_by_id(state.pool(), &branch_id, &id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Seat {id}")))?;
    Ok(Json(seat))
}

/// POST /api/branches/:branch_id/seats - 创建座位
pub async fn create(
    State(state): State<ServerState>,
    Path(branch_id): Path<String>,
    Json(payload): Json<SeatCreate>,
) -> AppResult<Json<Seat>> {
    validate_required_text(&branch_id, "branch_id", MAX_ID_LEN)?;
    validate_required_text(&payload.id, "id", MAX_ID_LEN)?;
    if payload.name.len() > MAX_NAME_LEN {
        return Err(AppError::validation("name is too long"));
    }

    let seat = seat::create(state.pool(), &branch_id, payload).await?;
    Ok(Json(seat))
}

/// PUT /api/branches/:branch_id/seats/:id - 更新座位 (部分字段)
pub async fn update(
    State(state): State<ServerState>,
    Path((branch_id, id)): Path<(String, String)>,
    Json(payload): Json<SeatUpdate>,
) -> AppResult<Json<Seat>> {
    if let Some(name) = &payload.name
        && name.len() > MAX_NAME_LEN
    {
        return Err(AppError::validation("name is too long"));
    }

    let seat = seat::update(state.pool(), &branch_id, &id, payload).await?;
    Ok(Json(seat))
}
