//! Session API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{order_line, seat_change, session};
use crate::utils::validation::{
    MAX_ID_LEN, validate_money, validate_optional_text, validate_percent, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{
    BillBreakdown, BillOptions, FinalizeRequest, OrderLine, OrderLineCreate, SeatChange,
    SeatChangeCreate, Session, SessionCreate, SessionStart, SessionStatus,
};

/// 列表查询参数
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<SessionStatus>,
}

/// Sub-collection writes and reads require the parent session to exist.
async fn ensure_session_exists(
    pool: &SqlitePool,
    branch_id: &str,
    id: &str,
) -> Result<(), AppError> {
    session::find_by_id(pool, branch_id, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found(format!("Session {id}")))
}

/// GET /api/branches/:branch_id/sessions - 获取会话列表 (可按状态过滤)
pub async fn list(
    State(state): State<ServerState>,
    Path(branch_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Session>>> {
    let sessions = session::find_all(state.pool(), &branch_id, query.status).await?;
    Ok(Json(sessions))
}

/// GET /api/branches/:branch_id/sessions/:id - 获取单个会话
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path((branch_id, id)): Path<(String, String)>,
) -> AppResult<Json<Session>> {
    let session = session::find_by_id(state.pool(), &branch_id, &id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Session {id}")))?;
    Ok(Json(session))
}

/// POST /api/branches/:branch_id/sessions - 创建会话
///
/// 带 `start_time` 的会话直接进入 ACTIVE，否则为 RESERVED。
pub async fn create(
    State(state): State<ServerState>,
    Path(branch_id): Path<String>,
    Json(payload): Json<SessionCreate>,
) -> AppResult<Json<Session>> {
    validate_required_text(&branch_id, "branch_id", MAX_ID_LEN)?;
    validate_optional_text(&payload.id, "id", MAX_ID_LEN)?;
    validate_optional_text(&payload.seat_id, "seat_id", MAX_ID_LEN)?;

    let session = session::create(state.pool(), &branch_id, payload).await?;
    Ok(Json(session))
}

/// POST /api/branches/:branch_id/sessions/:id/start - 开始会话
///
/// RESERVED → ACTIVE，只允许一次；重复调用返回 404 (前置条件不再匹配)。
pub async fn start(
    State(state): State<ServerState>,
    Path((branch_id, id)): Path<(String, String)>,
    payload: Option<Json<SessionStart>>,
) -> AppResult<Json<Session>> {
    let start_ms = payload
        .and_then(|Json(p)| p.start_time)
        .unwrap_or_else(shared::util::now_millis);

    let session = session::start(state.pool(), &branch_id, &id, start_ms).await?;
    Ok(Json(session))
}

/// GET /api/branches/:branch_id/sessions/:id/seat-changes - 换座日志 (按时间排序)
pub async fn list_seat_changes(
    State(state): State<ServerState>,
    Path((branch_id, id)): Path<(String, String)>,
) -> AppResult<Json<Vec<SeatChange>>> {
    ensure_session_exists(state.pool(), &branch_id, &id).await?;
    let changes = seat_change::find_by_session(state.pool(), &branch_id, &id).await?;
    Ok(Json(changes))
}

/// POST /api/branches/:branch_id/sessions/:id/seat-changes - 追加换座记录
pub async fn append_seat_change(
    State(state): State<ServerState>,
    Path((branch_id, id)): Path<(String, String)>,
    Json(payload): Json<SeatChangeCreate>,
) -> AppResult<Json<SeatChange>> {
    validate_optional_text(&payload.to_seat_id, "to_seat_id", MAX_ID_LEN)?;
    ensure_session_exists(state.pool(), &branch_id, &id).await?;

    let change = seat_change::append(state.pool(), &branch_id, &id, payload).await?;
    Ok(Json(change))
}

/// GET /api/branches/:branch_id/sessions/:id/orders - 点单列表
pub async fn list_orders(
    State(state): State<ServerState>,
    Path((branch_id, id)): Path<(String, String)>,
) -> AppResult<Json<Vec<OrderLine>>> {
    ensure_session_exists(state.pool(), &branch_id, &id).await?;
    let lines = order_line::find_by_session(state.pool(), &branch_id, &id).await?;
    Ok(Json(lines))
}

/// POST /api/branches/:branch_id/sessions/:id/orders - 追加点单
pub async fn append_order(
    State(state): State<ServerState>,
    Path((branch_id, id)): Path<(String, String)>,
    Json(payload): Json<OrderLineCreate>,
) -> AppResult<Json<OrderLine>> {
    ensure_session_exists(state.pool(), &branch_id, &id).await?;

    let line = order_line::append(state.pool(), &branch_id, &id, payload).await?;
    Ok(Json(line))
}

/// GET /api/branches/:branch_id/sessions/:id/bill - 账单预览 (只读)
///
/// 查询参数: rounding_mode, pax_mode, discount, tax_percent
pub async fn bill_preview(
    State(state): State<ServerState>,
    Path((branch_id, id)): Path<(String, String)>,
    Query(options): Query<BillOptions>,
) -> AppResult<Json<BillBreakdown>> {
    validate_money(options.discount, "discount")?;
    validate_percent(options.tax_percent, "tax_percent")?;

    let breakdown = state.billing.compute_bill(&branch_id, &id, &options).await?;
    Ok(Json(breakdown))
}

/// POST /api/branches/:branch_id/sessions/:id/finalize - 结算会话
///
/// 计算账单并提交，会话转入 COMPLETED。与定时巡检竞争时恰好一方胜出，
/// 落败方得到已存储的账单，响应内容一致。
pub async fn finalize(
    State(state): State<ServerState>,
    Path((branch_id, id)): Path<(String, String)>,
    user: CurrentUser,
    payload: Option<Json<FinalizeRequest>>,
) -> AppResult<Json<BillBreakdown>> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    validate_money(request.options.discount, "discount")?;
    validate_percent(request.options.tax_percent, "tax_percent")?;

    let breakdown = state
        .billing
        .finalize_session(&branch_id, &id, &request, Some(&user.id))
        .await?;
    Ok(Json(breakdown))
}
