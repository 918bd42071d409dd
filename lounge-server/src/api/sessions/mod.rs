//! Session API 模块
//!
//! 会话生命周期 (创建/开始)、换座日志、点单、账单预览与结算。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/branches/{branch_id}/sessions", session_routes())
}

fn session_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/start", post(handler::start))
        .route(
            "/{id}/seat-changes",
            get(handler::list_seat_changes).post(handler::append_seat_change),
        )
        .route(
            "/{id}/orders",
            get(handler::list_orders).post(handler::append_order),
        )
        .route("/{id}/bill", get(handler::bill_preview))
        .route("/{id}/finalize", post(handler::finalize))
}
