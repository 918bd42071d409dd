//! Lounge Server - 多分店座位场馆的会话计费节点
//!
//! # 架构概述
//!
//! 本模块是 Lounge Server 的主入口，提供以下核心功能：
//!
//! - **计费引擎** (`billing`): 换座分段重建、费率解析、账单计算与一次性结算
//! - **数据库** (`db`): 嵌入式 SQLite 存储 (sqlx, WAL)
//! - **认证** (`auth`): Bearer JWT 验证 (签发在外部身份服务)
//! - **HTTP API** (`api`): RESTful API 接口
//! - **后台任务** (`core::tasks`): 超时会话自动结算巡检
//!
//! # 模块结构
//!
//! ```text
//! lounge-server/src/
//! ├── core/          # 配置、状态、后台任务
//! ├── auth/          # JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! ├── billing/       # 会话计费引擎
//! ├── db/            # 数据库层
//! └── utils/         # 错误、日志、校验
//! ```

pub mod api;
pub mod auth;
pub mod billing;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use billing::{BillingEngine, BillingError, BillingSweeper};
pub use core::{BackgroundTasks, Config, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
    __
   / /   ____  __  ______  ____ ____
  / /   / __ \/ / / / __ \/ __ `/ _ \
 / /___/ /_/ / /_/ / / / / /_/ /  __/
/_____/\____/\__,_/_/ /_/\__, /\___/
                        /____/
    "#
    );
}
