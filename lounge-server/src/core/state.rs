use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::billing::{BillingEngine, BillingSweeper};
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::Config;
use crate::db::DbService;
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是计费节点的核心数据结构。使用 Arc 实现浅拷贝，
/// 所有权成本极低，可安全地在 handler 与后台任务之间共享。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | billing | BillingEngine | 会话计费引擎 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 数据库服务
    pub db: DbService,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 会话计费引擎
    pub billing: BillingEngine,
}

impl ServerState {
    /// 初始化服务器状态：打开数据库、应用迁移、构建服务
    pub async fn initialize(config: Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let billing = BillingEngine::new(db.pool.clone(), config.billing_timezone);

        Ok(Self {
            config,
            db,
            jwt_service,
            billing,
        })
    }

    /// 获取数据库连接池
    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    /// 获取 JWT 服务
    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// 注册后台任务
    ///
    /// 当前只有一个：超时会话的自动结算巡检。
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let sweeper = BillingSweeper::new(
            self.billing.clone(),
            tasks.shutdown_token(),
            Duration::from_secs(self.config.sweep_interval_secs),
        );
        tasks.spawn("billing_sweeper", TaskKind::Periodic, sweeper.run());
    }
}
