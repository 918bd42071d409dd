use lounge_server::{BackgroundTasks, Config, ServerState, api, init_logger, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境与日志
    dotenvy::dotenv().ok();
    init_logger();

    print_banner();
    tracing::info!("Lounge Server starting...");

    // 2. 加载配置
    let config = Config::from_env();
    let port = config.http_port;

    // 3. 初始化服务器状态 (打开数据库、应用迁移)
    let state = ServerState::initialize(config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize server state: {e}"))?;

    // 4. 启动后台任务 (超时会话巡检)
    let mut tasks = BackgroundTasks::new();
    state.start_background_tasks(&mut tasks);
    tasks.log_summary();

    // 5. 启动 HTTP 服务器
    let app = api::build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Lounge Server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await?;

    // 6. 停止后台任务
    tasks.shutdown().await;

    Ok(())
}
