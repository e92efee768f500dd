mod logging;
mod settings;

use std::path::Path;
use std::sync::Arc;

use shenji_api::server::{AppState, start_server};
use shenji_calendar::AstroCalendar;
use shenji_chat::{ChatSessionManager, GeminiNarrator};
use shenji_core::calendar::port::CalendarPort;
use shenji_core::common::time::{RealTimeProvider, TimeProvider};
use shenji_fortune::FortuneService;
use shenji_quota::{MemUsageStore, MockPaymentGateway, QuotaService};
use tracing::{info, warn};

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到各服务。
///
/// # Logic
/// 1. 加载配置并初始化全局日志。
/// 2. 实例化基础设施层（时钟、历法、存储、文本服务）。
/// 3. 构造应用服务层（排盘、额度、对话、支付）。
/// 4. 启动 HTTP 服务，等待外部信号优雅退出。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置与日志
    let config = settings::load(settings::CONFIG_FILE, None)?;
    let _log_guard = logging::init(&config.logging)?;
    info!("神机妙算 starting...");

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider already installed");
    }

    // 2. 基础设施层
    let clock: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);
    let calendar = Arc::new(AstroCalendar::new(config.calendar.utc_offset_hours)?);
    let offset = calendar.utc_offset();
    let store = Arc::new(MemUsageStore::new());
    if config.narrator.api_key.is_empty() {
        warn!("未配置 API_KEY，命理对话将不可用");
    }
    let narrator = Arc::new(GeminiNarrator::new(&config.narrator)?);

    // 3. 应用服务层
    let fortune = Arc::new(FortuneService::new(calendar, clock.clone()));
    let quota = Arc::new(QuotaService::new(
        store.clone(),
        clock.clone(),
        offset,
        config.quota.daily_limit,
    ));
    let chat = Arc::new(ChatSessionManager::new(
        fortune.clone(),
        quota.clone(),
        narrator,
    ));
    let payment = Arc::new(MockPaymentGateway::new(store, clock));

    let state = AppState {
        fortune,
        chat,
        quota,
        payment,
    };
    info!(
        daily_limit = config.quota.daily_limit,
        utc_offset = %offset,
        model = %config.narrator.model,
        "services initialized"
    );

    // 4. 启动服务并挂起，直到收到退出信号
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    start_server(
        state,
        &bind_addr,
        Path::new(&config.server.static_dir),
        shutdown_signal(),
    )
    .await?;

    info!("Shutdown complete. Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received.");
}
