//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI 与前端静态资源、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 的 DI 容器持有并调用。

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use shenji_chat::ChatSessionManager;
use shenji_core::quota::port::PaymentGateway;
use shenji_fortune::FortuneService;
use shenji_quota::QuotaService;

use crate::routes::{chart, chat, payment, usage};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - 所有服务在启动前由 DI 容器注入，生命周期与进程等同。
#[derive(Clone)]
pub struct AppState {
    /// 排盘与人生 K 线
    pub fortune: Arc<FortuneService>,
    /// 命理对话会话
    pub chat: Arc<ChatSessionManager>,
    /// 额度
    pub quota: Arc<QuotaService>,
    /// 支付网关
    pub payment: Arc<dyn PaymentGateway>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "神机妙算 API",
        version = "0.1.0",
        description = "八字排盘、人生 K 线、命理对话与演示支付接口。调用方以 X-Client-Id 请求头区分。",
        license(name = "MIT")
    ),
    tags(
        (name = "排盘 (Chart)", description = "四柱排盘、大运、人生 K 线与梅花起卦"),
        (name = "对话 (Chat)", description = "命理解读与追问"),
        (name = "额度 (Usage)", description = "每日额度与付费状态"),
        (name = "支付 (Payment)", description = "演示支付，不对接真实渠道")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// 构建完整的 axum 应用路由树。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
/// * `static_dir` - 前端构建产物目录；未找到的路径回落到其中的 `index.html`
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    // 1. 业务路由与自动收集的 OpenAPI Doc
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(chart::create_chart))
        .routes(routes!(chat::start_analysis))
        .routes(routes!(chat::send_message))
        .routes(routes!(usage::get_usage))
        .routes(routes!(payment::create_order))
        .routes(routes!(payment::order_status))
        .routes(routes!(payment::notify))
        .with_state(state)
        .split_for_parts();

    // 2. 配置 CORS (允许所有来源)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 3. 合并 Swagger UI
    let mut app: Router = router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api));

    // 4. 静态资源与单页应用回落
    if let Some(dir) = static_dir {
        let index = dir.join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    app.layer(cors)
}

/// 构建路由并启动 HTTP 监听，直到 `shutdown` 完成。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:8080"`
/// * `static_dir` - 前端构建产物目录，不存在时跳过静态托管
/// * `shutdown` - 优雅退出信号
pub async fn start_server(
    state: AppState,
    bind_addr: &str,
    static_dir: &Path,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    let static_dir = if static_dir.is_dir() {
        Some(static_dir)
    } else {
        tracing::warn!("静态资源目录 {} 不存在，仅提供 API", static_dir.display());
        None
    };
    let app = build_router(state, static_dir);

    tracing::info!("神机妙算 API Server listening on {}", bind_addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
