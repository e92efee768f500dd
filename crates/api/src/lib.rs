//! # `shenji-api` - HTTP API 网关
//!
//! 本 crate 是神机妙算的 HTTP/REST 服务入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收前端单页应用的 HTTP 请求，以 `X-Client-Id` 区分调用方
//! - 调用 `FortuneService`、`ChatSessionManager`、`QuotaService` 与支付网关完成业务
//! - 将领域模型转换为 DTO 返回给前端
//! - 托管前端静态资源

pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod types;
