//! # API 统一错误处理
//!
//! 将下层各 crate 的错误类型统一映射到 HTTP 状态码与 JSON 响应体。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use shenji_core::calendar::error::CalendarError;
use shenji_core::chart::error::ChartError;
use shenji_core::chat::error::ChatError;
use shenji_core::quota::error::QuotaError;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 请求参数错误 (400)
    #[error("请求参数错误: {0}")]
    BadRequest(String),

    /// 需要付费 (402)
    #[error("{0}")]
    PaymentRequired(String),

    /// 资源未找到 (404)
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 当日额度已用尽 (429)
    #[error("{0}")]
    TooManyRequests(String),

    /// 上游文本服务失败 (502)
    #[error("上游服务错误: {0}")]
    BadGateway(String),

    /// 下层业务错误 (500)
    #[error("内部服务错误: {0}")]
    Internal(String),
}

/// 将 `ApiError` 转换为 axum 的 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::PaymentRequired(msg) => (StatusCode::PAYMENT_REQUIRED, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            ApiError::BadGateway(msg) => {
                tracing::warn!("上游服务错误: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            ApiError::Internal(msg) => {
                // 内部错误只记录日志，不向客户端透传细节
                tracing::error!("内部服务错误: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "服务器内部错误".to_string(),
                )
            }
        };

        let body = Json(ApiErrorResponse::from_msg(message));
        (status, body).into_response()
    }
}

/// 从 `ChartError` 转换
impl From<ChartError> for ApiError {
    fn from(err: ChartError) -> Self {
        match &err {
            ChartError::InvalidInput(_)
            | ChartError::Calendar(CalendarError::InvalidDate(_))
            | ChartError::Calendar(CalendarError::OutOfRange { .. }) => {
                ApiError::BadRequest(err.to_string())
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

/// 从 `ChatError` 转换
impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::LimitReached => ApiError::TooManyRequests(err.to_string()),
            ChatError::PaymentRequired => ApiError::PaymentRequired(err.to_string()),
            ChatError::NoSession(_) => ApiError::NotFound(err.to_string()),
            ChatError::Chart(e) => e.into(),
            ChatError::Incomplete(msg) => ApiError::BadGateway(msg),
            ChatError::Network(_) | ChatError::Protocol(_) => ApiError::BadGateway(err.to_string()),
            ChatError::Quota(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// 从 `QuotaError` 转换
impl From<QuotaError> for ApiError {
    fn from(err: QuotaError) -> Self {
        match &err {
            QuotaError::LimitReached(_) => ApiError::TooManyRequests(err.to_string()),
            QuotaError::OrderNotFound(id) => ApiError::NotFound(format!("订单 {}", id)),
            QuotaError::Invalid(msg) => ApiError::BadRequest(msg.clone()),
            QuotaError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}
