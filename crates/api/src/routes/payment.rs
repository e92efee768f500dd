//! # 演示支付路由控制器
//!
//! 不对接真实渠道：下单返回演示链接，轮询即视为已付款，回调一律应答 `success`。

use axum::Json;
use axum::extract::{Path, State};

use shenji_core::quota::entity::PayMethod;

use crate::error::ApiError;
use crate::middleware::client::ClientId;
use crate::server::AppState;
use crate::types::{ApiResponse, CreateOrderRequest, OrderResponse};

/// 创建演示订单
#[utoipa::path(
    post,
    path = "/api/payment/create",
    tag = "支付 (Payment)",
    params(
        ("X-Client-Id" = String, Header, description = "客户端标识")
    ),
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "下单成功", body = ApiResponse<OrderResponse>),
        (status = 400, description = "支付渠道或金额不合法")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    ClientId(client_id): ClientId,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let method: PayMethod = req.method.parse().map_err(ApiError::BadRequest)?;
    let order = state
        .payment
        .create_order(&client_id, method, req.amount, req.order_id)
        .await?;
    Ok(Json(ApiResponse::ok(order.into())))
}

/// 查询订单状态
///
/// 演示网关下已知订单总是返回已付款，并为下单客户端发放一次付费提问资格。
#[utoipa::path(
    get,
    path = "/api/payment/status/{order_id}",
    tag = "支付 (Payment)",
    params(
        ("order_id" = String, Path, description = "订单号")
    ),
    responses(
        (status = 200, description = "查询成功", body = ApiResponse<OrderResponse>),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order = state.payment.order_status(&order_id).await?;
    Ok(Json(ApiResponse::ok(order.into())))
}

/// 支付渠道异步回调
///
/// 正文按 JSON 解析，解析失败时整段作为 `raw` 字段传给网关。应答为纯文本。
#[utoipa::path(
    post,
    path = "/api/payment/notify",
    tag = "支付 (Payment)",
    request_body = String,
    responses(
        (status = 200, description = "固定应答 success", body = String, content_type = "text/plain")
    )
)]
pub async fn notify(State(state): State<AppState>, body: String) -> Result<String, ApiError> {
    let payload = serde_json::from_str(&body).unwrap_or_else(|_| serde_json::json!({ "raw": body }));
    Ok(state.payment.notify(payload).await?)
}
