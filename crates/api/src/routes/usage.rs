use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::middleware::client::ClientId;
use crate::server::AppState;
use crate::types::{ApiResponse, UsageResponse};

/// 查询当前客户端的额度与付费状态
#[utoipa::path(
    get,
    path = "/api/v1/usage",
    tag = "额度 (Usage)",
    params(
        ("X-Client-Id" = String, Header, description = "客户端标识")
    ),
    responses(
        (status = 200, description = "查询成功", body = ApiResponse<UsageResponse>),
        (status = 400, description = "缺少客户端标识")
    )
)]
pub async fn get_usage(
    State(state): State<AppState>,
    ClientId(client_id): ClientId,
) -> Result<Json<ApiResponse<UsageResponse>>, ApiError> {
    let status = state.quota.status(&client_id).await?;
    Ok(Json(ApiResponse::ok(status.into())))
}
