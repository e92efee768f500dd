//! # 排盘路由控制器
//!
//! `/api/v1/chart`：排盘、人生 K 线与梅花起卦一次返回，不计额度。

use axum::Json;
use axum::extract::State;

use shenji_core::chart::entity::BirthInput;
use shenji_core::common::random::EntropyRandom;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, BirthRequest, ChartBundleResponse};

/// 排盘并生成人生 K 线
///
/// 每次请求使用新的随机源，同一出生信息多次请求的 K 线会有差异；
/// 卦象取决于请求时刻。
#[utoipa::path(
    post,
    path = "/api/v1/chart",
    tag = "排盘 (Chart)",
    request_body = BirthRequest,
    responses(
        (status = 200, description = "排盘成功", body = ApiResponse<ChartBundleResponse>),
        (status = 400, description = "出生信息不合法")
    )
)]
pub async fn create_chart(
    State(state): State<AppState>,
    Json(req): Json<BirthRequest>,
) -> Result<Json<ApiResponse<ChartBundleResponse>>, ApiError> {
    let input = BirthInput::try_from(req)?;
    let (chart, destiny) = state.fortune.generate(&input, &mut EntropyRandom::new())?;
    Ok(Json(ApiResponse::ok(ChartBundleResponse {
        chart: (&chart).into(),
        destiny: (&destiny).into(),
    })))
}
