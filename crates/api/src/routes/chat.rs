//! # 命理对话路由控制器
//!
//! 首轮解读与追问。额度、首问免费与付费资格的判定全部在 `ChatSessionManager` 中完成，
//! 这里只负责参数转换与错误映射。

use axum::Json;
use axum::extract::State;

use shenji_core::chart::entity::BirthInput;
use shenji_core::common::random::EntropyRandom;

use crate::error::ApiError;
use crate::middleware::client::ClientId;
use crate::server::AppState;
use crate::types::{AnalysisResponse, ApiResponse, BirthRequest, MessageRequest, MessageResponse};

/// 开始命理解读
///
/// 排盘、生成人生 K 线并由文本服务给出首轮解读。解读超过 100 字计一次额度；
/// 解读为空时不计额度并返回 502。
#[utoipa::path(
    post,
    path = "/api/v1/chat/analysis",
    tag = "对话 (Chat)",
    params(
        ("X-Client-Id" = String, Header, description = "客户端标识")
    ),
    request_body = BirthRequest,
    responses(
        (status = 200, description = "解读完成", body = ApiResponse<AnalysisResponse>),
        (status = 400, description = "出生信息不合法"),
        (status = 429, description = "今日额度已用完"),
        (status = 502, description = "文本服务失败，未消耗额度")
    )
)]
pub async fn start_analysis(
    State(state): State<AppState>,
    ClientId(client_id): ClientId,
    Json(req): Json<BirthRequest>,
) -> Result<Json<ApiResponse<AnalysisResponse>>, ApiError> {
    let input = BirthInput::try_from(req)?;
    let outcome = state
        .chat
        .start_analysis(&client_id, &input, EntropyRandom::new())
        .await?;
    Ok(Json(ApiResponse::ok(AnalysisResponse {
        chart: (&outcome.chart).into(),
        destiny: (&outcome.destiny).into(),
        analysis: outcome.analysis,
        usage: outcome.status.into(),
    })))
}

/// 追问
///
/// 未付费时仅会话的第一个问题可免费（每个命盘一次）。空白问题被忽略。
#[utoipa::path(
    post,
    path = "/api/v1/chat/message",
    tag = "对话 (Chat)",
    params(
        ("X-Client-Id" = String, Header, description = "客户端标识")
    ),
    request_body = MessageRequest,
    responses(
        (status = 200, description = "回复完成", body = ApiResponse<MessageResponse>),
        (status = 402, description = "需要付费"),
        (status = 404, description = "没有进行中的解读会话"),
        (status = 429, description = "今日额度已用完"),
        (status = 502, description = "文本服务失败或回复过短，未消耗额度")
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    ClientId(client_id): ClientId,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let response = match state.chat.send_message(&client_id, &req.text).await? {
        Some(outcome) => MessageResponse {
            reply: Some(outcome.reply),
            usage: outcome.status.into(),
        },
        None => MessageResponse {
            reply: None,
            usage: state.quota.status(&client_id).await?.into(),
        },
    };
    Ok(Json(ApiResponse::ok(response)))
}
