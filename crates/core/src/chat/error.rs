use crate::chart::error::ChartError;
use crate::quota::error::QuotaError;
use thiserror::Error;

/// # Summary
/// 对话域错误枚举，涵盖额度闸门与上游文本服务故障。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    // 当日额度已用尽
    #[error("今日推演额度已用完")]
    LimitReached,
    // 需要付费才能继续提问
    #[error("需要付费后才能继续提问")]
    PaymentRequired,
    // 当前客户端没有进行中的推演会话
    #[error("No active session for client {0}")]
    NoSession(String),
    // 排盘失败
    #[error(transparent)]
    Chart(#[from] ChartError),
    // 上游返回为空或过短，本次不消耗额度
    #[error("Incomplete reply: {0}")]
    Incomplete(String),
    // 网络层错误
    #[error("Network error: {0}")]
    Network(String),
    // 上游协议 / 数据解析错误
    #[error("Protocol error: {0}")]
    Protocol(String),
    // 额度存储故障
    #[error("Quota error: {0}")]
    Quota(String),
}

impl From<QuotaError> for ChatError {
    fn from(e: QuotaError) -> Self {
        match e {
            QuotaError::LimitReached(_) => ChatError::LimitReached,
            other => ChatError::Quota(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_limit_maps_to_chat_limit() {
        assert_eq!(ChatError::from(QuotaError::LimitReached(8)), ChatError::LimitReached);
        assert!(matches!(
            ChatError::from(QuotaError::Storage("down".into())),
            ChatError::Quota(_)
        ));
    }
}
