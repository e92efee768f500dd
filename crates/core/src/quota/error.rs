use thiserror::Error;

/// # Summary
/// 额度与支付域错误枚举。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuotaError {
    // 当日额度已用尽
    #[error("Daily limit {0} reached")]
    LimitReached(u32),
    // 订单不存在
    #[error("Order not found: {0}")]
    OrderNotFound(String),
    // 请求参数不合法
    #[error("Invalid request: {0}")]
    Invalid(String),
    // 底层存储故障
    #[error("Storage error: {0}")]
    Storage(String),
}
