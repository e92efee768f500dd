use crate::calendar::error::CalendarError;
use thiserror::Error;

/// # Summary
/// 排盘域错误枚举，覆盖入参校验与历法换算失败。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    // 出生信息不合法
    #[error("Invalid birth input: {0}")]
    InvalidInput(String),
    // 历法换算失败
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),
}
