use thiserror::Error;

/// # Summary
/// 历法换算域错误枚举。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    // 公历日期或时刻本身不合法 (例如 2 月 30 日)
    #[error("Invalid solar date: {0}")]
    InvalidDate(String),
    // 年份超出支持的换算区间
    #[error("Year {year} out of supported range {min}..={max}")]
    OutOfRange { year: i32, min: i32, max: i32 },
    // 天文迭代求解未收敛或结果异常
    #[error("Astronomical search failed: {0}")]
    Search(String),
}
