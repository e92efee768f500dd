use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 默认每日推演次数上限
pub const DEFAULT_DAILY_LIMIT: u32 = 8;

/// # Summary
/// 某客户端某一天的使用记录。
///
/// # Invariants
/// - `date` 与"今天"不同时视为已过期，计数归零。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub count: u32,
}

/// # Summary
/// 客户端当前付费与额度状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub is_paid: bool,
    pub question_count: u32,
    pub daily_limit: u32,
}

impl PaymentStatus {
    pub fn limit_reached(&self) -> bool {
        self.question_count >= self.daily_limit
    }

    pub fn remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.question_count)
    }
}

/// # Summary
/// 支付渠道。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayMethod {
    Alipay,
    Wechat,
}

impl std::fmt::Display for PayMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayMethod::Alipay => write!(f, "alipay"),
            PayMethod::Wechat => write!(f, "wechat"),
        }
    }
}

impl std::str::FromStr for PayMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "alipay" => Ok(PayMethod::Alipay),
            "wechat" => Ok(PayMethod::Wechat),
            _ => Err(format!("Unknown PayMethod: {}", s)),
        }
    }
}

/// # Summary
/// 订单状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Expired,
}

/// # Summary
/// 演示支付订单。
///
/// # Invariants
/// - `order_id` 全局唯一。
/// - `client_id` 记录下单方，付款成功后为其发放一次付费提问资格。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInfo {
    pub order_id: String,
    pub client_id: String,
    pub method: PayMethod,
    pub amount: f64,
    pub pay_url: String,
    pub status: OrderStatus,
}
