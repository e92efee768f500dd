use crate::quota::entity::{OrderInfo, PayMethod, UsageRecord};
use crate::quota::error::QuotaError;
use async_trait::async_trait;

/// # Summary
/// 客户端使用记录存储接口（仅本地计数，不做持久化以外的任何用途）。
///
/// # Invariants
/// - 以不透明的客户端标识区分调用方，不涉及鉴权。
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// 读取客户端最近一次的使用记录
    async fn usage(&self, client_id: &str) -> Result<Option<UsageRecord>, QuotaError>;

    /// 覆盖写入使用记录
    async fn save_usage(&self, client_id: &str, record: UsageRecord) -> Result<(), QuotaError>;

    /// 查询某命盘的首问免费资格是否已用
    async fn is_freebie_used(&self, client_id: &str, chart_key: &str) -> Result<bool, QuotaError>;

    /// 登记某命盘的首问免费资格已用
    async fn mark_freebie_used(&self, client_id: &str, chart_key: &str)
    -> Result<(), QuotaError>;

    /// 查询是否持有一次付费提问资格
    async fn is_paid(&self, client_id: &str) -> Result<bool, QuotaError>;

    /// 设置付费提问资格
    async fn set_paid(&self, client_id: &str, paid: bool) -> Result<(), QuotaError>;
}

/// # Summary
/// 支付网关接口。当前仅有演示实现，不对接真实渠道。
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// # Summary
    /// 创建支付订单。
    ///
    /// # Arguments
    /// * `client_id`: 下单客户端。
    /// * `method`: 支付渠道。
    /// * `amount`: 金额（元）。
    /// * `order_id`: 调用方指定的订单号，缺省时由网关生成。
    ///
    /// # Returns
    /// 成功返回处于 `Pending` 状态的订单。
    async fn create_order(
        &self,
        client_id: &str,
        method: PayMethod,
        amount: f64,
        order_id: Option<String>,
    ) -> Result<OrderInfo, QuotaError>;

    /// 查询订单当前状态
    async fn order_status(&self, order_id: &str) -> Result<OrderInfo, QuotaError>;

    /// 处理渠道异步回调，返回需回写给渠道的应答文本
    async fn notify(&self, payload: serde_json::Value) -> Result<String, QuotaError>;
}
