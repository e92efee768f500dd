use async_trait::async_trait;
use dashmap::DashMap;
use shenji_core::common::time::TimeProvider;
use shenji_core::quota::entity::{OrderInfo, OrderStatus, PayMethod};
use shenji_core::quota::error::QuotaError;
use shenji_core::quota::port::{PaymentGateway, UsageStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

const PAY_URL_BASE: &str = "https://example.com/pay-mock";

/// # Summary
/// 演示支付网关：不对接任何真实渠道，不校验签名。
///
/// # Invariants
/// - 已知订单在首次查询时即视为已付款，并为下单客户端发放一次付费提问资格。
/// - 同一订单只发放一次资格，重复轮询不会叠加。
/// - 自动生成的订单号形如 `DEMO_<毫秒时间戳>`，同一毫秒内顺延保证唯一。
pub struct MockPaymentGateway {
    orders: DashMap<String, OrderInfo>,
    store: Arc<dyn UsageStore>,
    clock: Arc<dyn TimeProvider>,
    last_id: AtomicI64,
}

impl MockPaymentGateway {
    pub fn new(store: Arc<dyn UsageStore>, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            orders: DashMap::new(),
            store,
            clock,
            last_id: AtomicI64::new(0),
        }
    }

    fn next_order_id(&self) -> String {
        let millis = self.clock.now().timestamp_millis();
        let prev = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(millis.max(last + 1))
            })
            .unwrap_or(millis);
        format!("DEMO_{}", millis.max(prev + 1))
    }

    /// # Summary
    /// 把订单置为已付款。
    ///
    /// # Logic
    /// 仅在 `Pending -> Paid` 的跃迁上发放付费资格。
    async fn settle(&self, order_id: &str) -> Result<OrderInfo, QuotaError> {
        let (order, newly_paid) = {
            let mut entry = self
                .orders
                .get_mut(order_id)
                .ok_or_else(|| QuotaError::OrderNotFound(order_id.to_string()))?;
            let newly_paid = entry.status == OrderStatus::Pending;
            if newly_paid {
                entry.status = OrderStatus::Paid;
            }
            (entry.clone(), newly_paid)
        };
        if newly_paid {
            self.store.set_paid(&order.client_id, true).await?;
            tracing::info!(order_id, client_id = %order.client_id, "mock order paid");
        }
        Ok(order)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(
        &self,
        client_id: &str,
        method: PayMethod,
        amount: f64,
        order_id: Option<String>,
    ) -> Result<OrderInfo, QuotaError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(QuotaError::Invalid(format!("amount {} must be positive", amount)));
        }
        let order_id = match order_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => self.next_order_id(),
        };
        let order = OrderInfo {
            pay_url: format!("{}?order={}&method={}", PAY_URL_BASE, order_id, method),
            order_id: order_id.clone(),
            client_id: client_id.to_string(),
            method,
            amount,
            status: OrderStatus::Pending,
        };
        self.orders.insert(order_id, order.clone());
        tracing::info!(order_id = %order.order_id, %method, amount, "mock order created");
        Ok(order)
    }

    async fn order_status(&self, order_id: &str) -> Result<OrderInfo, QuotaError> {
        self.settle(order_id).await
    }

    /// # Summary
    /// 渠道回调。
    ///
    /// # Logic
    /// 回调中带有已知的 `order_id` 或 `out_trade_no` 时结算该订单；
    /// 无论内容如何都应答 `success`。
    async fn notify(&self, payload: serde_json::Value) -> Result<String, QuotaError> {
        let order_id = payload
            .get("order_id")
            .or_else(|| payload.get("out_trade_no"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        match order_id {
            Some(id) if self.orders.contains_key(&id) => {
                self.settle(&id).await?;
            }
            _ => tracing::debug!(%payload, "mock notify without known order"),
        }
        Ok("success".to_string())
    }
}
