use chrono::{FixedOffset, NaiveDate};
use shenji_core::common::time::TimeProvider;
use shenji_core::quota::entity::{PaymentStatus, UsageRecord};
use shenji_core::quota::error::QuotaError;
use shenji_core::quota::port::UsageStore;
use std::sync::Arc;

/// # Summary
/// 额度服务：每日计数、首问免费与付费资格的统一入口。
///
/// # Invariants
/// - "今天"由注入的时钟按配置时区换算，日期变化后计数视为 0。
/// - 计数只在调用方确认一次成功的生成后才增加。
pub struct QuotaService {
    store: Arc<dyn UsageStore>,
    clock: Arc<dyn TimeProvider>,
    offset: FixedOffset,
    daily_limit: u32,
}

impl QuotaService {
    pub fn new(
        store: Arc<dyn UsageStore>,
        clock: Arc<dyn TimeProvider>,
        offset: FixedOffset,
        daily_limit: u32,
    ) -> Self {
        Self {
            store,
            clock,
            offset,
            daily_limit,
        }
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.offset).date_naive()
    }

    async fn count_today(&self, client_id: &str) -> Result<u32, QuotaError> {
        let today = self.today();
        Ok(self
            .store
            .usage(client_id)
            .await?
            .filter(|r| r.date == today)
            .map_or(0, |r| r.count))
    }

    /// 当前付费与额度状态
    pub async fn status(&self, client_id: &str) -> Result<PaymentStatus, QuotaError> {
        Ok(PaymentStatus {
            is_paid: self.store.is_paid(client_id).await?,
            question_count: self.count_today(client_id).await?,
            daily_limit: self.daily_limit,
        })
    }

    /// # Summary
    /// 生成前的额度检查。
    ///
    /// # Returns
    /// 额度未满返回当前状态，否则返回 `QuotaError::LimitReached`。
    pub async fn ensure_available(&self, client_id: &str) -> Result<PaymentStatus, QuotaError> {
        let status = self.status(client_id).await?;
        if status.limit_reached() {
            tracing::warn!(client_id, count = status.question_count, "daily limit reached");
            return Err(QuotaError::LimitReached(self.daily_limit));
        }
        Ok(status)
    }

    /// # Summary
    /// 记一次成功使用。
    ///
    /// # Logic
    /// 存储中的日期不是今天时，从 0 重新计数。
    pub async fn record_use(&self, client_id: &str) -> Result<UsageRecord, QuotaError> {
        let record = UsageRecord {
            date: self.today(),
            count: self.count_today(client_id).await? + 1,
        };
        self.store.save_usage(client_id, record).await?;
        tracing::debug!(client_id, count = record.count, "usage recorded");
        Ok(record)
    }

    /// 该命盘的首问免费是否仍可用
    pub async fn freebie_available(
        &self,
        client_id: &str,
        chart_key: &str,
    ) -> Result<bool, QuotaError> {
        Ok(!self.store.is_freebie_used(client_id, chart_key).await?)
    }

    pub async fn mark_freebie_used(&self, client_id: &str, chart_key: &str) -> Result<(), QuotaError> {
        self.store.mark_freebie_used(client_id, chart_key).await
    }

    pub async fn is_paid(&self, client_id: &str) -> Result<bool, QuotaError> {
        self.store.is_paid(client_id).await
    }

    /// 发放一次付费提问资格
    pub async fn grant_ticket(&self, client_id: &str) -> Result<(), QuotaError> {
        tracing::info!(client_id, "paid ticket granted");
        self.store.set_paid(client_id, true).await
    }

    /// 消耗付费提问资格
    pub async fn consume_ticket(&self, client_id: &str) -> Result<(), QuotaError> {
        self.store.set_paid(client_id, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::MemUsageStore;
    use chrono::{TimeZone, Utc};
    use shenji_core::common::time::FakeClockProvider;

    fn setup(limit: u32) -> (QuotaService, Arc<FakeClockProvider>) {
        // 北京时间 2026-03-01 23:00
        let clock = Arc::new(FakeClockProvider::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 15, 0, 0).unwrap(),
        ));
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let service = QuotaService::new(
            Arc::new(MemUsageStore::new()),
            clock.clone(),
            offset,
            limit,
        );
        (service, clock)
    }

    #[tokio::test]
    async fn test_limit_reached_after_daily_uses() {
        let (svc, _) = setup(2);
        svc.ensure_available("c1").await.unwrap();
        svc.record_use("c1").await.unwrap();
        svc.record_use("c1").await.unwrap();

        let status = svc.status("c1").await.unwrap();
        assert_eq!((status.question_count, status.remaining()), (2, 0));
        assert_eq!(
            svc.ensure_available("c1").await,
            Err(QuotaError::LimitReached(2))
        );
        // 其他客户端不受影响
        assert!(svc.ensure_available("c2").await.is_ok());
    }

    #[tokio::test]
    async fn test_counter_resets_on_local_midnight() {
        let (svc, clock) = setup(2);
        svc.record_use("c1").await.unwrap();
        svc.record_use("c1").await.unwrap();
        assert!(svc.ensure_available("c1").await.is_err());

        // 北京时间跨入 3 月 2 日，UTC 仍是 3 月 1 日
        clock.advance(chrono::Duration::hours(1));
        assert_eq!(svc.status("c1").await.unwrap().question_count, 0);
        let record = svc.record_use("c1").await.unwrap();
        assert_eq!(record.count, 1);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }

    #[tokio::test]
    async fn test_ticket_and_freebie() {
        let (svc, _) = setup(8);
        assert!(!svc.status("c1").await.unwrap().is_paid);
        svc.grant_ticket("c1").await.unwrap();
        assert!(svc.is_paid("c1").await.unwrap());
        svc.consume_ticket("c1").await.unwrap();
        assert!(!svc.is_paid("c1").await.unwrap());

        assert!(svc.freebie_available("c1", "k").await.unwrap());
        svc.mark_freebie_used("c1", "k").await.unwrap();
        assert!(!svc.freebie_available("c1", "k").await.unwrap());
    }
}
