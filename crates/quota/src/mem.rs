use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use shenji_core::quota::entity::UsageRecord;
use shenji_core::quota::error::QuotaError;
use shenji_core::quota::port::UsageStore;

/// # Summary
/// 基于 DashMap 的内存使用记录存储。
///
/// # Invariants
/// - 所有操作均通过并发哈希表执行，保证多线程安全。
/// - 进程重启即清空，不做任何持久化。
pub struct MemUsageStore {
    // 客户端 -> 最近一次使用记录
    usage: DashMap<String, UsageRecord>,
    // (客户端, 命盘键) 已用首问免费
    freebies: DashSet<(String, String)>,
    // 持有付费提问资格的客户端
    paid: DashSet<String>,
}

impl MemUsageStore {
    pub fn new() -> Self {
        Self {
            usage: DashMap::new(),
            freebies: DashSet::new(),
            paid: DashSet::new(),
        }
    }
}

impl Default for MemUsageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsageStore for MemUsageStore {
    async fn usage(&self, client_id: &str) -> Result<Option<UsageRecord>, QuotaError> {
        Ok(self.usage.get(client_id).map(|r| *r.value()))
    }

    /// 同名客户端的旧记录直接覆盖
    async fn save_usage(&self, client_id: &str, record: UsageRecord) -> Result<(), QuotaError> {
        self.usage.insert(client_id.to_string(), record);
        Ok(())
    }

    async fn is_freebie_used(&self, client_id: &str, chart_key: &str) -> Result<bool, QuotaError> {
        Ok(self
            .freebies
            .contains(&(client_id.to_string(), chart_key.to_string())))
    }

    async fn mark_freebie_used(
        &self,
        client_id: &str,
        chart_key: &str,
    ) -> Result<(), QuotaError> {
        self.freebies
            .insert((client_id.to_string(), chart_key.to_string()));
        Ok(())
    }

    async fn is_paid(&self, client_id: &str) -> Result<bool, QuotaError> {
        Ok(self.paid.contains(client_id))
    }

    /// # Summary
    /// 设置或撤销付费提问资格。
    ///
    /// # Logic
    /// 资格不叠加：连续两次付款只记一次。
    async fn set_paid(&self, client_id: &str, paid: bool) -> Result<(), QuotaError> {
        if paid {
            self.paid.insert(client_id.to_string());
        } else {
            self.paid.remove(client_id);
        }
        Ok(())
    }
}
