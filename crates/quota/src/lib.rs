//! # `shenji-quota` - 额度与演示支付
//!
//! 每日使用计数、命盘首问免费登记、付费提问资格，全部保存在进程内存中。

pub mod mem;
pub mod payment;
pub mod service;

pub use mem::MemUsageStore;
pub use payment::MockPaymentGateway;
pub use service::QuotaService;
