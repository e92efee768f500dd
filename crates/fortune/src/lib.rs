//! # `shenji-fortune` - 命盘推演
//!
//! 排盘、日主强弱、梅花起卦与人生 K 线合成。
//! 历法、时钟与随机数均经由 `shenji-core` 中的接口注入。

pub mod chart;
pub mod divination;
pub mod element;
pub mod kline;
pub mod prompt;
pub mod service;

pub use service::FortuneService;
