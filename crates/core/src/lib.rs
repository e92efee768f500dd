//! # `shenji-core` - 领域核心
//!
//! 定义干支、五行等固定枚举与查表数据，命盘 / 人生 K 线 / 对话 / 额度各领域的实体、
//! 端口 (Port) 与错误类型。本 crate 不依赖任何具体适配器实现。

pub mod calendar;
pub mod chart;
pub mod chat;
pub mod common;
pub mod config;
pub mod fortune;
pub mod ganzhi;
pub mod quota;

#[cfg(feature = "test-utils")]
pub mod testing;
