//! # `shenji-calendar` - 天文历法适配器
//!
//! 以低精度太阳理论与朔望修正项自行推算节气、朔日，
//! 在此基础上给出农历日期、四柱与大运时间线，实现 `CalendarPort`。

pub mod astro;
pub mod lunar;
pub mod pillars;
pub mod provider;
pub mod yun;

pub use provider::AstroCalendar;
