use crate::calendar::entity::{EightChar, LunarDate};
use crate::calendar::error::CalendarError;
use crate::common::Gender;
use crate::ganzhi::{Branch, GanZhi};
use chrono::{FixedOffset, NaiveDateTime};

/// # Summary
/// 公历 / 农历换算能力接口 (Port)。
///
/// # Invariants
/// - 所有 `NaiveDateTime` 入参均为 `utc_offset()` 所指时区的民用时间。
/// - 实现必须是纯函数式的：同一输入总是返回同一结果。
pub trait CalendarPort: Send + Sync {
    /// # Summary
    /// 公历时刻换算为农历日期。
    ///
    /// # Arguments
    /// * `at`: 民用时刻。
    ///
    /// # Returns
    /// 成功返回农历日期，超出支持区间返回 `CalendarError::OutOfRange`。
    fn solar_to_lunar(&self, at: NaiveDateTime) -> Result<LunarDate, CalendarError>;

    /// # Summary
    /// 排四柱八字并生成大运时间线。
    ///
    /// # Logic
    /// 1. 按节令确定年柱、月柱，按日序确定日柱，按时辰确定时柱。
    /// 2. 依性别与年干阴阳确定顺逆，计算起运时刻。
    /// 3. 生成第 0 步（童限，无干支）及其后九步大运。
    ///
    /// # Arguments
    /// * `at`: 出生民用时刻。
    /// * `gender`: 性别。
    ///
    /// # Returns
    /// 成功返回 `EightChar`。
    fn eight_char(&self, at: NaiveDateTime, gender: Gender) -> Result<EightChar, CalendarError>;

    /// 农历年份对应的年干支
    fn lunar_year_gan_zhi(&self, lunar_year: i32) -> GanZhi {
        GanZhi::for_year(lunar_year)
    }

    /// 钟点（0..=23）对应的时辰地支：23、0 点为子，1、2 点为丑，依此类推
    fn branch_for_hour(&self, hour: u32) -> Branch {
        let idx = usize::try_from((hour + 1) / 2).unwrap_or(0);
        Branch::from_index(idx)
    }

    /// 换算所采用的民用时区
    fn utc_offset(&self) -> FixedOffset;
}
