use crate::ganzhi::GanZhi;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const DIGITS: [char; 10] = ['〇', '一', '二', '三', '四', '五', '六', '七', '八', '九'];
const MONTH_NAMES: [&str; 12] = [
    "正", "二", "三", "四", "五", "六", "七", "八", "九", "十", "冬", "腊",
];
const DAY_TENS: [&str; 4] = ["初", "十", "廿", "三"];
const DAY_UNITS: [&str; 10] = ["十", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

/// # Summary
/// 农历日期实体。
///
/// # Invariants
/// - `month` 取值 1..=12，闰月以 `is_leap` 标记，月序号与其前一个正月份相同。
/// - `day` 取值 1..=30。
/// - `year` 为农历年（以正月初一为界），`year_gan_zhi` 为该农历年的干支。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunarDate {
    pub year: i32,
    pub year_gan_zhi: GanZhi,
    pub month: u32,
    pub is_leap: bool,
    pub day: u32,
}

impl LunarDate {
    /// 月份中文名，例如 "闰四"、"腊"
    pub fn month_name(&self) -> String {
        let idx = usize::try_from(self.month.saturating_sub(1)).unwrap_or(0) % 12;
        let prefix = if self.is_leap { "闰" } else { "" };
        format!("{}{}", prefix, MONTH_NAMES[idx])
    }

    /// 日期中文名，例如 "初一"、"廿九"、"三十"
    pub fn day_name(&self) -> String {
        let day = usize::try_from(self.day).unwrap_or(1);
        match day {
            10 => "初十".to_string(),
            20 => "二十".to_string(),
            30 => "三十".to_string(),
            _ => format!("{}{}", DAY_TENS[(day / 10) % 4], DAY_UNITS[day % 10]),
        }
    }
}

impl std::fmt::Display for LunarDate {
    /// 例如 `一九九〇年正月初五`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let year: String = self
            .year
            .to_string()
            .chars()
            .map(|c| {
                c.to_digit(10)
                    .and_then(|d| usize::try_from(d).ok())
                    .map_or(c, |d| DIGITS[d])
            })
            .collect();
        write!(f, "{}年{}月{}", year, self.month_name(), self.day_name())
    }
}

/// # Summary
/// 历法服务给出的单步大运原始数据。
///
/// # Invariants
/// - `gan_zhi` 为 `None` 表示起运之前的童限区间（或上游未能给出标签）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDaYun {
    pub gan_zhi: Option<GanZhi>,
    // 起始虚岁
    pub start_age: u32,
    pub start_year: i32,
    pub end_year: i32,
}

/// # Summary
/// 起运信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YunStart {
    // 是否顺排
    pub forward: bool,
    // 出生后多少年、月、日起运
    pub years: u32,
    pub months: u32,
    pub days: u32,
    // 起运的公历时刻
    pub start: NaiveDateTime,
}

/// # Summary
/// 四柱八字原始换算结果。
///
/// # Invariants
/// - 年柱以立春为界，月柱以节令为界。
/// - `da_yun` 按起始虚岁非降序排列。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EightChar {
    pub year: GanZhi,
    pub month: GanZhi,
    pub day: GanZhi,
    pub hour: GanZhi,
    pub lunar: LunarDate,
    pub yun: YunStart,
    pub da_yun: Vec<RawDaYun>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lunar_date_rendering() {
        let d = LunarDate {
            year: 1990,
            year_gan_zhi: GanZhi::for_year(1990),
            month: 1,
            is_leap: false,
            day: 5,
        };
        assert_eq!(d.to_string(), "一九九〇年正月初五");

        let leap = LunarDate {
            month: 4,
            is_leap: true,
            day: 21,
            ..d
        };
        assert_eq!(leap.to_string(), "一九九〇年闰四月廿一");

        let end = LunarDate {
            month: 12,
            day: 30,
            ..d
        };
        assert_eq!(end.month_name(), "腊");
        assert_eq!(end.day_name(), "三十");
        assert_eq!(LunarDate { day: 10, ..d }.day_name(), "初十");
        assert_eq!(LunarDate { day: 19, ..d }.day_name(), "十九");
    }
}
