//! 农历（阴阳合历）月表。
//!
//! 以"岁"为单位排月：从上一个冬至所在月（十一月）起，到本年冬至所在月之前为止。

use crate::astro::{self, local_day, new_moon_on_or_before, new_moon_ut, solar_term_in_year};
use chrono::{Datelike, NaiveDate};
use shenji_core::calendar::entity::LunarDate;
use shenji_core::calendar::error::CalendarError;
use shenji_core::ganzhi::GanZhi;

// 冬至黄经
const WINTER_SOLSTICE: f64 = 270.0;

/// # Summary
/// 一岁之中的单个农历月。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LunarMonth {
    // 朔所在民用日的儒略日数
    pub start: i64,
    pub number: u32,
    pub is_leap: bool,
    // 所属农历年（以正月为界）
    pub lunar_year: i32,
}

/// # Summary
/// 两个冬至之间的月表（12 或 13 个月）。
///
/// # Invariants
/// - `months[0]` 为十一月（含上一个冬至），按起始日严格递增。
/// - `end` 为下一个十一月的起始日，即最后一个月的结束（不含）。
/// - 13 个月时恰有一个闰月：第一个不含中气的月份。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiTable {
    pub months: Vec<LunarMonth>,
    pub end: i64,
}

impl SuiTable {
    /// # Summary
    /// 构建公历 `year` 冬至之前的一岁月表。
    ///
    /// # Logic
    /// 1. 求 `year - 1` 与 `year` 两个冬至所在民用日，各自向前取朔得到两个十一月的起点。
    /// 2. 逐个取朔，得到其间所有月的起点。
    /// 3. 月数为 13 时，第一个区间内没有中气的月份为闰月。
    /// 4. 自十一月起编号，闰月沿用前一个月的序号；正月之前的月份属上一农历年。
    pub fn build(year: i32, offset_hours: f64) -> Result<Self, CalendarError> {
        let ws_prev = local_day(solar_term_in_year(year - 1, WINTER_SOLSTICE)?, offset_hours);
        let ws = local_day(solar_term_in_year(year, WINTER_SOLSTICE)?, offset_hours);
        let (k_first, first_start) = new_moon_on_or_before(ws_prev, offset_hours);
        let (_, end) = new_moon_on_or_before(ws, offset_hours);

        let mut starts = vec![first_start];
        let mut k = k_first;
        loop {
            k += 1.0;
            let start = local_day(new_moon_ut(k), offset_hours);
            if start >= end {
                break;
            }
            starts.push(start);
            if starts.len() > 13 {
                return Err(CalendarError::Search(format!(
                    "more than 13 lunations between solstices of {} and {}",
                    year - 1,
                    year
                )));
            }
        }

        let leap_index = if starts.len() == 13 {
            let zhongqi = principal_terms(year, ws_prev, offset_hours)?;
            (1..starts.len()).find(|i| {
                let lo = starts[*i];
                let hi = starts.get(i + 1).copied().unwrap_or(end);
                !zhongqi.iter().any(|z| (lo..hi).contains(z))
            })
        } else {
            None
        };

        let mut months = Vec::with_capacity(starts.len());
        let mut number = 11;
        let mut reached_new_year = false;
        for (i, start) in starts.iter().enumerate() {
            let is_leap = leap_index == Some(i);
            if i > 0 && !is_leap {
                number = number % 12 + 1;
            }
            if number == 1 && !is_leap {
                reached_new_year = true;
            }
            months.push(LunarMonth {
                start: *start,
                number,
                is_leap,
                lunar_year: if reached_new_year { year } else { year - 1 },
            });
        }

        tracing::debug!(
            year,
            months = months.len(),
            leap = ?leap_index.and_then(|i| months.get(i)).map(|m| m.number),
            "lunar sui table built"
        );
        Ok(Self { months, end })
    }

    /// 查找民用日 `day` 所在的月份及其日序（1 起）
    pub fn locate(&self, day: i64) -> Option<(LunarMonth, u32)> {
        let idx = self.months.iter().rposition(|m| m.start <= day)?;
        let month = self.months[idx];
        let next = self.months.get(idx + 1).map_or(self.end, |m| m.start);
        if day >= next {
            return None;
        }
        let ordinal = u32::try_from(day - month.start + 1).ok()?;
        Some((month, ordinal))
    }
}

/// 一岁之中的 13 个中气（上一个冬至 + 本年大寒至冬至）所在民用日
fn principal_terms(year: i32, ws_prev: i64, offset_hours: f64) -> Result<Vec<i64>, CalendarError> {
    let mut days = vec![ws_prev];
    for i in 0..12_u32 {
        let target = astro::normalize_degrees(300.0 + 30.0 * f64::from(i));
        days.push(local_day(solar_term_in_year(year, target)?, offset_hours));
    }
    Ok(days)
}

/// # Summary
/// 公历日期换算为农历日期。
///
/// # Logic
/// 先取当年冬至前的一岁月表；若日期已过本年十一月初一，则改用下一岁。
pub fn lunar_date(date: NaiveDate, offset_hours: f64) -> Result<LunarDate, CalendarError> {
    let day = astro::day_number(date);
    let mut table = SuiTable::build(date.year(), offset_hours)?;
    if day >= table.end {
        table = SuiTable::build(date.year() + 1, offset_hours)?;
    }
    let (month, ordinal) = table
        .locate(day)
        .ok_or_else(|| CalendarError::Search(format!("{} not covered by lunar table", date)))?;
    Ok(LunarDate {
        year: month.lunar_year,
        year_gan_zhi: GanZhi::for_year(month.lunar_year),
        month: month.number,
        is_leap: month.is_leap,
        day: ordinal,
    })
}
