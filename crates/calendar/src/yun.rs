//! 起运与大运时间线。

use chrono::{Datelike, Duration, Months, NaiveDateTime, Timelike};
use shenji_core::calendar::entity::{RawDaYun, YunStart};
use shenji_core::calendar::error::CalendarError;
use shenji_core::common::Gender;
use shenji_core::ganzhi::{GanZhi, Stem};

/// 大运步数（含起运前的童限）
pub const DA_YUN_STEPS: usize = 10;

/// 阳男阴女顺排，阴男阳女逆排
pub fn is_forward(year_stem: Stem, gender: Gender) -> bool {
    year_stem.is_yang() == (gender == Gender::Male)
}

// 起运换算专用的时辰序：23 点记为亥末而非次日子时
fn watch_index(at: NaiveDateTime) -> i64 {
    let hour = at.hour();
    if hour == 23 {
        11
    } else {
        i64::from((hour + 1) / 2)
    }
}

/// # Summary
/// 计算起运时刻。
///
/// # Logic
/// 1. 顺排取出生至下一个节，逆排取上一个节至出生。
/// 2. 按"三天折一年、一天折四个月、一个时辰折十天"把间隔的日数与时辰数换算为年、月、日。
/// 3. 出生时刻依次加上年、月、日即为起运时刻。
///
/// # Arguments
/// * `birth`: 出生民用时刻。
/// * `jie`: 相邻节令的民用时刻（顺排为下一个节，逆排为上一个节）。
/// * `forward`: 是否顺排。
///
/// # Returns
/// 成功返回 `YunStart`，日期越界返回 `CalendarError::InvalidDate`。
pub fn yun_start(
    birth: NaiveDateTime,
    jie: NaiveDateTime,
    forward: bool,
) -> Result<YunStart, CalendarError> {
    let (start, end) = if forward { (birth, jie) } else { (jie, birth) };

    let mut day_diff = (end.date() - start.date()).num_days();
    let mut watch_diff = watch_index(end) - watch_index(start);
    if watch_diff < 0 {
        watch_diff += 12;
        day_diff -= 1;
    }
    let month_from_watch = watch_diff * 10 / 30;
    let total_months = day_diff * 4 + month_from_watch;
    let days = watch_diff * 10 - month_from_watch * 30;
    let years = total_months / 12;
    let months = total_months - years * 12;

    let to_u32 = |v: i64| {
        u32::try_from(v).map_err(|_| CalendarError::InvalidDate(format!("negative yun offset {}", v)))
    };
    let (years, months, days) = (to_u32(years)?, to_u32(months)?, to_u32(days)?);

    let start_at = birth
        .checked_add_months(Months::new(years * 12 + months))
        .and_then(|t| t.checked_add_signed(Duration::days(i64::from(days))))
        .ok_or_else(|| CalendarError::InvalidDate(format!("yun start overflow from {}", birth)))?;

    Ok(YunStart {
        forward,
        years,
        months,
        days,
        start: start_at,
    })
}

/// # Summary
/// 生成十步大运原始时间线。
///
/// # Logic
/// 1. 第 0 步为童限：虚岁 1 起，自出生年至起运前一年，无干支。
/// 2. 第 i 步（1..=9）自起运年 + (i-1)*10 起，持续十年，干支为月柱按顺逆偏移 i 位。
pub fn da_yun_timeline(birth_year: i32, month: GanZhi, yun: &YunStart) -> Vec<RawDaYun> {
    let yun_year = yun.start.year();
    let step = if yun.forward { 1 } else { -1 };
    let mut timeline = Vec::with_capacity(DA_YUN_STEPS);
    timeline.push(RawDaYun {
        gan_zhi: None,
        start_age: 1,
        start_year: birth_year,
        end_year: yun_year - 1,
    });
    for i in 1..DA_YUN_STEPS {
        let offset = i32::try_from(i).unwrap_or(0);
        let start_year = yun_year + (offset - 1) * 10;
        let start_age = u32::try_from(start_year - birth_year + 1).unwrap_or(1);
        timeline.push(RawDaYun {
            gan_zhi: Some(month.offset(i64::from(step * offset))),
            start_age,
            start_year,
            end_year: start_year + 9,
        });
    }
    timeline
}
