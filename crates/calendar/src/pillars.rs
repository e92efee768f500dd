//! 四柱干支。年、月以节令为界，日柱按儒略日数循环，时柱按五鼠遁。

use crate::astro::{day_number, normalize_degrees};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use shenji_core::ganzhi::{Branch, GanZhi, Stem};

// 立春黄经，寅月起点
const LICHUN: f64 = 315.0;

/// # Summary
/// 节令月序：寅月为 0，丑月为 11。
///
/// # Logic
/// 自立春（315 度）起每 30 度为一个节令月。
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn solar_month_index(longitude: f64) -> usize {
    let idx = (normalize_degrees(longitude - LICHUN) / 30.0).floor() as usize;
    idx.min(11)
}

/// # Summary
/// 年柱：立春前仍属上一年。
///
/// # Logic
/// 公历 1、2 月且处于子月或丑月（月序 10、11）时，干支年取上一年。
pub fn year_pillar(solar_year: i32, solar_month: u32, month_index: usize) -> GanZhi {
    let year = if solar_month <= 2 && month_index >= 10 {
        solar_year - 1
    } else {
        solar_year
    };
    GanZhi::for_year(year)
}

/// # Summary
/// 月柱：地支由节令月序决定，天干按五虎遁由年干推出。
///
/// # Logic
/// 甲己之年丙作首，即寅月天干 = (年干 mod 5) * 2 + 2。
pub fn month_pillar(year_stem: Stem, month_index: usize) -> GanZhi {
    GanZhi {
        stem: Stem::from_index((year_stem.index() % 5) * 2 + 2 + month_index),
        branch: Branch::from_index(2 + month_index),
    }
}

/// 日柱：2000-01-01 为戊午
pub fn day_pillar(date: NaiveDate) -> GanZhi {
    GanZhi::from_cycle(day_number(date) + 49)
}

/// # Summary
/// 时柱。
///
/// # Logic
/// 1. 23 点与 0 点为子时，此后每两小时一个时辰。
/// 2. 天干按五鼠遁由日干推出；23 点的晚子时取次日日干，日柱本身不进位。
pub fn hour_pillar(at: NaiveDateTime) -> GanZhi {
    let hour = at.hour();
    let branch_index = usize::try_from((hour + 1) / 2).unwrap_or(0) % 12;
    let day_stem = if hour == 23 {
        at.date()
            .succ_opt()
            .map_or_else(|| day_pillar(at.date()).offset(1), day_pillar)
            .stem
    } else {
        day_pillar(at.date()).stem
    };
    GanZhi {
        stem: Stem::from_index((day_stem.index() % 5) * 2 + branch_index),
        branch: Branch::from_index(branch_index),
    }
}
