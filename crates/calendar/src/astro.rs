//! 太阳视黄经、节气时刻与朔日时刻。
//!
//! 全部以儒略日（浮点）表示时刻：带 `_ut` 后缀的为世界时，其余为力学时。
//! 精度目标：节气误差约一刻钟，朔日误差在分钟级，足以确定民用日期。
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use shenji_core::calendar::error::CalendarError;

const J2000: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
// 公元 1 年 1 月 1 日（前推格里历）的儒略日数减一
const CE_DAY_OFFSET: i64 = 1_721_425;
pub const TROPICAL_YEAR: f64 = 365.242_2;
pub const SYNODIC_MONTH: f64 = 29.530_588_861;
// 2000 年 1 月 6 日的平朔，Meeus 朔望序号 k = 0
const NEW_MOON_EPOCH: f64 = 2_451_550.097_66;
const MAX_ITERATIONS: usize = 40;

/// 角度归一到 `[0, 360)`
pub fn normalize_degrees(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// 角度归一到 `[-180, 180)`
pub fn signed_degrees(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

/// 格里历日期的儒略日数（该日正午）
pub fn day_number(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) + CE_DAY_OFFSET
}

/// UTC 时刻转儒略日
pub fn julian_day(utc: NaiveDateTime) -> f64 {
    let ts = utc.and_utc().timestamp();
    UNIX_EPOCH_JD + ts as f64 / 86_400.0
}

/// 儒略日转 UTC 时刻（精确到秒）
pub fn from_julian_day(jd: f64) -> Option<NaiveDateTime> {
    let secs = ((jd - UNIX_EPOCH_JD) * 86_400.0).round() as i64;
    DateTime::from_timestamp(secs, 0).map(|d| d.naive_utc())
}

/// # Summary
/// 某世界时时刻在给定时区下所处民用日的儒略日数。
pub fn local_day(jd_ut: f64, offset_hours: f64) -> i64 {
    (jd_ut + 0.5 + offset_hours / 24.0).floor() as i64
}

/// # Summary
/// ΔT = TT − UT（秒）。
///
/// # Logic
/// 采用 Espenak & Meeus 分段多项式，覆盖 1860..2150，区间外用长期抛物线。
pub fn delta_t_seconds(year: f64) -> f64 {
    if (1860.0..1900.0).contains(&year) {
        let t = year - 1860.0;
        7.62 + 0.5737 * t - 0.251_754 * t.powi(2) + 0.016_806_68 * t.powi(3)
            - 0.000_447_362_4 * t.powi(4)
            + t.powi(5) / 233_174.0
    } else if (1900.0..1920.0).contains(&year) {
        let t = year - 1900.0;
        -2.79 + 1.494_119 * t - 0.059_893_9 * t.powi(2) + 0.006_196_6 * t.powi(3)
            - 0.000_197 * t.powi(4)
    } else if (1920.0..1941.0).contains(&year) {
        let t = year - 1920.0;
        21.20 + 0.844_93 * t - 0.076_100 * t.powi(2) + 0.002_093_6 * t.powi(3)
    } else if (1941.0..1961.0).contains(&year) {
        let t = year - 1950.0;
        29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
    } else if (1961.0..1986.0).contains(&year) {
        let t = year - 1975.0;
        45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
    } else if (1986.0..2005.0).contains(&year) {
        let t = year - 2000.0;
        63.86 + 0.3345 * t - 0.060_374 * t.powi(2)
            + 0.001_727_5 * t.powi(3)
            + 0.000_651_814 * t.powi(4)
            + 0.000_023_735_99 * t.powi(5)
    } else if (2005.0..2050.0).contains(&year) {
        let t = year - 2000.0;
        62.92 + 0.322_17 * t + 0.005_589 * t.powi(2)
    } else if (2050.0..2150.0).contains(&year) {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u.powi(2) - 0.5628 * (2150.0 - year)
    } else {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u.powi(2)
    }
}

fn delta_t_days(jd: f64) -> f64 {
    let year = 2000.0 + (jd - J2000) / 365.25;
    delta_t_seconds(year) / 86_400.0
}

/// # Summary
/// 太阳视黄经（度，`[0, 360)`），输入为力学时儒略日。
///
/// # Logic
/// 平黄经 + 中心差，再做章动与光行差的简化修正。
pub fn solar_longitude(jde: f64) -> f64 {
    let t = (jde - J2000) / 36_525.0;
    let l0 = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let m = (357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t).to_radians();
    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * m.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * m).sin()
        + 0.000_289 * (3.0 * m).sin();
    let omega = (125.04 - 1_934.136 * t).to_radians();
    normalize_degrees(l0 + c - 0.005_69 - 0.004_78 * omega.sin())
}

/// 世界时儒略日对应的太阳视黄经
pub fn solar_longitude_ut(jd_ut: f64) -> f64 {
    solar_longitude(jd_ut + delta_t_days(jd_ut))
}

/// # Summary
/// 从 `guess_ut` 附近求太阳视黄经等于 `target` 的世界时时刻。
///
/// # Logic
/// 以平均角速度作为斜率反复修正，直到残差小于 1e-7 度。
///
/// # Returns
/// 收敛返回世界时儒略日，否则返回 `CalendarError::Search`。
pub fn solve_longitude(target: f64, guess_ut: f64) -> Result<f64, CalendarError> {
    let mut jd = guess_ut;
    for _ in 0..MAX_ITERATIONS {
        let diff = signed_degrees(target - solar_longitude_ut(jd));
        jd += diff * TROPICAL_YEAR / 360.0;
        if diff.abs() < 1e-7 {
            return Ok(jd);
        }
    }
    Err(CalendarError::Search(format!(
        "solar longitude {} near JD {:.1} did not converge",
        target, guess_ut
    )))
}

/// # Summary
/// 某公历年内太阳到达黄经 `target` 的世界时时刻。
///
/// # Logic
/// 黄经 270 度（冬至）落在当年 12 月，285..360 度落在当年 1..3 月，
/// 以春分为锚点按平均速度估算初值后迭代。初值区间取春分前 75 度至后 285 度。
pub fn solar_term_in_year(year: i32, target: f64) -> Result<f64, CalendarError> {
    let anchor = NaiveDate::from_ymd_opt(year, 3, 20)
        .ok_or_else(|| CalendarError::InvalidDate(format!("{}-03-20", year)))?;
    let equinox_guess = day_number(anchor) as f64;
    let from_equinox = (normalize_degrees(target) + 75.0).rem_euclid(360.0) - 75.0;
    solve_longitude(target, equinox_guess + from_equinox * TROPICAL_YEAR / 360.0)
}

/// # Summary
/// 第 `k` 个朔（以 2000 年 1 月首朔为 0）的力学时儒略日。
///
/// # Logic
/// Meeus《天文算法》第 49 章：平朔 + 25 项周期修正 + 14 项行星摄动修正。
pub fn new_moon(k: f64) -> f64 {
    let t = k / 1_236.85;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let mut jde = NEW_MOON_EPOCH + SYNODIC_MONTH * k + 0.000_154_37 * t2 - 0.000_000_150 * t3
        + 0.000_000_000_73 * t4;

    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;
    let m = (2.5534 + 29.105_356_70 * k - 0.000_001_4 * t2 - 0.000_000_11 * t3).to_radians();
    let mp = (201.5643 + 385.816_935_28 * k + 0.010_758_2 * t2 + 0.000_012_38 * t3
        - 0.000_000_058 * t4)
        .to_radians();
    let f = (160.7108 + 390.670_502_84 * k - 0.001_611_8 * t2 - 0.000_002_27 * t3
        + 0.000_000_011 * t4)
        .to_radians();
    let om = (124.7746 - 1.563_755_88 * k + 0.002_067_2 * t2 + 0.000_002_15 * t3).to_radians();

    jde += -0.407_20 * mp.sin()
        + 0.172_41 * e * m.sin()
        + 0.016_08 * (2.0 * mp).sin()
        + 0.010_39 * (2.0 * f).sin()
        + 0.007_39 * e * (mp - m).sin()
        - 0.005_14 * e * (mp + m).sin()
        + 0.002_08 * e * e * (2.0 * m).sin()
        - 0.001_11 * (mp - 2.0 * f).sin()
        - 0.000_57 * (mp + 2.0 * f).sin()
        + 0.000_56 * e * (2.0 * mp + m).sin()
        - 0.000_42 * (3.0 * mp).sin()
        + 0.000_42 * e * (m + 2.0 * f).sin()
        + 0.000_38 * e * (m - 2.0 * f).sin()
        - 0.000_24 * e * (2.0 * mp - m).sin()
        - 0.000_17 * om.sin()
        - 0.000_07 * (mp + 2.0 * m).sin()
        + 0.000_04 * (2.0 * mp - 2.0 * f).sin()
        + 0.000_04 * (3.0 * m).sin()
        + 0.000_03 * (mp + m - 2.0 * f).sin()
        + 0.000_03 * (2.0 * mp + 2.0 * f).sin()
        - 0.000_03 * (mp + m + 2.0 * f).sin()
        + 0.000_03 * (mp - m + 2.0 * f).sin()
        - 0.000_02 * (mp - m - 2.0 * f).sin()
        - 0.000_02 * (3.0 * mp + m).sin()
        + 0.000_02 * (4.0 * mp).sin();

    // 行星摄动 (系数, 常数项, k 系数)
    const PLANETARY: [(f64, f64, f64); 14] = [
        (0.000_325, 299.77, 0.107_408),
        (0.000_165, 251.88, 0.016_321),
        (0.000_164, 251.83, 26.651_886),
        (0.000_126, 349.42, 36.412_478),
        (0.000_110, 84.66, 18.206_239),
        (0.000_062, 141.74, 53.303_771),
        (0.000_060, 207.14, 2.453_732),
        (0.000_056, 154.84, 7.306_860),
        (0.000_047, 34.52, 27.261_239),
        (0.000_042, 207.19, 0.121_824),
        (0.000_040, 291.34, 1.844_379),
        (0.000_037, 161.72, 24.198_154),
        (0.000_035, 239.56, 25.513_099),
        (0.000_023, 331.55, 3.592_518),
    ];
    for (i, (coef, base, rate)) in PLANETARY.iter().enumerate() {
        let mut arg = base + rate * k;
        if i == 0 {
            arg -= 0.009_173 * t2;
        }
        jde += coef * arg.to_radians().sin();
    }
    jde
}

/// 第 `k` 个朔的世界时儒略日
pub fn new_moon_ut(k: f64) -> f64 {
    let jde = new_moon(k);
    jde - delta_t_days(jde)
}

/// # Summary
/// 在给定时区下，朔日不晚于民用日 `day` 的最后一个朔。
///
/// # Returns
/// `(k, 朔所在民用日)`。
pub fn new_moon_on_or_before(day: i64, offset_hours: f64) -> (f64, i64) {
    let mut k = ((day as f64 - NEW_MOON_EPOCH) / SYNODIC_MONTH).floor() + 1.0;
    loop {
        let start = local_day(new_moon_ut(k), offset_hours);
        if start <= day {
            return (k, start);
        }
        k -= 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jd_of(y: i32, m: u32, d: u32, h: u32, min: u32) -> f64 {
        julian_day(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_julian_day_epoch() {
        assert!((jd_of(2000, 1, 1, 12, 0) - J2000).abs() < 1e-9);
        assert_eq!(day_number(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()), 2_451_545);
        let back = from_julian_day(J2000).unwrap();
        assert_eq!(back.to_string(), "2000-01-01 12:00:00");
    }

    #[test]
    fn test_march_equinox_2000() {
        // 2000 年春分：UT 3 月 20 日 07:35
        let jd = solar_term_in_year(2000, 0.0).unwrap();
        let expected = jd_of(2000, 3, 20, 7, 35);
        assert!((jd - expected).abs() < 0.02, "equinox off by {} days", jd - expected);
    }

    #[test]
    fn test_winter_solstice_and_lichun_2024() {
        // 2024 年立春：北京时间 2 月 4 日 16:27，即 UT 08:27
        let lichun = solar_term_in_year(2024, 315.0).unwrap();
        assert!((lichun - jd_of(2024, 2, 4, 8, 27)).abs() < 0.02);
        // 2023 年冬至：北京时间 12 月 22 日 11:27
        let ws = solar_term_in_year(2023, 270.0).unwrap();
        assert_eq!(local_day(ws, 8.0), day_number(NaiveDate::from_ymd_opt(2023, 12, 22).unwrap()));
    }

    #[test]
    fn test_terms_stay_in_requested_year() {
        // 冬至取当年 12 月，小寒取当年 1 月
        for year in [1900, 1999, 2033, 2100] {
            let ws = from_julian_day(solar_term_in_year(year, 270.0).unwrap()).unwrap();
            assert_eq!((ws.year(), ws.month()), (year, 12), "冬至 {year}");
            let xh = from_julian_day(solar_term_in_year(year, 285.0).unwrap()).unwrap();
            assert_eq!((xh.year(), xh.month()), (year, 1), "小寒 {year}");
        }
        // 2024 年小寒：北京时间 1 月 6 日 04:49
        let xh = solar_term_in_year(2024, 285.0).unwrap();
        assert_eq!(local_day(xh, 8.0), day_number(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()));
    }

    #[test]
    fn test_new_moon_example_from_meeus() {
        // 1977 年 2 月 18 日 3:37:42 TD, k = -283
        let jde = new_moon(-283.0);
        let expected = 2_443_192.651_18;
        assert!((jde - expected).abs() < 0.001);
    }

    #[test]
    fn test_new_moon_on_or_before() {
        // 2024-02-10 为甲辰年正月初一（北京时间 06:59 合朔）
        let day = day_number(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        let (_, start) = new_moon_on_or_before(day + 5, 8.0);
        assert_eq!(start, day);
    }

    #[test]
    fn test_angle_normalization() {
        assert_eq!(normalize_degrees(-30.0), 330.0);
        assert_eq!(signed_degrees(350.0), -10.0);
        assert_eq!(signed_degrees(10.0), 10.0);
    }
}
