use chrono::{NaiveDate, NaiveDateTime};
use shenji_calendar::AstroCalendar;
use shenji_core::calendar::port::CalendarPort;
use shenji_core::common::Gender;
use shenji_core::ganzhi::Branch;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[test]
fn test_spring_festival_2024_chart() -> anyhow::Result<()> {
    let cal = AstroCalendar::default();
    let chart = cal.eight_char(at(2024, 2, 10, 12, 0), Gender::Male)?;

    assert_eq!(chart.year.to_string(), "甲辰");
    assert_eq!(chart.month.to_string(), "丙寅");
    assert_eq!(chart.day.to_string(), "甲辰");
    assert_eq!(chart.hour.to_string(), "庚午");
    assert_eq!(chart.lunar.to_string(), "二〇二四年正月初一");

    // 阳年男命顺排，下一个节为惊蛰（3 月 5 日巳时）
    assert!(chart.yun.forward);
    assert_eq!((chart.yun.years, chart.yun.months, chart.yun.days), (7, 11, 20));
    assert_eq!(chart.yun.start.date(), NaiveDate::from_ymd_opt(2032, 1, 30).unwrap());

    assert_eq!(chart.da_yun.len(), 10);
    assert_eq!(chart.da_yun[0].gan_zhi, None);
    assert_eq!(chart.da_yun[0].start_age, 1);
    assert_eq!(chart.da_yun[1].gan_zhi.map(|g| g.to_string()).as_deref(), Some("丁卯"));
    assert_eq!(chart.da_yun[1].start_age, 9);
    assert_eq!(chart.da_yun[9].gan_zhi.map(|g| g.to_string()).as_deref(), Some("乙亥"));
    Ok(())
}

#[test]
fn test_female_yang_year_runs_backward() -> anyhow::Result<()> {
    let cal = AstroCalendar::default();
    let chart = cal.eight_char(at(2024, 2, 10, 12, 0), Gender::Female)?;
    assert!(!chart.yun.forward);
    // 上一个节为立春（2 月 4 日），间隔不足 6 天，两年内起运
    assert!(chart.yun.years <= 2);
    assert_eq!(chart.da_yun[1].gan_zhi.map(|g| g.to_string()).as_deref(), Some("乙丑"));
    for step in &chart.da_yun[1..] {
        assert_eq!(i64::from(step.start_age), i64::from(step.start_year - 2024 + 1));
        assert_eq!(step.end_year, step.start_year + 9);
    }
    Ok(())
}

#[test]
fn test_lichun_splits_year_and_month() -> anyhow::Result<()> {
    let cal = AstroCalendar::default();
    // 2024 年立春：2 月 4 日 16:27
    let before = cal.eight_char(at(2024, 2, 4, 12, 0), Gender::Male)?;
    let after = cal.eight_char(at(2024, 2, 4, 20, 0), Gender::Male)?;
    assert_eq!(before.year.to_string(), "癸卯");
    assert_eq!(before.month.to_string(), "乙丑");
    assert_eq!(after.year.to_string(), "甲辰");
    assert_eq!(after.month.to_string(), "丙寅");
    // 同一民用日，日柱不变
    assert_eq!(before.day, after.day);
    // 立春前农历仍是腊月
    assert_eq!(before.lunar.month, 12);
    assert_eq!(before.lunar.year, 2023);
    Ok(())
}

#[test]
fn test_late_zi_keeps_day_pillar() -> anyhow::Result<()> {
    let cal = AstroCalendar::default();
    let evening = cal.eight_char(at(2024, 2, 10, 23, 30), Gender::Male)?;
    assert_eq!(evening.day.to_string(), "甲辰");
    assert_eq!(evening.hour.to_string(), "丙子");
    Ok(())
}

#[test]
fn test_port_helpers() {
    let cal = AstroCalendar::default();
    assert_eq!(cal.lunar_year_gan_zhi(1990).to_string(), "庚午");
    assert_eq!(cal.branch_for_hour(23), Branch::Zi);
    assert_eq!(cal.branch_for_hour(0), Branch::Zi);
    assert_eq!(cal.branch_for_hour(1), Branch::Chou);
    assert_eq!(cal.branch_for_hour(12), Branch::Wu);
    assert_eq!(cal.branch_for_hour(22), Branch::Hai);
}

#[test]
fn test_supported_range_edges() -> anyhow::Result<()> {
    let cal = AstroCalendar::default();
    let first = cal.solar_to_lunar(at(1900, 1, 1, 0, 0))?;
    assert_eq!(first.year, 1899);
    assert!(first.month >= 11);
    let last = cal.solar_to_lunar(at(2100, 12, 31, 12, 0))?;
    assert_eq!(last.year, 2100);
    Ok(())
}

#[test]
fn test_new_year_days_across_range() -> anyhow::Result<()> {
    let cal = AstroCalendar::default();
    let new_years = [
        (1900, 1, 31),
        (1933, 1, 26),
        (1949, 1, 29),
        (1985, 2, 20),
        (1990, 1, 27),
        (2000, 2, 5),
        (2024, 2, 10),
        (2100, 2, 9),
    ];
    for (y, m, d) in new_years {
        let l = cal.solar_to_lunar(at(y, m, d, 12, 0))?;
        assert_eq!((l.year, l.month, l.is_leap, l.day), (y, 1, false, 1), "{y}-{m}-{d}");
        // 前一日仍属上一农历年腊月
        let eve = cal.solar_to_lunar(at(y, m, d, 0, 0) - chrono::Duration::hours(12))?;
        assert_eq!((eve.year, eve.month, eve.is_leap), (y - 1, 12, false), "{y} 除夕");
    }
    Ok(())
}

#[test]
fn test_leap_months_across_range() -> anyhow::Result<()> {
    let cal = AstroCalendar::default();
    // (公历日期, 农历年, 月, 日)，均为闰月
    let leaps = [
        ((1995, 9, 25), 1995, 8, 1),
        ((2001, 5, 23), 2001, 4, 1),
        ((2006, 8, 24), 2006, 7, 1),
        ((2012, 5, 21), 2012, 4, 1),
        ((2017, 7, 23), 2017, 6, 1),
        ((2020, 5, 30), 2020, 4, 8),
    ];
    for ((y, m, d), year, month, day) in leaps {
        let l = cal.solar_to_lunar(at(y, m, d, 12, 0))?;
        assert_eq!((l.year, l.month, l.is_leap, l.day), (year, month, true, day), "{y}-{m}-{d}");
    }
    Ok(())
}

#[test]
fn test_leap_eleventh_month_2033() -> anyhow::Result<()> {
    let cal = AstroCalendar::default();
    let l = cal.solar_to_lunar(at(2033, 12, 30, 12, 0))?;
    assert_eq!((l.year, l.month, l.is_leap), (2033, 11, true));
    assert!(l.to_string().contains("闰冬月"));

    // 闰月之后的正月照常开始新年
    let spring = cal.solar_to_lunar(at(2034, 2, 19, 12, 0))?;
    assert_eq!((spring.year, spring.month, spring.is_leap, spring.day), (2034, 1, false, 1));
    Ok(())
}
