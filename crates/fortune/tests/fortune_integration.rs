use chrono::{TimeZone, Utc};
use shenji_calendar::AstroCalendar;
use shenji_core::chart::entity::{BirthInput, StageLabel};
use shenji_core::chart::error::ChartError;
use shenji_core::common::Gender;
use shenji_core::common::random::SeededRandom;
use shenji_core::common::time::FakeClockProvider;
use shenji_core::fortune::entity::{LuckLevel, Trigram};
use shenji_core::testing::ConstRandom;
use shenji_fortune::FortuneService;
use std::sync::Arc;

fn birth(year: i32, month: u32, day: u32, hour: u32, minute: u32, gender: Gender) -> BirthInput {
    BirthInput {
        year,
        month,
        day,
        hour,
        minute,
        gender,
        birth_place: None,
    }
}

/// 时钟钉在北京时间 2024-02-10 12:00（农历正月初一午时）
fn service() -> FortuneService {
    let clock = FakeClockProvider::new(Utc.with_ymd_and_hms(2024, 2, 10, 4, 0, 0).unwrap());
    FortuneService::new(Arc::new(AstroCalendar::default()), Arc::new(clock))
}

#[test]
fn test_divination_follows_clock() -> anyhow::Result<()> {
    // 辰年(5) + 正月(1) + 初一(1) = 7 → 艮；再加午时(7) + 0 分 = 14 → 坎，动爻 2
    let r = service().divine_now()?;
    assert_eq!((r.upper, r.lower, r.moving_line), (Trigram::Gen, Trigram::Kan, 2));
    assert_eq!((r.body, r.usage), (Trigram::Gen, Trigram::Kan));
    assert_eq!(r.luck, LuckLevel::MediumAuspicious);
    assert_eq!(r.gua_name, "艮坎卦");
    Ok(())
}

#[test]
fn test_life_destiny_shape() -> anyhow::Result<()> {
    let svc = service();
    let mut rng = SeededRandom::new(7);
    let (chart, destiny) = svc.generate(&birth(1990, 6, 15, 12, 0, Gender::Male), &mut rng)?;

    assert_eq!(chart.current_liu_nian.year, 2024);
    assert_eq!(chart.current_liu_nian.gan_zhi.to_string(), "甲辰");
    assert_eq!(destiny.chart_points.len(), 100);
    for (i, c) in destiny.chart_points.iter().enumerate() {
        assert_eq!(usize::try_from(c.age)?, i + 1);
        assert_eq!(c.year, 1990 + i32::try_from(i)?);
        assert!((0..=100).contains(&c.low) && (0..=100).contains(&c.high));
        assert!(c.high >= c.open.max(c.close), "age {}", c.age);
        assert!(c.low <= c.open.min(c.close), "age {}", c.age);
        assert!((15..=98).contains(&c.close));
        assert_eq!(c.score, c.close);
    }
    assert_eq!(destiny.chart_points[0].gan_zhi.to_string(), "庚午");
    Ok(())
}

#[test]
fn test_pre_destiny_window_and_first_candles() -> anyhow::Result<()> {
    let svc = service();
    let (chart, destiny) =
        svc.generate(&birth(2024, 2, 10, 12, 0, Gender::Male), &mut ConstRandom(0.5))?;

    // 甲木生寅月，身强：喜火土金
    assert!(destiny.profile.strong);
    assert_eq!(chart.da_yun[0].label, StageLabel::PreDestiny);

    let points = &destiny.chart_points;
    for c in &points[..8] {
        assert_eq!(c.da_yun, StageLabel::PreDestiny);
    }
    assert_eq!(points[8].da_yun.to_string(), "丁卯");

    // 扰动为零、波动率 1.1：
    // 月柱丙寅得 65，流年甲辰得 60，卦象中吉 +5
    // 目标 67.5，前收 62.5 → 收盘 66
    let first = &points[0];
    assert_eq!((first.open, first.close, first.high, first.low), (63, 66, 69, 60));
    // 流年乙巳得 60：0.3 × 66 + 0.7 × 67.5 = 67.05
    assert_eq!(points[1].close, 67);
    Ok(())
}

#[test]
fn test_fixed_clock_and_seed_reproduce() -> anyhow::Result<()> {
    let input = birth(1985, 11, 3, 7, 45, Gender::Female);
    let (_, a) = service().generate(&input, &mut SeededRandom::new(99))?;
    let (_, b) = service().generate(&input, &mut SeededRandom::new(99))?;
    assert_eq!(a, b);

    let (_, c) = service().generate(&input, &mut SeededRandom::new(100))?;
    assert_eq!(a.meihua, c.meihua);
    assert_eq!(a.profile, c.profile);
    Ok(())
}

#[test]
fn test_invalid_birth_rejected() {
    let svc = service();
    for input in [
        birth(1899, 12, 31, 0, 0, Gender::Male),
        birth(2023, 2, 29, 0, 0, Gender::Male),
        birth(2000, 1, 1, 24, 0, Gender::Female),
    ] {
        assert!(matches!(svc.chart(&input), Err(ChartError::InvalidInput(_))));
    }
    assert!(svc.chart(&birth(2024, 2, 29, 23, 59, Gender::Female)).is_ok());
}
