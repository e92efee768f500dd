use crate::astro::{self, TROPICAL_YEAR};
use crate::{lunar, pillars, yun};
use chrono::{Datelike, FixedOffset, NaiveDateTime, Offset, Utc};
use shenji_core::calendar::entity::{EightChar, LunarDate};
use shenji_core::calendar::error::CalendarError;
use shenji_core::calendar::port::CalendarPort;
use shenji_core::chart::entity::{MAX_BIRTH_YEAR, MIN_BIRTH_YEAR};
use shenji_core::common::Gender;

/// # Summary
/// 基于天文推算的历法服务实现。
///
/// # Invariants
/// - 无内部可变状态，可在多线程间共享。
/// - 所有入参均视为 `offset` 时区下的民用时间。
#[derive(Debug, Clone, Copy)]
pub struct AstroCalendar {
    offset: FixedOffset,
}

impl AstroCalendar {
    /// # Summary
    /// 以指定的 UTC 偏移（小时）创建历法服务。
    ///
    /// # Returns
    /// 偏移不在 -23..=23 小时内时返回 `CalendarError::InvalidDate`。
    pub fn new(utc_offset_hours: i32) -> Result<Self, CalendarError> {
        let offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                CalendarError::InvalidDate(format!("UTC offset {}h is out of range", utc_offset_hours))
            })?;
        Ok(Self { offset })
    }

    fn offset_hours(&self) -> f64 {
        f64::from(self.offset.local_minus_utc()) / 3600.0
    }

    fn check_range(at: NaiveDateTime) -> Result<(), CalendarError> {
        let year = at.year();
        if (MIN_BIRTH_YEAR..=MAX_BIRTH_YEAR).contains(&year) {
            Ok(())
        } else {
            Err(CalendarError::OutOfRange {
                year,
                min: MIN_BIRTH_YEAR,
                max: MAX_BIRTH_YEAR,
            })
        }
    }

    // 民用时刻对应的世界时儒略日
    fn jd_ut(&self, at: NaiveDateTime) -> f64 {
        astro::julian_day(at) - self.offset_hours() / 24.0
    }

    fn to_civil(&self, jd_ut: f64) -> Result<NaiveDateTime, CalendarError> {
        astro::from_julian_day(jd_ut + self.offset_hours() / 24.0)
            .ok_or_else(|| CalendarError::Search(format!("JD {:.5} is not representable", jd_ut)))
    }

    /// # Summary
    /// 求出生时刻相邻的节（黄经 ≡ 15 mod 30）。
    ///
    /// # Logic
    /// 顺排取下一个节，逆排取上一个节；以当前黄经差按平均速度给出初值后迭代。
    fn adjacent_jie(&self, jd_ut: f64, forward: bool) -> Result<NaiveDateTime, CalendarError> {
        let longitude = astro::solar_longitude_ut(jd_ut);
        let since_jie = astro::normalize_degrees(longitude - 315.0).rem_euclid(30.0);
        let (target, guess) = if forward {
            let ahead = 30.0 - since_jie;
            (longitude + ahead, jd_ut + ahead * TROPICAL_YEAR / 360.0)
        } else {
            (longitude - since_jie, jd_ut - since_jie * TROPICAL_YEAR / 360.0)
        };
        let jd = astro::solve_longitude(astro::normalize_degrees(target), guess)?;
        self.to_civil(jd)
    }
}

impl Default for AstroCalendar {
    /// 北京时间 (UTC+8)
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl CalendarPort for AstroCalendar {
    fn solar_to_lunar(&self, at: NaiveDateTime) -> Result<LunarDate, CalendarError> {
        Self::check_range(at)?;
        lunar::lunar_date(at.date(), self.offset_hours())
    }

    /// # Summary
    /// 排四柱并生成大运。
    ///
    /// # Logic
    /// 1. 由出生时刻的太阳视黄经得到节令月序，推出年柱与月柱。
    /// 2. 日柱取民用日，晚子时不换日；时柱按五鼠遁。
    /// 3. 按年干阴阳与性别定顺逆，取相邻的节计算起运。
    /// 4. 以月柱为基准生成十步大运。
    fn eight_char(&self, at: NaiveDateTime, gender: Gender) -> Result<EightChar, CalendarError> {
        Self::check_range(at)?;
        let jd_ut = self.jd_ut(at);
        let month_index = pillars::solar_month_index(astro::solar_longitude_ut(jd_ut));

        let year = pillars::year_pillar(at.year(), at.month(), month_index);
        let month = pillars::month_pillar(year.stem, month_index);
        let day = pillars::day_pillar(at.date());
        let hour = pillars::hour_pillar(at);
        let lunar = lunar::lunar_date(at.date(), self.offset_hours())?;

        let forward = yun::is_forward(year.stem, gender);
        let jie = self.adjacent_jie(jd_ut, forward)?;
        let yun_start = yun::yun_start(at, jie, forward)?;
        let da_yun = yun::da_yun_timeline(at.year(), month, &yun_start);

        tracing::debug!(
            %at, %year, %month, %day, %hour, forward, jie = %jie, yun_start = %yun_start.start,
            "eight char derived"
        );

        Ok(EightChar {
            year,
            month,
            day,
            hour,
            lunar,
            yun: yun_start,
            da_yun,
        })
    }

    fn utc_offset(&self) -> FixedOffset {
        self.offset
    }
}
