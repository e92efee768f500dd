use crate::divination::{self, CastNumbers};
use crate::{chart, element, kline};
use chrono::NaiveDateTime;
use shenji_core::calendar::port::CalendarPort;
use shenji_core::chart::entity::{BaziChart, BirthInput};
use shenji_core::chart::error::ChartError;
use shenji_core::common::random::RandomSource;
use shenji_core::common::time::TimeProvider;
use shenji_core::fortune::entity::{DivinationResult, LifeDestinyResult};
use std::sync::Arc;

/// # Summary
/// `FortuneService` 是排盘与人生 K 线推演的入口，
/// 持有历法服务与时钟，随机源由调用方按次注入。
///
/// # Invariants
/// - 自身无可变状态，可在请求间共享。
/// - "当下"一律取自 `clock`，并换算到历法服务所用的时区。
pub struct FortuneService {
    calendar: Arc<dyn CalendarPort>,
    clock: Arc<dyn TimeProvider>,
}

impl FortuneService {
    pub fn new(calendar: Arc<dyn CalendarPort>, clock: Arc<dyn TimeProvider>) -> Self {
        Self { calendar, clock }
    }

    /// 当前时刻在历法时区下的民用时间
    pub fn local_now(&self) -> NaiveDateTime {
        self.clock
            .now()
            .with_timezone(&self.calendar.utc_offset())
            .naive_local()
    }

    /// 排盘
    pub fn chart(&self, input: &BirthInput) -> Result<BaziChart, ChartError> {
        chart::derive_chart(self.calendar.as_ref(), input, self.local_now())
    }

    /// 以当前时刻起卦
    pub fn divine_now(&self) -> Result<DivinationResult, ChartError> {
        let numbers = CastNumbers::at(self.calendar.as_ref(), self.local_now())?;
        let result = divination::cast(numbers);
        tracing::debug!(?numbers, gua = %result.gua_name, luck = %result.luck, "meihua cast");
        Ok(result)
    }

    /// # Summary
    /// 由命盘推演人生 K 线。
    ///
    /// # Logic
    /// 1. 以日干与月支判定喜忌。
    /// 2. 以当前时刻起卦。
    /// 3. 合成 100 根 K 线。
    pub fn life_destiny<R: RandomSource + ?Sized>(
        &self,
        chart: &BaziChart,
        rng: &mut R,
    ) -> Result<LifeDestinyResult, ChartError> {
        let profile = element::classify(chart.day.gan_zhi.stem, chart.month.gan_zhi.branch);
        let meihua = self.divine_now()?;
        let chart_points = kline::synthesize(self.calendar.as_ref(), chart, &profile, &meihua, rng);
        Ok(LifeDestinyResult {
            chart_points,
            meihua,
            profile,
        })
    }

    /// 排盘并推演，一次请求的完整结果
    pub fn generate<R: RandomSource + ?Sized>(
        &self,
        input: &BirthInput,
        rng: &mut R,
    ) -> Result<(BaziChart, LifeDestinyResult), ChartError> {
        let chart = self.chart(input)?;
        let destiny = self.life_destiny(&chart, rng)?;
        tracing::info!(
            birth_year = chart.birth_year,
            gua = %destiny.meihua.gua_name,
            strong = destiny.profile.strong,
            "life destiny generated"
        );
        Ok((chart, destiny))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};
    use shenji_calendar::AstroCalendar;
    use shenji_core::common::time::FakeClockProvider;

    #[test]
    fn test_local_now_follows_calendar_offset() {
        let clock = FakeClockProvider::new(Utc.with_ymd_and_hms(2024, 2, 9, 20, 30, 0).unwrap());
        let service = FortuneService::new(Arc::new(AstroCalendar::default()), Arc::new(clock));
        let now = service.local_now();
        assert_eq!(now.date(), chrono::NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        assert_eq!((now.hour(), now.minute()), (4, 30));
    }
}
