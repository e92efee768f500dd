//! 人生 K 线合成。
//!
//! 逐岁推进，每根蜡烛由大运喜忌、流年喜忌、卦象修正与有界随机扰动加权得到，
//! 并向上一根收盘价均值回归。收盘价是唯一跨岁传递的状态。

use shenji_core::calendar::port::CalendarPort;
use shenji_core::chart::entity::{BaziChart, DaYun, StageLabel};
use shenji_core::common::random::RandomSource;
use shenji_core::fortune::entity::{DivinationResult, ElementProfile, LIFE_SPAN, LifeCandle};
use shenji_core::ganzhi::GanZhi;

const BASE_CLOSE: f64 = 60.0;
const CLOSE_FLOOR: f64 = 15.0;
const CLOSE_CEILING: f64 = 98.0;

/// 取起始虚岁不大于 `age` 的最后一步；遇到起始虚岁更大的即停止扫描
pub fn active_stage(timeline: &[DaYun], age: u32) -> Option<&DaYun> {
    let mut matched = None;
    for stage in timeline {
        if age >= stage.start_age {
            matched = Some(stage);
        } else {
            break;
        }
    }
    matched
}

/// # Summary
/// 大运得分。
///
/// # Logic
/// 天干为喜记 1 分，地支为喜记 1.5 分；合计 ≥ 2 得 75，≥ 1 得 65；
/// 都不喜时地支为忌得 45，否则 55。
pub fn stage_score(profile: &ElementProfile, gz: GanZhi) -> f64 {
    let stem_el = gz.stem.element();
    let branch_el = gz.branch.element();
    let mut count = 0.0;
    if profile.favored.contains(stem_el) {
        count += 1.0;
    }
    if profile.favored.contains(branch_el) {
        count += 1.5;
    }
    if count >= 2.0 {
        75.0
    } else if count >= 1.0 {
        65.0
    } else if profile.avoided.contains(branch_el) {
        45.0
    } else {
        55.0
    }
}

/// 流年得分：干支皆喜 75，仅地支喜 60，否则 45
pub fn year_score(profile: &ElementProfile, gz: GanZhi) -> f64 {
    let stem_fav = profile.favored.contains(gz.stem.element());
    let branch_fav = profile.favored.contains(gz.branch.element());
    match (stem_fav, branch_fav) {
        (true, true) => 75.0,
        (_, true) => 60.0,
        _ => 45.0,
    }
}

// 入参已限定在 0..=100
#[allow(clippy::cast_possible_truncation)]
fn to_point(value: f64) -> i32 {
    value.round() as i32
}

/// # Summary
/// 合成 100 根人生 K 线。
///
/// # Logic
/// 1. 波动率在 [0.8, 1.4) 内抽取一次，初始收盘价 = 60 + 卦象修正 / 2。
/// 2. 对每个虚岁：取流年干支与所处大运；正式大运按其干支评分，
///    童限或占位按月柱评分，占位标签展示为童限。
/// 3. 目标值 = 0.5 × 大运分 + 0.3 × 流年分 + 12 + 卦象修正 + (u − 0.5) × 15 × 波动率。
/// 4. 收盘 = round(clamp(0.3 × 前收 + 0.7 × 目标, 15, 98))。
/// 5. 开盘 = 前收 + (u − 0.5) × 6 × 波动率，限定在 0..=100。
/// 6. 最高 = min(100, max(开, 收) + 5u)，最低 = max(0, min(开, 收) − 5u)。
///
/// # Invariants
/// - 每步按"目标扰动、开盘扰动、最高、最低"的顺序各抽取一次随机数。
pub fn synthesize<R: RandomSource + ?Sized>(
    calendar: &dyn CalendarPort,
    chart: &BaziChart,
    profile: &ElementProfile,
    divination: &DivinationResult,
    rng: &mut R,
) -> Vec<LifeCandle> {
    let offset = f64::from(divination.score_offset);
    let volatility = 0.8 + rng.next_unit() * 0.6;
    let mut prev_close = BASE_CLOSE + offset * 0.5;
    let month_gz = chart.month.gan_zhi;

    let mut candles = Vec::with_capacity(usize::try_from(LIFE_SPAN).unwrap_or(100));
    for (i, age) in (1..=LIFE_SPAN).enumerate() {
        let year = chart.birth_year + i32::try_from(i).unwrap_or(0);
        let year_gz = calendar.lunar_year_gan_zhi(year);

        let (label, scoring_gz) = match active_stage(&chart.da_yun, age).map(|s| s.label) {
            Some(StageLabel::Formal(gz)) => (StageLabel::Formal(gz), gz),
            Some(StageLabel::Pending) | Some(StageLabel::PreDestiny) | None => {
                (StageLabel::PreDestiny, month_gz)
            }
        };

        let target = 0.5 * stage_score(profile, scoring_gz)
            + 0.3 * year_score(profile, year_gz)
            + 12.0
            + offset
            + (rng.next_unit() - 0.5) * 15.0 * volatility;
        let close = (prev_close * 0.3 + target * 0.7)
            .clamp(CLOSE_FLOOR, CLOSE_CEILING)
            .round();
        let open = (prev_close + (rng.next_unit() - 0.5) * 6.0 * volatility).clamp(0.0, 100.0);
        let high = (open.max(close) + rng.next_unit() * 5.0).min(100.0);
        let low = (open.min(close) - rng.next_unit() * 5.0).max(0.0);

        let close_point = to_point(close);
        candles.push(LifeCandle {
            age,
            year,
            gan_zhi: year_gz,
            da_yun: label,
            open: to_point(open),
            close: close_point,
            high: to_point(high),
            low: to_point(low),
            score: close_point,
        });
        prev_close = close;
    }
    candles
}
