use chrono::{Datelike, NaiveDateTime, Weekday};
use shenji_core::calendar::entity::{EightChar, RawDaYun};
use shenji_core::calendar::port::CalendarPort;
use shenji_core::chart::entity::{BaziChart, BirthInput, DaYun, LiuNian, Pillar, StageLabel};
use shenji_core::chart::error::ChartError;
use shenji_core::ganzhi::{GanZhi, Stem, TenGod};

/// 时间线最多保留的大运步数（不含补入的童限）
const MAX_STAGES: usize = 10;

/// # Summary
/// 由干支与日主构造单柱。
///
/// # Arguments
/// * `gan_zhi`: 本柱干支。
/// * `day_master`: 日主天干。
/// * `is_day`: 是否为日柱（日柱天干记为"日主"，不计十神）。
pub fn build_pillar(gan_zhi: GanZhi, day_master: Stem, is_day: bool) -> Pillar {
    let hidden_stems = gan_zhi.branch.hidden_stems().to_vec();
    let hidden_ten_gods = hidden_stems
        .iter()
        .map(|s| TenGod::between(day_master, *s))
        .collect();
    Pillar {
        gan_zhi,
        stem_ten_god: (!is_day).then(|| TenGod::between(day_master, gan_zhi.stem)),
        hidden_stems,
        hidden_ten_gods,
        na_yin: gan_zhi.na_yin().to_string(),
    }
}

/// # Summary
/// 将历法服务给出的原始大运整理为展示用时间线。
///
/// # Logic
/// 1. 首步起运虚岁大于 1 时，在最前补入一段童限（虚岁 1 至首步前一岁）。
/// 2. 有干支者记为正式大运；无干支且起于 1 岁者记为童限，否则记为待定占位。
/// 3. 至多保留十步。
pub fn build_timeline(raw: &[RawDaYun], birth_year: i32) -> Vec<DaYun> {
    let mut timeline = Vec::with_capacity(MAX_STAGES + 1);
    let first_age = raw.first().map_or(10, |d| d.start_age);
    if first_age > 1 {
        let span = i32::try_from(first_age).unwrap_or(2) - 2;
        timeline.push(DaYun {
            label: StageLabel::PreDestiny,
            start_age: 1,
            start_year: birth_year,
            end_year: birth_year + span,
        });
    }
    timeline.extend(raw.iter().take(MAX_STAGES).map(|d| DaYun {
        label: match d.gan_zhi {
            Some(gz) => StageLabel::Formal(gz),
            None if d.start_age <= 1 => StageLabel::PreDestiny,
            None => StageLabel::Pending,
        },
        start_age: d.start_age,
        start_year: d.start_year,
        end_year: d.end_year,
    }));
    timeline
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "星期一",
        Weekday::Tue => "星期二",
        Weekday::Wed => "星期三",
        Weekday::Thu => "星期四",
        Weekday::Fri => "星期五",
        Weekday::Sat => "星期六",
        Weekday::Sun => "星期日",
    }
}

/// 公历展示文本，例如 `1990-06-15 12:00:00 星期五`
pub fn solar_label(at: NaiveDateTime) -> String {
    format!("{} {}", at.format("%Y-%m-%d %H:%M:%S"), weekday_name(at.weekday()))
}

/// # Summary
/// 排盘：出生信息 → 完整命盘。
///
/// # Logic
/// 1. 校验出生信息并换算为民用时刻。
/// 2. 调用历法服务得到四柱、农历与原始大运。
/// 3. 以日干为日主计算各柱十神、藏干十神与纳音。
/// 4. 整理大运时间线，并按 `now` 所在农历年给出流年。
///
/// # Arguments
/// * `calendar`: 历法服务。
/// * `input`: 出生信息。
/// * `now`: 当前民用时刻（与历法服务同一时区）。
///
/// # Returns
/// 成功返回 `BaziChart`；入参非法或历法换算失败返回 `ChartError`。
pub fn derive_chart(
    calendar: &dyn CalendarPort,
    input: &BirthInput,
    now: NaiveDateTime,
) -> Result<BaziChart, ChartError> {
    let at = input.validate()?;
    let ec: EightChar = calendar.eight_char(at, input.gender)?;
    let current = calendar.solar_to_lunar(now)?;
    let dm = ec.day.stem;

    let chart = BaziChart {
        year: build_pillar(ec.year, dm, false),
        month: build_pillar(ec.month, dm, false),
        day: build_pillar(ec.day, dm, true),
        hour: build_pillar(ec.hour, dm, false),
        da_yun: build_timeline(&ec.da_yun, input.year),
        current_liu_nian: LiuNian {
            year: current.year,
            gan_zhi: calendar.lunar_year_gan_zhi(current.year),
        },
        solar_date: solar_label(at),
        lunar_date: ec.lunar.to_string(),
        gender: input.gender,
        birth_place: input.birth_place.clone(),
        birth_year: input.year,
    };
    tracing::debug!(
        key = %input.chart_key(),
        pillars = %format!("{} {} {} {}", ec.year, ec.month, ec.day, ec.hour),
        stages = chart.da_yun.len(),
        "chart derived"
    );
    Ok(chart)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(gz: Option<&str>, start_age: u32, start_year: i32) -> RawDaYun {
        RawDaYun {
            gan_zhi: gz.map(|s| s.parse().unwrap()),
            start_age,
            start_year,
            end_year: start_year + 9,
        }
    }

    #[test]
    fn test_pillar_ten_gods() {
        let dm = Stem::Jia;
        let day = build_pillar("甲子".parse().unwrap(), dm, true);
        assert_eq!(day.stem_label(), "日主");
        assert_eq!(day.hidden_stems, vec![Stem::Gui]);
        assert_eq!(day.hidden_ten_gods, vec![TenGod::DirectResource]);
        assert_eq!(day.na_yin, "海中金");

        let year = build_pillar("庚午".parse().unwrap(), dm, false);
        assert_eq!(year.stem_label(), "七杀");
        assert_eq!(year.hidden_stems.len(), year.hidden_ten_gods.len());
        assert_eq!(year.hidden_ten_gods, vec![TenGod::HurtingOfficer, TenGod::DirectWealth]);
    }

    #[test]
    fn test_timeline_keeps_calendar_pre_destiny() {
        let t = build_timeline(
            &[raw(None, 1, 1990), raw(Some("癸未"), 8, 1997), raw(Some("甲申"), 18, 2007)],
            1990,
        );
        assert_eq!(t.len(), 3);
        assert_eq!(t[0].label, StageLabel::PreDestiny);
        assert_eq!(t[1].label.to_string(), "癸未");
    }

    #[test]
    fn test_timeline_inserts_pre_destiny_when_first_stage_is_late() {
        let t = build_timeline(&[raw(Some("癸未"), 5, 1994), raw(Some("甲申"), 15, 2004)], 1990);
        assert_eq!(t.len(), 3);
        assert_eq!(t[0].label, StageLabel::PreDestiny);
        assert_eq!((t[0].start_age, t[0].start_year, t[0].end_year), (1, 1990, 1993));
        assert_eq!(t[1].start_age, 5);
    }

    #[test]
    fn test_timeline_unlabelled_late_stage_is_pending() {
        let t = build_timeline(&[raw(None, 1, 1990), raw(None, 8, 1997)], 1990);
        assert_eq!(t[0].label, StageLabel::PreDestiny);
        assert_eq!(t[1].label, StageLabel::Pending);
    }

    #[test]
    fn test_timeline_truncates_to_ten_steps() {
        let raws: Vec<RawDaYun> = (0..12)
            .map(|i| raw(Some("甲子"), 1 + i * 10, 1990 + i32::try_from(i).unwrap() * 10))
            .collect();
        assert_eq!(build_timeline(&raws, 1990).len(), 10);
    }

    #[test]
    fn test_solar_label() {
        let at = chrono::NaiveDate::from_ymd_opt(1990, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(solar_label(at), "1990-06-15 12:00:00 星期五");
    }
}
