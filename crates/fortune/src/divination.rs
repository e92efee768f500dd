//! 梅花易数时间起卦。

use chrono::{NaiveDateTime, Timelike};
use shenji_core::calendar::error::CalendarError;
use shenji_core::calendar::port::CalendarPort;
use shenji_core::fortune::entity::{DivinationResult, LuckLevel, Trigram};
use shenji_core::ganzhi::element::Relation;

/// # Summary
/// 起卦用的五个数。
///
/// # Invariants
/// - `year` 为农历年支序数（子 = 1），`hour` 为时辰序数（子 = 1）。
/// - `month` 为农历月序号，闰月取其绝对序号。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastNumbers {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl CastNumbers {
    /// # Summary
    /// 取某个民用时刻的起卦数。
    ///
    /// # Returns
    /// 历法换算失败时返回 `CalendarError`。
    pub fn at(calendar: &dyn CalendarPort, now: NaiveDateTime) -> Result<Self, CalendarError> {
        let lunar = calendar.solar_to_lunar(now)?;
        Ok(Self {
            year: lunar.year_gan_zhi.branch.ordinal(),
            month: lunar.month,
            day: lunar.day,
            hour: calendar.branch_for_hour(now.hour()).ordinal(),
            minute: now.minute(),
        })
    }
}

// 取模为零时以模数代之
fn wrap(value: u32, modulus: u32) -> u32 {
    match value % modulus {
        0 => modulus,
        r => r,
    }
}

/// # Summary
/// 体用生克定吉凶。
///
/// # Logic
/// 按以下顺序取第一条成立者（五行两两之间恰有一条成立）：
/// 比和小吉，用生体大吉，体克用中吉，体生用小凶，用克体大凶。
pub fn judge(body: Trigram, usage: Trigram) -> LuckLevel {
    match body.element().relation_to(usage.element()) {
        Relation::Same => LuckLevel::SmallAuspicious,
        Relation::GeneratedBy => LuckLevel::GreatAuspicious,
        Relation::Controls => LuckLevel::MediumAuspicious,
        Relation::Generates => LuckLevel::SmallInauspicious,
        Relation::ControlledBy => LuckLevel::GreatInauspicious,
    }
}

/// # Summary
/// 由起卦数求上下卦、动爻与体用，并判定吉凶。
///
/// # Logic
/// 1. 上卦 = (年 + 月 + 日) mod 8，下卦 = (年 + 月 + 日 + 时 + 分) mod 8，余 0 作 8。
/// 2. 动爻 = 同一总和 mod 6，余 0 作 6。
/// 3. 动爻在下卦（1..=3）则上卦为体，否则下卦为体。
pub fn cast(n: CastNumbers) -> DivinationResult {
    let upper_sum = n.year + n.month + n.day;
    let total = upper_sum + n.hour + n.minute;
    let upper = Trigram::from_number(wrap(upper_sum, 8));
    let lower = Trigram::from_number(wrap(total, 8));
    let moving_line = wrap(total, 6);
    let (body, usage) = if moving_line <= 3 {
        (upper, lower)
    } else {
        (lower, upper)
    };
    let luck = judge(body, usage);

    DivinationResult {
        gua_name: format!("{}{}卦", upper.name(), lower.name()),
        upper,
        lower,
        moving_line,
        body,
        usage,
        score_offset: luck.score_offset(),
        luck,
    }
}
