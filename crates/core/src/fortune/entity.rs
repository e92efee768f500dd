use crate::chart::entity::StageLabel;
use crate::ganzhi::GanZhi;
use crate::ganzhi::element::{Element, ElementSet};
use serde::{Deserialize, Serialize};

/// 人生 K 线的固定长度（虚岁 1..=100）
pub const LIFE_SPAN: u32 = 100;

/// # Summary
/// 日主强弱判定结果与喜忌五行。
///
/// # Invariants
/// - `favored` 与 `avoided` 互不相交，均非空。
/// - 一次排盘计算一次，此后不可变。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementProfile {
    pub day_master: Element,
    pub strong: bool,
    pub favored: ElementSet,
    pub avoided: ElementSet,
}

/// # Summary
/// 八卦（先天数：乾一 兑二 离三 震四 巽五 坎六 艮七 坤八）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigram {
    #[serde(rename = "乾")]
    Qian,
    #[serde(rename = "兑")]
    Dui,
    #[serde(rename = "离")]
    Li,
    #[serde(rename = "震")]
    Zhen,
    #[serde(rename = "巽")]
    Xun,
    #[serde(rename = "坎")]
    Kan,
    #[serde(rename = "艮")]
    Gen,
    #[serde(rename = "坤")]
    Kun,
}

/// 卦数 → 卦，下标 0 为取模结果为零时的兜底（同坤）。
const TRIGRAM_BY_NUMBER: [Trigram; 9] = [
    Trigram::Kun,
    Trigram::Qian,
    Trigram::Dui,
    Trigram::Li,
    Trigram::Zhen,
    Trigram::Xun,
    Trigram::Kan,
    Trigram::Gen,
    Trigram::Kun,
];

impl Trigram {
    pub const ALL: [Trigram; 8] = [
        Trigram::Qian,
        Trigram::Dui,
        Trigram::Li,
        Trigram::Zhen,
        Trigram::Xun,
        Trigram::Kan,
        Trigram::Gen,
        Trigram::Kun,
    ];

    /// 由卦数 0..=8 查表；超出范围的数先对 8 取模
    pub fn from_number(n: u32) -> Trigram {
        let idx = usize::try_from(if n > 8 { n % 8 } else { n }).unwrap_or(0);
        TRIGRAM_BY_NUMBER[idx]
    }

    pub fn element(self) -> Element {
        match self {
            Trigram::Qian | Trigram::Dui => Element::Metal,
            Trigram::Li => Element::Fire,
            Trigram::Zhen | Trigram::Xun => Element::Wood,
            Trigram::Kan => Element::Water,
            Trigram::Gen | Trigram::Kun => Element::Earth,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Trigram::Qian => "乾",
            Trigram::Dui => "兑",
            Trigram::Li => "离",
            Trigram::Zhen => "震",
            Trigram::Xun => "巽",
            Trigram::Kan => "坎",
            Trigram::Gen => "艮",
            Trigram::Kun => "坤",
        }
    }
}

impl std::fmt::Display for Trigram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// # Summary
/// 梅花易数体用生克得出的吉凶等级。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LuckLevel {
    #[serde(rename = "大吉")]
    GreatAuspicious,
    #[serde(rename = "中吉")]
    MediumAuspicious,
    #[serde(rename = "小吉")]
    SmallAuspicious,
    #[serde(rename = "小凶")]
    SmallInauspicious,
    #[serde(rename = "大凶")]
    GreatInauspicious,
}

impl LuckLevel {
    /// 对人生 K 线基准分的固定修正
    pub fn score_offset(self) -> i32 {
        match self {
            LuckLevel::SmallAuspicious => 2,
            LuckLevel::GreatAuspicious => 15,
            LuckLevel::MediumAuspicious => 5,
            LuckLevel::SmallInauspicious => -5,
            LuckLevel::GreatInauspicious => -12,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LuckLevel::GreatAuspicious => "大吉",
            LuckLevel::MediumAuspicious => "中吉",
            LuckLevel::SmallAuspicious => "小吉",
            LuckLevel::SmallInauspicious => "小凶",
            LuckLevel::GreatInauspicious => "大凶",
        }
    }
}

impl std::fmt::Display for LuckLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// # Summary
/// 一次梅花起卦的完整结果。
///
/// # Invariants
/// - `score_offset == luck.score_offset()`。
/// - 由起卦时刻决定，与命盘无关；不同时刻调用结果可能不同。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivinationResult {
    // 卦名，例如 "震震卦"
    pub gua_name: String,
    pub upper: Trigram,
    pub lower: Trigram,
    // 动爻 1..=6
    pub moving_line: u32,
    // 体卦与用卦
    pub body: Trigram,
    pub usage: Trigram,
    pub score_offset: i32,
    pub luck: LuckLevel,
}

/// # Summary
/// 人生 K 线上的单根蜡烛（一个虚岁）。
///
/// # Invariants
/// - `open`、`high`、`low`、`close` 均在 0..=100。
/// - `high >= max(open, close)`，`low <= min(open, close)`。
/// - `score == close`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeCandle {
    pub age: u32,
    pub year: i32,
    pub gan_zhi: GanZhi,
    pub da_yun: StageLabel,
    pub open: i32,
    pub close: i32,
    pub high: i32,
    pub low: i32,
    pub score: i32,
}

/// # Summary
/// 人生 K 线生成结果。
///
/// # Invariants
/// - `chart_points` 恰好 100 根，虚岁 1..=100 严格递增。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeDestinyResult {
    pub chart_points: Vec<LifeCandle>,
    pub meihua: DivinationResult,
    pub profile: ElementProfile,
}
