//! 天干、地支、六十甲子与十神。
//!
//! 所有映射均以常量表存储并按枚举下标查询，保证每个取值都有对应条目。

pub mod element;

use element::{Element, Relation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// 十天干。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Stem {
    #[serde(rename = "甲")]
    Jia,
    #[serde(rename = "乙")]
    Yi,
    #[serde(rename = "丙")]
    Bing,
    #[serde(rename = "丁")]
    Ding,
    #[serde(rename = "戊")]
    Wu,
    #[serde(rename = "己")]
    Ji,
    #[serde(rename = "庚")]
    Geng,
    #[serde(rename = "辛")]
    Xin,
    #[serde(rename = "壬")]
    Ren,
    #[serde(rename = "癸")]
    Gui,
}

/// # Summary
/// 十二地支。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Branch {
    #[serde(rename = "子")]
    Zi,
    #[serde(rename = "丑")]
    Chou,
    #[serde(rename = "寅")]
    Yin,
    #[serde(rename = "卯")]
    Mao,
    #[serde(rename = "辰")]
    Chen,
    #[serde(rename = "巳")]
    Si,
    #[serde(rename = "午")]
    Wu,
    #[serde(rename = "未")]
    Wei,
    #[serde(rename = "申")]
    Shen,
    #[serde(rename = "酉")]
    You,
    #[serde(rename = "戌")]
    Xu,
    #[serde(rename = "亥")]
    Hai,
}

const STEM_CHARS: [char; 10] = ['甲', '乙', '丙', '丁', '戊', '己', '庚', '辛', '壬', '癸'];
const BRANCH_CHARS: [char; 12] = [
    '子', '丑', '寅', '卯', '辰', '巳', '午', '未', '申', '酉', '戌', '亥',
];

const STEM_ELEMENT: [Element; 10] = [
    Element::Wood,
    Element::Wood,
    Element::Fire,
    Element::Fire,
    Element::Earth,
    Element::Earth,
    Element::Metal,
    Element::Metal,
    Element::Water,
    Element::Water,
];

const BRANCH_ELEMENT: [Element; 12] = [
    Element::Water, // 子
    Element::Earth, // 丑
    Element::Wood,  // 寅
    Element::Wood,  // 卯
    Element::Earth, // 辰
    Element::Fire,  // 巳
    Element::Fire,  // 午
    Element::Earth, // 未
    Element::Metal, // 申
    Element::Metal, // 酉
    Element::Earth, // 戌
    Element::Water, // 亥
];

/// 地支藏干，本气在前。
const HIDDEN_STEMS: [&[Stem]; 12] = [
    &[Stem::Gui],
    &[Stem::Ji, Stem::Gui, Stem::Xin],
    &[Stem::Jia, Stem::Bing, Stem::Wu],
    &[Stem::Yi],
    &[Stem::Wu, Stem::Yi, Stem::Gui],
    &[Stem::Bing, Stem::Geng, Stem::Wu],
    &[Stem::Ding, Stem::Ji],
    &[Stem::Ji, Stem::Ding, Stem::Yi],
    &[Stem::Geng, Stem::Ren, Stem::Wu],
    &[Stem::Xin],
    &[Stem::Wu, Stem::Xin, Stem::Ding],
    &[Stem::Ren, Stem::Jia],
];

/// 六十甲子纳音，每两柱共用一个。
const NA_YIN: [&str; 30] = [
    "海中金", "炉中火", "大林木", "路旁土", "剑锋金", "山头火", "涧下水", "城头土", "白蜡金",
    "杨柳木", "泉中水", "屋上土", "霹雳火", "松柏木", "长流水", "沙中金", "山下火", "平地木",
    "壁上土", "金箔金", "覆灯火", "天河水", "大驿土", "钗钏金", "桑柘木", "大溪水", "沙中土",
    "天上火", "石榴木", "大海水",
];

impl Stem {
    pub const ALL: [Stem; 10] = [
        Stem::Jia,
        Stem::Yi,
        Stem::Bing,
        Stem::Ding,
        Stem::Wu,
        Stem::Ji,
        Stem::Geng,
        Stem::Xin,
        Stem::Ren,
        Stem::Gui,
    ];

    /// 由任意整数下标取天干（自动取模）
    pub fn from_index(index: usize) -> Stem {
        Self::ALL[index % 10]
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn element(self) -> Element {
        STEM_ELEMENT[self.index()]
    }

    /// 阳干（甲丙戊庚壬）
    pub fn is_yang(self) -> bool {
        self.index() % 2 == 0
    }

    pub fn as_char(self) -> char {
        STEM_CHARS[self.index()]
    }

    pub fn from_char(c: char) -> Option<Stem> {
        STEM_CHARS.iter().position(|x| *x == c).map(Self::from_index)
    }
}

impl Branch {
    pub const ALL: [Branch; 12] = [
        Branch::Zi,
        Branch::Chou,
        Branch::Yin,
        Branch::Mao,
        Branch::Chen,
        Branch::Si,
        Branch::Wu,
        Branch::Wei,
        Branch::Shen,
        Branch::You,
        Branch::Xu,
        Branch::Hai,
    ];

    pub fn from_index(index: usize) -> Branch {
        Self::ALL[index % 12]
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|b| *b == self).unwrap_or(0)
    }

    pub fn element(self) -> Element {
        BRANCH_ELEMENT[self.index()]
    }

    /// 地支序数，子 = 1 … 亥 = 12（梅花易数取数用）
    pub fn ordinal(self) -> u32 {
        match u32::try_from(self.index()) {
            Ok(i) => i + 1,
            Err(_) => 1,
        }
    }

    /// 藏干列表，长度 1..=3
    pub fn hidden_stems(self) -> &'static [Stem] {
        HIDDEN_STEMS[self.index()]
    }

    pub fn as_char(self) -> char {
        BRANCH_CHARS[self.index()]
    }

    pub fn from_char(c: char) -> Option<Branch> {
        BRANCH_CHARS.iter().position(|x| *x == c).map(Self::from_index)
    }
}

impl std::fmt::Display for Stem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// # Summary
/// 一组干支（六十甲子之一）。
///
/// # Invariants
/// - 天干与地支阴阳必须一致（下标同奇偶），由构造函数保证。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GanZhi {
    pub stem: Stem,
    pub branch: Branch,
}

impl GanZhi {
    /// 由六十甲子序号构造，0 = 甲子，59 = 癸亥；允许负数与溢出，自动取模。
    pub fn from_cycle(index: i64) -> GanZhi {
        let idx = usize::try_from(index.rem_euclid(60)).unwrap_or(0);
        GanZhi {
            stem: Stem::from_index(idx),
            branch: Branch::from_index(idx),
        }
    }

    /// 公历（或农历）年份对应的干支，1984 = 甲子
    pub fn for_year(year: i32) -> GanZhi {
        Self::from_cycle(i64::from(year) - 4)
    }

    /// 六十甲子序号 0..60
    pub fn cycle_index(self) -> usize {
        let s = self.stem.index();
        let b = self.branch.index();
        // 中国剩余定理：idx ≡ s (mod 10), idx ≡ b (mod 12)
        (0..6)
            .map(|k| s + 10 * k)
            .find(|idx| idx % 12 == b)
            .unwrap_or(s)
    }

    /// 按六十甲子向前（正）或向后（负）偏移
    pub fn offset(self, delta: i64) -> GanZhi {
        let base = i64::try_from(self.cycle_index()).unwrap_or(0);
        Self::from_cycle(base + delta)
    }

    pub fn na_yin(self) -> &'static str {
        NA_YIN[self.cycle_index() / 2]
    }
}

impl std::fmt::Display for GanZhi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

impl FromStr for GanZhi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(g), Some(z), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(format!("Invalid GanZhi: {}", s));
        };
        let stem = Stem::from_char(g).ok_or_else(|| format!("Invalid stem: {}", g))?;
        let branch = Branch::from_char(z).ok_or_else(|| format!("Invalid branch: {}", z))?;
        if stem.index() % 2 != branch.index() % 2 {
            return Err(format!("Mismatched polarity: {}", s));
        }
        Ok(GanZhi { stem, branch })
    }
}

impl Serialize for GanZhi {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GanZhi {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// # Summary
/// 十神：以日主为参照的天干关系标签。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TenGod {
    #[serde(rename = "比肩")]
    Friend,
    #[serde(rename = "劫财")]
    RobWealth,
    #[serde(rename = "食神")]
    EatingGod,
    #[serde(rename = "伤官")]
    HurtingOfficer,
    #[serde(rename = "偏财")]
    IndirectWealth,
    #[serde(rename = "正财")]
    DirectWealth,
    #[serde(rename = "七杀")]
    SevenKillings,
    #[serde(rename = "正官")]
    DirectOfficer,
    #[serde(rename = "偏印")]
    IndirectResource,
    #[serde(rename = "正印")]
    DirectResource,
}

impl TenGod {
    /// 计算 `other` 相对日主 `day_master` 的十神。
    ///
    /// # Logic
    /// 1. 由五行生克确定大类（同我、我生、我克、克我、生我）。
    /// 2. 阴阳相同取"偏"（比肩、食神、偏财、七杀、偏印），相异取"正"。
    pub fn between(day_master: Stem, other: Stem) -> TenGod {
        let same_polarity = day_master.is_yang() == other.is_yang();
        match (day_master.element().relation_to(other.element()), same_polarity) {
            (Relation::Same, true) => TenGod::Friend,
            (Relation::Same, false) => TenGod::RobWealth,
            (Relation::Generates, true) => TenGod::EatingGod,
            (Relation::Generates, false) => TenGod::HurtingOfficer,
            (Relation::Controls, true) => TenGod::IndirectWealth,
            (Relation::Controls, false) => TenGod::DirectWealth,
            (Relation::ControlledBy, true) => TenGod::SevenKillings,
            (Relation::ControlledBy, false) => TenGod::DirectOfficer,
            (Relation::GeneratedBy, true) => TenGod::IndirectResource,
            (Relation::GeneratedBy, false) => TenGod::DirectResource,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TenGod::Friend => "比肩",
            TenGod::RobWealth => "劫财",
            TenGod::EatingGod => "食神",
            TenGod::HurtingOfficer => "伤官",
            TenGod::IndirectWealth => "偏财",
            TenGod::DirectWealth => "正财",
            TenGod::SevenKillings => "七杀",
            TenGod::DirectOfficer => "正官",
            TenGod::IndirectResource => "偏印",
            TenGod::DirectResource => "正印",
        }
    }
}

impl std::fmt::Display for TenGod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
