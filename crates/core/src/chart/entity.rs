use crate::chart::error::ChartError;
use crate::common::Gender;
use crate::ganzhi::{GanZhi, Stem, TenGod};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 支持的出生年份下限
pub const MIN_BIRTH_YEAR: i32 = 1900;
/// 支持的出生年份上限
pub const MAX_BIRTH_YEAR: i32 = 2100;

/// # Summary
/// 用户提交的出生信息（公历）。
///
/// # Invariants
/// - 通过 `validate` 后保证能构成合法的民用时刻。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthInput {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub gender: Gender,
    pub birth_place: Option<String>,
}

impl BirthInput {
    /// # Summary
    /// 校验并转换为民用时刻。
    ///
    /// # Logic
    /// 1. 年份须在 1900..=2100。
    /// 2. 由 chrono 校验月、日（含闰年二月）与时、分。
    ///
    /// # Returns
    /// 合法时返回 `NaiveDateTime`，否则返回 `ChartError::InvalidInput`。
    pub fn validate(&self) -> Result<NaiveDateTime, ChartError> {
        if !(MIN_BIRTH_YEAR..=MAX_BIRTH_YEAR).contains(&self.year) {
            return Err(ChartError::InvalidInput(format!(
                "year {} must be within {}..={}",
                self.year, MIN_BIRTH_YEAR, MAX_BIRTH_YEAR
            )));
        }
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            ChartError::InvalidInput(format!(
                "{}-{}-{} is not a valid date",
                self.year, self.month, self.day
            ))
        })?;
        date.and_hms_opt(self.hour, self.minute, 0).ok_or_else(|| {
            ChartError::InvalidInput(format!("{}:{} is not a valid time", self.hour, self.minute))
        })
    }

    /// 同一命盘的唯一键，用于首问免费登记
    pub fn chart_key(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}-{}",
            self.year, self.month, self.day, self.hour, self.minute, self.gender
        )
    }
}

/// # Summary
/// 单柱（年 / 月 / 日 / 时）。
///
/// # Invariants
/// - `hidden_stems` 与 `hidden_ten_gods` 等长，长度 1..=3。
/// - 日柱的 `stem_ten_god` 为 `None`，展示为 "日主"。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pillar {
    pub gan_zhi: GanZhi,
    pub stem_ten_god: Option<TenGod>,
    pub hidden_stems: Vec<Stem>,
    pub hidden_ten_gods: Vec<TenGod>,
    pub na_yin: String,
}

impl Pillar {
    /// 天干十神标签，日柱为 "日主"
    pub fn stem_label(&self) -> &'static str {
        self.stem_ten_god.map_or("日主", TenGod::label)
    }
}

/// 童限（起运前）展示文本
pub const PRE_DESTINY_LABEL: &str = "童限";
/// 上游占位文本：已起运但干支缺失
pub const PENDING_LABEL: &str = "正式大运";

/// # Summary
/// 大运标签。
///
/// # Invariants
/// - `PreDestiny` 只会出现在时间线首位。
/// - `Pending` 是上游缺失干支时的占位，绝不应直接展示给用户。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageLabel {
    PreDestiny,
    Pending,
    Formal(GanZhi),
}

impl StageLabel {
    pub fn gan_zhi(self) -> Option<GanZhi> {
        match self {
            StageLabel::Formal(gz) => Some(gz),
            _ => None,
        }
    }
}

impl std::fmt::Display for StageLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageLabel::PreDestiny => write!(f, "{}", PRE_DESTINY_LABEL),
            StageLabel::Pending => write!(f, "{}", PENDING_LABEL),
            StageLabel::Formal(gz) => write!(f, "{}", gz),
        }
    }
}

impl std::str::FromStr for StageLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            PRE_DESTINY_LABEL => Ok(StageLabel::PreDestiny),
            PENDING_LABEL => Ok(StageLabel::Pending),
            other => other.parse().map(StageLabel::Formal),
        }
    }
}

impl Serialize for StageLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StageLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// # Summary
/// 大运时间线中的一步。
///
/// # Invariants
/// - 时间线按 `start_age` 非降序排列。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaYun {
    pub label: StageLabel,
    pub start_age: u32,
    pub start_year: i32,
    pub end_year: i32,
}

/// # Summary
/// 流年：当下所处的农历年。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiuNian {
    pub year: i32,
    pub gan_zhi: GanZhi,
}

/// # Summary
/// 命盘聚合，一次排盘请求的全部派生结果。
///
/// # Invariants
/// - 创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaziChart {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Pillar,
    pub da_yun: Vec<DaYun>,
    pub current_liu_nian: LiuNian,
    pub solar_date: String,
    pub lunar_date: String,
    pub gender: Gender,
    pub birth_place: Option<String>,
    pub birth_year: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(year: i32, month: u32, day: u32) -> BirthInput {
        BirthInput {
            year,
            month,
            day,
            hour: 12,
            minute: 30,
            gender: Gender::Male,
            birth_place: None,
        }
    }

    #[test]
    fn test_birth_input_validation() {
        assert!(input(1990, 1, 1).validate().is_ok());
        assert!(input(2000, 2, 29).validate().is_ok());
        assert!(matches!(input(1999, 2, 29).validate(), Err(ChartError::InvalidInput(_))));
        assert!(matches!(input(1899, 5, 1).validate(), Err(ChartError::InvalidInput(_))));
        let mut bad_time = input(1990, 1, 1);
        bad_time.hour = 24;
        assert!(bad_time.validate().is_err());
    }

    #[test]
    fn test_chart_key_format() {
        assert_eq!(input(1990, 1, 1).chart_key(), "1990-1-1-12-30-男");
    }

    #[test]
    fn test_stage_label_serde() {
        let formal: StageLabel = "甲子".parse().unwrap();
        assert_eq!(formal.gan_zhi().map(|g| g.to_string()), Some("甲子".to_string()));
        assert_eq!(serde_json::to_string(&StageLabel::PreDestiny).unwrap(), "\"童限\"");
        let back: StageLabel = serde_json::from_str("\"正式大运\"").unwrap();
        assert_eq!(back, StageLabel::Pending);
    }
}
