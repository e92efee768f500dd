pub mod random;
pub mod time;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// 命主性别，决定大运顺逆排。
///
/// # Invariants
/// - 只有两个固定取值，序列化为 "男" / "女"。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    #[serde(rename = "男")]
    Male,
    #[serde(rename = "女")]
    Female,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "男" | "male" | "m" => Ok(Gender::Male),
            "女" | "female" | "f" => Ok(Gender::Female),
            _ => Err(format!("Unknown Gender: {}", s)),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "男"),
            Gender::Female => write!(f, "女"),
        }
    }
}
