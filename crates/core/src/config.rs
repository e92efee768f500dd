use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub quota: QuotaConfig,
    pub calendar: CalendarConfig,
    pub narrator: NarratorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    // 前端构建产物目录，SPA 路由回退到其中的 index.html
    pub static_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    pub daily_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    // 排盘所用民用时区相对 UTC 的小时数，默认北京时间
    pub utc_offset_hours: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarratorConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub system_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    // 设置后额外按天滚动写入该目录
    pub dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: "dist".to_string(),
        }
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: crate::quota::entity::DEFAULT_DAILY_LIMIT,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self { utc_offset_hours: 8 }
    }
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: String::new(),
            system_prompt: "你是一位精通子平八字与梅花易数的命理师。请根据用户提供的八字排盘与大运信息，\
                用理性、克制、不夸大的语言给出分析，并提醒结果仅供参考。"
                .to_string(),
        }
    }
}
