//! 配置加载：内置默认值 ← 可选的 `shenji.toml` ← `SHENJI__` 前缀的环境变量。

use config::{Config, ConfigError, Environment, File, Map};
use shenji_core::config::AppConfig;

/// 默认配置文件名（不含扩展名），位于工作目录
pub const CONFIG_FILE: &str = "shenji";

/// # Summary
/// 加载应用配置。
///
/// # Logic
/// 1. 缺省字段一律取 `AppConfig` 的默认值。
/// 2. 依次叠加配置文件与环境变量，例如 `SHENJI__SERVER__PORT=9090`。
/// 3. 未配置 `narrator.api_key` 时，退回读取 `API_KEY`。
///
/// # Arguments
/// * `file`: 配置文件路径（不含扩展名），文件不存在时跳过。
/// * `env`: 用于替换进程环境变量的键值表，仅测试使用；`None` 读取真实环境。
pub fn load(file: &str, env: Option<Map<String, String>>) -> Result<AppConfig, ConfigError> {
    let api_key = match &env {
        Some(map) => map.get("API_KEY").cloned(),
        None => std::env::var("API_KEY").ok(),
    };
    let mut cfg: AppConfig = Config::builder()
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix("SHENJI")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()?
        .try_deserialize()?;

    if cfg.narrator.api_key.is_empty()
        && let Some(key) = api_key.filter(|k| !k.trim().is_empty())
    {
        cfg.narrator.api_key = key.trim().to_string();
    }
    Ok(cfg)
}
