use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// 解析日志级别字符串（不区分大小写）
pub fn parse_log_level(level: &str) -> Result<LogLevel, CatalogError> {
    match level.trim().to_lowercase().as_str() {
        "error" => Ok(LogLevel::Error),
        "warn" => Ok(LogLevel::Warn),
        "info" => Ok(LogLevel::Info),
        "debug" => Ok(LogLevel::Debug),
        "trace" => Ok(LogLevel::Trace),
        "off" => Ok(LogLevel::Off),
        other => Err(CatalogError::InvalidLogLevel(other.to_string())),
    }
}

/// 动态设置日志输出级别（不持久化）
pub fn set_log_level(level: &str) -> Result<(), CatalogError> {
    let lf: log::LevelFilter = parse_log_level(level)?.into();
    log::set_max_level(lf);
    Ok(())
}

/// 获取当前日志级别
pub fn get_log_level() -> LogLevel {
    match log::max_level() {
        log::LevelFilter::Error => LogLevel::Error,
        log::LevelFilter::Warn => LogLevel::Warn,
        log::LevelFilter::Info => LogLevel::Info,
        log::LevelFilter::Debug => LogLevel::Debug,
        log::LevelFilter::Trace => LogLevel::Trace,
        log::LevelFilter::Off => LogLevel::Off,
    }
}
