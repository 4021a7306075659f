//! 引擎配置
//!
//! 配置文件为 JSON，所有字段均有默认值，缺失的字段使用默认值补齐。
//! 默认配置文件位于数据目录下的 config.json（见 somer-path）。

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::cache::CacheOptions;
use crate::catalog::source::SourceLayout;
use crate::error::CatalogError;

/// 已发布的游戏表格（CSV 导出）
pub const DEFAULT_SOURCE_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRcx1YPhoi6kUVe36T4T2162AhCdBwuVSX0ou2u-Vlicjf2So3VL3E2MDzrNYIbkgckP4n8p18_UOGP/pub?gid=0&single=true&output=csv";
pub const DEFAULT_CACHE_KEY: &str = "somer_games_cache";
/// 缓存有效期：1 小时
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;
/// 与浏览器 localStorage 的常见配额一致
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub layout: SourceLayout,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            layout: SourceLayout::default(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub key: String,
    pub ttl_secs: u64,
    /// 自定义缓存数据库路径；为空时使用数据目录下的默认路径
    pub db_path: Option<PathBuf>,
    pub max_payload_bytes: usize,
    pub shuffle_on_load: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_CACHE_KEY.to_string(),
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            db_path: None,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            shuffle_on_load: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub page_size: usize,
    pub log_level: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            cache: CacheConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            log_level: None,
        }
    }
}

impl CatalogConfig {
    /// 从 JSON 文件加载配置
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Config(format!("无法读取配置文件 {}: {}", path.display(), e)))?;
        let config: CatalogConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// 加载数据目录下的 config.json，不存在时使用默认配置
    pub fn load_or_default() -> Result<Self, CatalogError> {
        let path = somer_path::get_config_path().map_err(CatalogError::Config)?;
        if path.exists() {
            log::info!("加载配置文件: {}", path.display());
            Self::load(&path)
        } else {
            log::debug!("未找到配置文件 {}，使用默认配置", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.source.url.trim().is_empty() {
            return Err(CatalogError::Config("数据源地址不能为空".to_string()));
        }
        url::Url::parse(&self.source.url)
            .map_err(|e| CatalogError::Config(format!("数据源地址无效: {}", e)))?;
        if self.cache.key.trim().is_empty() {
            return Err(CatalogError::Config("缓存键不能为空".to_string()));
        }
        if self.cache.ttl_secs == 0 {
            return Err(CatalogError::Config("缓存有效期必须大于 0".to_string()));
        }
        if self.page_size == 0 {
            return Err(CatalogError::Config("每页条数必须大于 0".to_string()));
        }
        if let Some(level) = &self.log_level {
            crate::utils::logs::parse_log_level(level)?;
        }
        Ok(())
    }

    /// 缓存数据库路径：优先使用配置，否则使用数据目录下的默认路径
    pub fn resolve_db_path(&self) -> Result<PathBuf, CatalogError> {
        match &self.cache.db_path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path.clone()),
            _ => somer_path::get_db_path().map_err(CatalogError::Config),
        }
    }

    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            cache_key: self.cache.key.clone(),
            ttl: Duration::from_secs(self.cache.ttl_secs),
            max_payload_bytes: self.cache.max_payload_bytes,
            shuffle_on_load: self.cache.shuffle_on_load,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }
}
