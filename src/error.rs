//! 统一错误类型
//!
//! 数据源错误可以通过过期缓存兜底；缓存存储错误在拉取流程中只记录日志，
//! 视为缓存未命中。实现了 `Clone`，以便并发等待同一次拉取的调用方拿到相同的结果。

use sea_orm::DbErr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    // === 数据源 ===
    /// 网络请求失败
    #[error("获取游戏数据失败: {0}")]
    SourceFetch(String),

    /// 数据源返回非 2xx 状态码
    #[error("数据源返回异常状态码: {0}")]
    SourceStatus(u16),

    /// 表格内容无法解析
    #[error("解析游戏数据失败: {0}")]
    SourceParse(String),

    // === 本地缓存 ===
    #[error("缓存存储操作失败: {0}")]
    CacheStore(String),

    // === 配置与日志 ===
    #[error("配置无效: {0}")]
    Config(String),

    #[error("无效的日志级别: {0}")]
    InvalidLogLevel(String),
}

impl CatalogError {
    /// 是否为数据源错误（界面应提供重试入口）
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            CatalogError::SourceFetch(_) | CatalogError::SourceStatus(_) | CatalogError::SourceParse(_)
        )
    }
}

impl From<DbErr> for CatalogError {
    fn from(e: DbErr) -> Self {
        CatalogError::CacheStore(e.to_string())
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => CatalogError::SourceStatus(status.as_u16()),
            None => CatalogError::SourceFetch(e.to_string()),
        }
    }
}

impl From<csv::Error> for CatalogError {
    fn from(e: csv::Error) -> Self {
        CatalogError::SourceParse(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Config(e.to_string())
    }
}
