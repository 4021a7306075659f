pub mod catalog;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod utils;

use migration::MigratorTrait;

pub use catalog::browser::{CatalogBrowser, ViewState};
pub use catalog::cache::{CacheOptions, CatalogStatus, GameCatalog, LoadState};
pub use catalog::filter::{compute_visible, CompiledFilter, FilterSelection};
pub use catalog::normalize::{normalize, normalize_rows, parse_bool_facet};
pub use catalog::session::DetailView;
pub use catalog::source::{HttpCsvSource, RawRow, RowSource, SourceLayout, StaticSource};
pub use catalog::store::{CacheStore, DatabaseStore, MemoryStore};
pub use catalog::view::{facet_summary, paginate, tags_for, truncate, Page, Pager};
pub use config::CatalogConfig;
pub use entity::prelude::*;
pub use error::CatalogError;

/// 使用已发布表格和本地 SQLite 缓存的目录
pub type SheetCatalog = GameCatalog<HttpCsvSource, DatabaseStore>;

/// 按配置创建目录：连接缓存数据库、执行迁移、创建 HTTP 数据源
pub async fn open_catalog(config: &CatalogConfig) -> Result<SheetCatalog, CatalogError> {
    config.validate()?;

    if let Some(level) = &config.log_level {
        utils::logs::set_log_level(level)?;
    }

    let db_path = config.resolve_db_path()?;
    let conn = database::establish_connection(&db_path).await?;
    log::info!("缓存数据库连接建立成功: {}", db_path.display());

    log::info!("开始执行数据库迁移...");
    match migration::Migrator::up(&conn, None).await {
        Ok(_) => log::info!("数据库迁移完成"),
        Err(e) => log::error!("数据库迁移失败: {}", e),
    }

    let source = HttpCsvSource::new(
        config.source.url.clone(),
        config.source.layout,
        config.request_timeout(),
    )?;

    Ok(GameCatalog::new(
        source,
        DatabaseStore::new(conn),
        config.cache_options(),
    ))
}
