use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, RuntimeErr};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// 确保数据库所在目录存在
pub fn ensure_db_dir_exists(db_path: &Path) -> Result<(), String> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("无法创建数据库目录: {}", e))?;
    }
    Ok(())
}

/// 构建 SQLite 连接字符串
pub fn sqlite_url(db_path: &Path) -> Result<String, DbErr> {
    // 使用 `url` crate 安全地构建连接字符串
    let db_url = Url::from_file_path(db_path).map_err(|_| {
        DbErr::Conn(RuntimeErr::Internal(format!(
            "Invalid database path: {}",
            db_path.display()
        )))
    })?;
    Ok(format!("sqlite:{}?mode=rwc", db_url.path()))
}

/// Establish a SeaORM connection to the on-disk cache database.
pub async fn establish_connection(db_path: &Path) -> Result<DatabaseConnection, DbErr> {
    ensure_db_dir_exists(db_path).map_err(|e| DbErr::Conn(RuntimeErr::Internal(e)))?;
    connect(sqlite_url(db_path)?).await
}

/// 内存数据库（进程内缓存、测试）
pub async fn establish_in_memory() -> Result<DatabaseConnection, DbErr> {
    connect("sqlite::memory:".to_string()).await
}

async fn connect(connection_string: String) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(connection_string);
    // 本地 SQLite 连接池大小为 1 即可；内存数据库也必须共用同一个连接
    options
        .max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    log::debug!("Database connection string: {}", options.get_url());

    Database::connect(options).await
}

/// 关闭数据库连接
pub async fn close_connection(conn: DatabaseConnection) -> Result<(), DbErr> {
    conn.close().await?;
    Ok(())
}
