//! 缓存持久化
//!
//! 持久化的内容是"已规范化记录的 JSON 文本 + 拉取时间"，按缓存键存取。
//! 过期判断和反序列化都在 `GameCatalog` 中完成，存储层只搬运字节。

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use sea_orm::DatabaseConnection;

use crate::database::dto::StoredEntry;
use crate::database::repository::cache_repository::CacheRepository;
use crate::error::CatalogError;

pub trait CacheStore: Send + Sync {
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<StoredEntry>, CatalogError>> + Send;

    /// 覆盖写入
    fn write(&self, key: &str, entry: StoredEntry) -> impl Future<Output = Result<(), CatalogError>> + Send;

    /// 删除条目；条目不存在不算错误
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), CatalogError>> + Send;
}

/// SQLite 缓存存储
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl CacheStore for DatabaseStore {
    async fn read(&self, key: &str) -> Result<Option<StoredEntry>, CatalogError> {
        let model = CacheRepository::find(&self.db, key).await?;
        Ok(model.map(StoredEntry::from))
    }

    async fn write(&self, key: &str, entry: StoredEntry) -> Result<(), CatalogError> {
        CacheRepository::upsert(&self.db, key, entry.payload, entry.fetched_at).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CatalogError> {
        let removed = CacheRepository::delete(&self.db, key).await?;
        log::debug!("删除缓存条目 {}: {} 行", key, removed);
        Ok(())
    }
}

/// 进程内缓存存储（嵌入式使用和测试）
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入一条原始条目，不经过校验
    pub fn insert_raw(&self, key: &str, payload: impl Into<String>, fetched_at: i64) {
        self.entries.lock().insert(
            key.to_string(),
            StoredEntry {
                payload: payload.into(),
                fetched_at,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<StoredEntry> {
        self.entries.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl CacheStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<StoredEntry>, CatalogError> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, entry: StoredEntry) -> Result<(), CatalogError> {
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CatalogError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
