use crate::entity::cache_entries;
use crate::entity::prelude::CacheEntries;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

/// 游戏数据缓存仓库
pub struct CacheRepository;

impl CacheRepository {
    /// 根据缓存键查询
    pub async fn find(
        db: &DatabaseConnection,
        key: &str,
    ) -> Result<Option<cache_entries::Model>, DbErr> {
        CacheEntries::find_by_id(key.to_string()).one(db).await
    }

    /// 写入缓存（键已存在时覆盖 payload 和拉取时间）
    pub async fn upsert(
        db: &DatabaseConnection,
        key: &str,
        payload: String,
        fetched_at: i64,
    ) -> Result<(), DbErr> {
        let entry = cache_entries::ActiveModel {
            cache_key: Set(key.to_string()),
            payload: Set(payload),
            fetched_at: Set(fetched_at),
        };

        CacheEntries::insert(entry)
            .on_conflict(
                OnConflict::column(cache_entries::Column::CacheKey)
                    .update_columns([
                        cache_entries::Column::Payload,
                        cache_entries::Column::FetchedAt,
                    ])
                    .to_owned(),
            )
            .exec(db)
            .await?;
        Ok(())
    }

    /// 删除缓存，返回删除的行数
    pub async fn delete(db: &DatabaseConnection, key: &str) -> Result<u64, DbErr> {
        CacheEntries::delete_by_id(key.to_string())
            .exec(db)
            .await
            .map(|result| result.rows_affected)
    }

    /// 缓存条目总数
    pub async fn count(db: &DatabaseConnection) -> Result<u64, DbErr> {
        CacheEntries::find().count(db).await
    }
}
