//! 创建游戏数据缓存表
//!
//! cache_entries 表以缓存键为主键，每个键只保存一条记录：
//! 1. payload 为序列化后的游戏记录数组（JSON 文本）
//! 2. fetched_at 为拉取时间（Unix 毫秒）

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CacheEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CacheEntries::CacheKey)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CacheEntries::Payload).text().not_null())
                    .col(
                        ColumnDef::new(CacheEntries::FetchedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 缓存表只保存可重新拉取的数据，直接删除即可
        manager
            .drop_table(Table::drop().table(CacheEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CacheEntries {
    Table,
    CacheKey,
    Payload,
    FetchedAt,
}
