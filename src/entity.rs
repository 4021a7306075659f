//! 数据实体模块
//!
//! 包含 SeaORM 缓存表实体，以及游戏记录和分类词表的数据结构。

pub mod prelude;

// === 游戏记录（缓存 payload 中的 JSON 结构）===
pub mod facets;
pub mod game_record;

// === SeaORM 实体（对应数据库表）===
pub mod cache_entries;
