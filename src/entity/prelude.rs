//! 预导入模块
//!
//! 提供常用类型的快捷导入。

// === SeaORM 实体 ===
pub use super::cache_entries::Entity as CacheEntries;

// === 游戏记录与分类词表 ===
pub use super::facets::{
    AgeGroup, Duration, Facet, FacetFamily, GameFunction, GroupPhase, GroupSize, Location,
};
pub use super::game_record::GameRecord;
