//! 数据传输对象 (DTO)
//!
//! 缓存存储层与缓存管理器之间交换的数据结构。

use serde::{Deserialize, Serialize};

use crate::entity::cache_entries;

/// 一条持久化的缓存记录
///
/// payload 保持原始文本，由缓存管理器负责解析；解析失败视为缓存损坏。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub payload: String,
    /// 拉取时间（Unix 毫秒）
    pub fetched_at: i64,
}

impl From<cache_entries::Model> for StoredEntry {
    fn from(model: cache_entries::Model) -> Self {
        Self {
            payload: model.payload,
            fetched_at: model.fetched_at,
        }
    }
}
