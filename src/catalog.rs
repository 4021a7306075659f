//! 游戏目录核心
//!
//! 数据流：数据源 → 规范化 → 缓存管理 → 过滤 → 展示投影。

pub mod browser;
pub mod cache;
pub mod filter;
pub mod normalize;
pub mod session;
pub mod source;
pub mod store;
pub mod view;
