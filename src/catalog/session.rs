//! 详情页选择状态

use crate::entity::prelude::GameRecord;

/// 当前打开详情的游戏
///
/// 是否打开由是否有选中记录决定，不会出现"打开但没有记录"或"关闭但残留记录"的状态。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailView {
    selected: Option<GameRecord>,
}

impl DetailView {
    pub fn new() -> Self {
        Self::default()
    }

    /// 打开详情；已打开时直接替换
    pub fn select(&mut self, record: GameRecord) {
        log::debug!("打开游戏详情: {}", record.name);
        self.selected = Some(record);
    }

    /// 关闭详情并清除选中记录
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<&GameRecord> {
        self.selected.as_ref()
    }
}
