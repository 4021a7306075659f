//! 游戏列表控制器
//!
//! 持有记录快照、过滤选择、分页位置和详情状态。每次选择变化后重新计算可见记录并回到第一页。

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::cache::LoadState;
use crate::catalog::filter::{CompiledFilter, FilterSelection};
use crate::catalog::session::DetailView;
use crate::catalog::view::{Page, Pager};
use crate::entity::prelude::GameRecord;

/// 列表区域应显示的内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViewState {
    Loading,
    Failed { message: String },
    /// 有数据但没有匹配当前过滤条件的记录
    NoResults,
    Results { shown: usize, total: usize },
}

pub struct CatalogBrowser {
    records: Arc<[GameRecord]>,
    loaded: bool,
    selection: FilterSelection,
    /// 可见记录在 `records` 中的下标
    visible: Vec<usize>,
    pager: Pager,
    detail: DetailView,
}

impl Default for CatalogBrowser {
    fn default() -> Self {
        Self::new(Pager::default().page_size())
    }
}

impl CatalogBrowser {
    pub fn new(page_size: usize) -> Self {
        Self {
            records: Arc::from(Vec::new()),
            loaded: false,
            selection: FilterSelection::default(),
            visible: Vec::new(),
            pager: Pager::new(page_size),
            detail: DetailView::new(),
        }
    }

    /// 替换记录快照（加载或刷新完成后）
    pub fn set_records(&mut self, records: Arc<[GameRecord]>) {
        self.records = records;
        self.loaded = true;
        self.recompute();
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn update_selection(&mut self, update: impl FnOnce(&mut FilterSelection)) {
        update(&mut self.selection);
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.update_selection(FilterSelection::clear);
    }

    pub fn visible(&self) -> Vec<&GameRecord> {
        self.visible.iter().map(|&index| &self.records[index]).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn current_page(&self) -> Page<&GameRecord> {
        self.pager.slice(&self.visible())
    }

    pub fn set_page(&mut self, page: usize) {
        self.pager.set_page(page);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pager.set_page_size(page_size);
    }

    /// 打开可见列表中第 `visible_index` 条记录的详情；下标越界时返回 false
    pub fn open_row(&mut self, visible_index: usize) -> bool {
        let Some(&index) = self.visible.get(visible_index) else {
            return false;
        };
        self.detail.select(self.records[index].clone());
        true
    }

    pub fn close_detail(&mut self) {
        self.detail.deselect();
    }

    pub fn detail(&self) -> &DetailView {
        &self.detail
    }

    pub fn view_state(&self, load_state: &LoadState) -> ViewState {
        match load_state {
            LoadState::Loading => ViewState::Loading,
            LoadState::Failed(message) => ViewState::Failed {
                message: message.clone(),
            },
            LoadState::Idle if !self.loaded => ViewState::Loading,
            _ if self.visible.is_empty() => ViewState::NoResults,
            _ => ViewState::Results {
                shown: self.visible.len(),
                total: self.records.len(),
            },
        }
    }

    fn recompute(&mut self) {
        self.visible = if self.selection.is_empty() {
            (0..self.records.len()).collect()
        } else {
            let filter = CompiledFilter::new(&self.selection);
            self.records
                .iter()
                .enumerate()
                .filter(|(_, record)| filter.matches(record))
                .map(|(index, _)| index)
                .collect()
        };
        self.pager.reset();
        log::debug!("过滤结果: {}/{}", self.visible.len(), self.records.len());
    }
}
