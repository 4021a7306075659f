//! 展示层投影
//!
//! 把记录转换成界面需要的形态：分类标签、截断文本和分页。这里的函数都不修改输入。

use serde::Serialize;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::entity::prelude::*;

/// 截断后追加的省略号
pub const ELLIPSIS: char = '…';

/// 记录在指定维度上的完整标签，按词表顺序
pub fn tags_for(record: &GameRecord, family: FacetFamily) -> Vec<&'static str> {
    record.labels(family)
}

/// 表格单元格中的摘要：短标签用 ", " 连接，没有取值时显示 "-"
pub fn facet_summary(record: &GameRecord, family: FacetFamily) -> String {
    let labels = record.short_labels(family);
    if labels.is_empty() {
        "-".to_string()
    } else {
        labels.join(", ")
    }
}

/// 按字符数截断文本
///
/// 未超长时原样返回；超长时保留前 `max_len - 1` 个字符并追加省略号，总长度恰好为 `max_len`。
pub fn truncate(text: Option<&str>, max_len: usize) -> String {
    let Some(text) = text else {
        return String::new();
    };
    if max_len == 0 {
        return String::new();
    }
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_len - 1).collect();
    truncated.push(ELLIPSIS);
    truncated
}

/// 一页数据
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 从 1 开始的页码
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

/// 分页，页码从 1 开始
///
/// 页码为 0 或超出总页数时返回空页；`page_size` 为 0 时没有任何页。
/// 传入引用切片（如过滤结果 `&[&GameRecord]`）时只复制引用。
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let total_count = items.len();
    if page_size == 0 {
        return Page {
            items: Vec::new(),
            page,
            total_pages: 0,
            total_count,
        };
    }

    let total_pages = total_count.div_ceil(page_size);
    let items = if page == 0 || page > total_pages {
        Vec::new()
    } else {
        items
            .iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect()
    };

    Page {
        items,
        page,
        total_pages,
        total_count,
    }
}

/// 分页位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self { page: 1, page_size }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// 修改每页条数后回到第一页
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.page = 1;
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn slice<T: Clone>(&self, items: &[T]) -> Page<T> {
        paginate(items, self.page, self.page_size)
    }
}
