//! 过滤引擎
//!
//! 组合规则：
//! - 同一维度内为 OR：记录的取值集合与选中集合有交集即通过
//! - 维度之间、维度与文本搜索之间为 AND
//! - 未选中任何取值的维度不参与过滤；记录在某维度上为空集时，永远无法通过该维度的过滤
//!
//! 过滤是纯函数：不修改记录，不跨调用保留状态，结果保持输入顺序。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entity::prelude::*;
use crate::utils::text::fold_for_search;

/// 当前的过滤选择
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSelection {
    /// 简单搜索：名称、别名、目的、规则
    pub simple_text: String,
    /// 高级搜索：在简单搜索字段之外还包括道具、来源和功能分类
    pub advanced_text: String,
    pub location: BTreeSet<Location>,
    pub group_phase: BTreeSet<GroupPhase>,
    pub age_group: BTreeSet<AgeGroup>,
    pub group_size: BTreeSet<GroupSize>,
    pub duration: BTreeSet<Duration>,
    pub game_function: BTreeSet<GameFunction>,
}

impl FilterSelection {
    /// 没有任何约束
    pub fn is_empty(&self) -> bool {
        self.simple_text.trim().is_empty() && !self.is_advanced_active()
    }

    /// 高级过滤是否生效（高级搜索文本或任一维度）
    pub fn is_advanced_active(&self) -> bool {
        !self.advanced_text.trim().is_empty() || self.active_facet_count() > 0
    }

    /// 生效的维度数量
    pub fn active_facet_count(&self) -> usize {
        [
            self.location.is_empty(),
            self.group_phase.is_empty(),
            self.age_group.is_empty(),
            self.group_size.is_empty(),
            self.duration.is_empty(),
            self.game_function.is_empty(),
        ]
        .iter()
        .filter(|empty| !**empty)
        .count()
    }

    /// 一次性清空所有选择
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// 预处理后的过滤条件
///
/// 搜索文本只折叠一次，之后对每条记录复用。
pub struct CompiledFilter<'s> {
    selection: &'s FilterSelection,
    simple_needle: Option<String>,
    advanced_needle: Option<String>,
}

impl<'s> CompiledFilter<'s> {
    pub fn new(selection: &'s FilterSelection) -> Self {
        Self {
            selection,
            simple_needle: needle(&selection.simple_text),
            advanced_needle: needle(&selection.advanced_text),
        }
    }

    pub fn matches(&self, record: &GameRecord) -> bool {
        self.matches_text(record) && self.matches_facets(record)
    }

    fn matches_text(&self, record: &GameRecord) -> bool {
        if let Some(needle) = &self.simple_needle {
            if !simple_haystack(record).contains(needle.as_str()) {
                return false;
            }
        }
        if let Some(needle) = &self.advanced_needle {
            if !advanced_haystack(record).contains(needle.as_str()) {
                return false;
            }
        }
        true
    }

    fn matches_facets(&self, record: &GameRecord) -> bool {
        let s = self.selection;
        intersects(&s.location, &record.location)
            && intersects(&s.group_phase, &record.group_phase)
            && intersects(&s.age_group, &record.age_group)
            && intersects(&s.group_size, &record.group_size)
            && intersects(&s.duration, &record.duration)
            && (s.game_function.is_empty()
                || record
                    .game_function
                    .iter()
                    .any(|function| s.game_function.contains(function)))
    }
}

/// 计算可见记录，保持输入顺序
pub fn compute_visible<'a>(records: &'a [GameRecord], selection: &FilterSelection) -> Vec<&'a GameRecord> {
    if selection.is_empty() {
        return records.iter().collect();
    }
    let filter = CompiledFilter::new(selection);
    records.iter().filter(|record| filter.matches(record)).collect()
}

fn needle(text: &str) -> Option<String> {
    let folded = fold_for_search(text.trim());
    (!folded.is_empty()).then_some(folded)
}

/// 未选中时不约束；选中时要求有交集
fn intersects<T: Ord>(selected: &BTreeSet<T>, values: &BTreeSet<T>) -> bool {
    selected.is_empty() || !selected.is_disjoint(values)
}

fn simple_haystack(record: &GameRecord) -> String {
    fold_for_search(
        &[
            record.name.as_str(),
            record.alternative_names.as_str(),
            record.goal.as_str(),
            record.rules.as_str(),
        ]
        .join(" "),
    )
}

fn advanced_haystack(record: &GameRecord) -> String {
    let mut fields = vec![
        record.name.as_str(),
        record.alternative_names.as_str(),
        record.goal.as_str(),
        record.rules.as_str(),
        record.materials.as_str(),
        record.source_name.as_str(),
        record.source_link.as_str(),
    ];
    fields.extend(record.game_function.iter().map(|function| function.label()));
    fold_for_search(&fields.join(" "))
}
