//! 原始行 → 规范化游戏记录
//!
//! 纯函数，不做任何 I/O。名称为空的行在这里被丢弃，下游永远不会看到无名记录。

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::source::{RawRow, LIST_SEPARATOR};
use crate::entity::prelude::*;

/// 布尔单元格中视为"真"的取值（去除空白并转小写后比较）
pub const TRUTHY_TOKENS: [&str; 3] = ["true", "igaz", "1"];

/// 解析布尔单元格，缺失或任何其他取值均为 false
pub fn parse_bool_facet(cell: Option<&str>) -> bool {
    cell.map(|value| {
        let value = value.trim().to_lowercase();
        TRUTHY_TOKENS.contains(&value.as_str())
    })
    .unwrap_or(false)
}

// ==================== 固定列位置布局 ====================

mod col {
    pub const NAME: usize = 0;
    pub const ALT_NAMES: usize = 1;
    pub const GOAL: usize = 2;
    pub const RULES: usize = 3;
    pub const MATERIALS: usize = 4;
    pub const SOURCE_LINK: usize = 5;
    pub const LOCATION: [usize; 2] = [6, 7];
    pub const GROUP_PHASE: [usize; 4] = [8, 9, 10, 11];
    pub const AGE_GROUP: [usize; 5] = [12, 13, 14, 15, 16];
    pub const FUNCTIONS: [usize; 3] = [17, 18, 19];
    pub const GROUP_SIZE: [usize; 4] = [20, 21, 22, 23];
    pub const DURATION: [usize; 4] = [24, 25, 26, 27];
}

// ==================== 列名布局 ====================

mod key {
    pub const NAME: &str = "name";
    pub const ALT_NAMES: &str = "altNames";
    pub const OTHER_NAMES: &str = "otherNames";
    pub const GOAL: &str = "goal";
    pub const RULES: &str = "rules";
    pub const MATERIALS: &str = "materials";
    pub const SOURCE_NAME: &str = "sourceName";
    pub const SOURCE_LINK: &str = "sourceLink";
    pub const LOCATION: [&str; 2] = ["outdoorSpace", "indoorSpace"];
    pub const GROUP_PHASE: [&str; 4] = [
        "groupPhaseForming",
        "groupPhaseStorming",
        "groupPhaseNorming",
        "groupPhasePerforming",
    ];
    pub const AGE_GROUP: [&str; 5] = ["age0to5", "age6to10", "age11to13", "age14to16", "age17plus"];
    pub const FUNCTIONS: [&str; 3] = ["function1", "function2", "function3"];
    pub const GROUP_SIZE: [&str; 4] = [
        "groupSizeSmall",
        "groupSizeMedium",
        "groupSizeLarge",
        "groupSizeCommunity",
    ];
    pub const DURATION: [&str; 4] = [
        "duration3to10",
        "duration11to20",
        "duration21to30",
        "duration30plus",
    ];
    // 文档数据库的 Game 结构：每个维度一个标签数组
    pub const LOCATION_LABELS: [&str; 1] = ["location"];
    pub const GROUP_PHASE_LABELS: [&str; 1] = ["groupPhase"];
    pub const AGE_GROUP_LABELS: [&str; 2] = ["age", "ageGroup"];
    pub const FUNCTION_LABELS: [&str; 1] = ["gameFunction"];
    pub const GROUP_SIZE_LABELS: [&str; 1] = ["groupSize"];
    pub const DURATION_LABELS: [&str; 2] = ["length", "duration"];
    pub const AVERAGE_RATING: &str = "averageRating";
    pub const RATING_COUNT: &str = "ratingCount";
}

/// 对单元格的统一访问，屏蔽两种行形态的差异
trait Cells {
    type Key: Copy;

    fn cell(&self, key: Self::Key) -> Option<&str>;

    fn text(&self, key: Self::Key) -> String {
        self.cell(key).map(|v| v.trim().to_string()).unwrap_or_default()
    }

    /// 按词表顺序逐列解析布尔单元格
    fn flags<T: Facet>(&self, keys: &[Self::Key]) -> BTreeSet<T> {
        keys.iter()
            .zip(T::all())
            .filter(|(key, _)| parse_bool_facet(self.cell(**key)))
            .map(|(_, value)| *value)
            .collect()
    }

    /// 功能分类：非空、在词表内、去重，保持数据源顺序
    fn functions(&self, keys: &[Self::Key]) -> Vec<GameFunction> {
        let mut functions = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(raw) = self.cell(*key).map(str::trim).filter(|v| !v.is_empty()) else {
                continue;
            };
            match GameFunction::from_label(raw) {
                Some(function) if !functions.contains(&function) => functions.push(function),
                Some(_) => {}
                None => log::debug!("忽略词表之外的功能分类: {}", raw),
            }
        }
        functions
    }
}

impl Cells for [String] {
    type Key = usize;

    fn cell(&self, key: usize) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl Cells for BTreeMap<String, String> {
    type Key = &'static str;

    fn cell(&self, key: &'static str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// 规范化一行原始数据；名称为空（去除空白后）时返回 None
pub fn normalize(row: &RawRow) -> Option<GameRecord> {
    match row {
        RawRow::Positional(cells) => normalize_positional(cells),
        RawRow::Keyed(cells) => normalize_keyed(cells),
    }
}

fn normalize_positional(cells: &[String]) -> Option<GameRecord> {
    let mut record = GameRecord::named(cells.text(col::NAME))?;
    record.alternative_names = cells.text(col::ALT_NAMES);
    record.goal = cells.text(col::GOAL);
    record.rules = cells.text(col::RULES);
    record.materials = cells.text(col::MATERIALS);
    record.source_link = cells.text(col::SOURCE_LINK);

    record.location = cells.flags(&col::LOCATION);
    record.group_phase = cells.flags(&col::GROUP_PHASE);
    record.age_group = cells.flags(&col::AGE_GROUP);
    record.game_function = cells.functions(&col::FUNCTIONS);
    record.group_size = cells.flags(&col::GROUP_SIZE);
    record.duration = cells.flags(&col::DURATION);
    Some(record)
}

/// 标签列表单元格：按标签（完整或短标签）查词表，保持出现顺序并去重
fn labels<T: Facet>(cells: &BTreeMap<String, String>, keys: &[&str]) -> Vec<T> {
    let mut values = Vec::new();
    let labels = keys
        .iter()
        .filter_map(|key| cells.get(*key))
        .flat_map(|cell| cell.split(LIST_SEPARATOR))
        .map(str::trim)
        .filter(|label| !label.is_empty());
    for label in labels {
        match T::from_label(label) {
            Some(value) if !values.contains(&value) => values.push(value),
            Some(_) => {}
            None => log::debug!("忽略词表之外的标签: {}", label),
        }
    }
    values
}

/// 布尔列与标签数组取并集
fn facet_set<T: Facet>(cells: &BTreeMap<String, String>, flags: &[&'static str], labelled: &[&str]) -> BTreeSet<T> {
    let mut set: BTreeSet<T> = cells.flags(flags);
    set.extend(labels::<T>(cells, labelled));
    set
}

/// 其他名称：`otherNames` 可能是 JSON 字符串数组，解码后以逗号连接
fn other_names(cells: &BTreeMap<String, String>) -> String {
    let alt = cells.text(key::ALT_NAMES);
    if !alt.is_empty() {
        return alt;
    }
    let raw = cells.text(key::OTHER_NAMES);
    if raw.starts_with('[') {
        if let Ok(names) = serde_json::from_str::<Vec<String>>(&raw) {
            let names: Vec<&str> = names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()).collect();
            return names.join(", ");
        }
    }
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn normalize_keyed(cells: &BTreeMap<String, String>) -> Option<GameRecord> {
    let mut record = GameRecord::named(cells.text(key::NAME))?;
    record.alternative_names = other_names(cells);
    record.goal = cells.text(key::GOAL);
    record.rules = cells.text(key::RULES);
    record.materials = cells.text(key::MATERIALS);
    record.source_name = cells.text(key::SOURCE_NAME);
    record.source_link = cells.text(key::SOURCE_LINK);

    record.location = facet_set(cells, &key::LOCATION, &key::LOCATION_LABELS);
    record.group_phase = facet_set(cells, &key::GROUP_PHASE, &key::GROUP_PHASE_LABELS);
    record.age_group = facet_set(cells, &key::AGE_GROUP, &key::AGE_GROUP_LABELS);
    record.group_size = facet_set(cells, &key::GROUP_SIZE, &key::GROUP_SIZE_LABELS);
    record.duration = facet_set(cells, &key::DURATION, &key::DURATION_LABELS);

    let mut functions = cells.functions(&key::FUNCTIONS);
    for function in labels::<GameFunction>(cells, &key::FUNCTION_LABELS) {
        if !functions.contains(&function) {
            functions.push(function);
        }
    }
    record.game_function = functions;

    record.average_rating = cells
        .cell(key::AVERAGE_RATING)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite());
    record.rating_count = cells
        .cell(key::RATING_COUNT)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(0);
    Some(record)
}

/// 批量规范化，保持原有顺序；无效行被跳过，不影响其余行
pub fn normalize_rows<'a, I>(rows: I) -> Vec<GameRecord>
where
    I: IntoIterator<Item = &'a RawRow>,
{
    let mut skipped = 0usize;
    let records: Vec<GameRecord> = rows
        .into_iter()
        .filter_map(|row| {
            let record = normalize(row);
            if record.is_none() {
                skipped += 1;
            }
            record
        })
        .collect();

    if skipped > 0 {
        log::debug!("跳过 {} 行没有名称的数据", skipped);
    }
    records
}
