//! 原始数据源
//!
//! 数据源只负责把表格取回来并切成原始行（`RawRow`），不做任何字段解释；
//! 字段解释由 `normalize` 完成。

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// 一行原始数据，按来源形态区分
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRow {
    /// 按列位置排列的单元格（已发布表格的固定 28 列布局）
    Positional(Vec<String>),
    /// 列名 → 单元格值
    Keyed(BTreeMap<String, String>),
}

/// 标签数组合并为单元格时使用的分隔符（标签本身可能含有 `/`，但不会含有换行）
pub const LIST_SEPARATOR: char = '\n';

impl RawRow {
    /// 从文档数据库导出的 JSON 对象构建列名形态的行
    ///
    /// 字符串原样保留，布尔值和数字转为字符串，字符串数组按 [`LIST_SEPARATOR`] 合并，其余类型忽略。
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let cells = object
            .iter()
            .filter_map(|(key, value)| {
                let cell = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    serde_json::Value::Number(n) => n.to_string(),
                    // 标签数组：只保留字符串元素，合并为一个单元格
                    serde_json::Value::Array(items) => items
                        .iter()
                        .filter_map(serde_json::Value::as_str)
                        .collect::<Vec<_>>()
                        .join(&LIST_SEPARATOR.to_string()),
                    _ => return None,
                };
                Some((key.clone(), cell))
            })
            .collect();
        Some(RawRow::Keyed(cells))
    }
}

/// 表格布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceLayout {
    /// 固定列位置，跳过开头的若干表头行
    Positional { header_rows: usize },
    /// 双行表头：`field_row` 之前的行（分类行）被跳过，`field_row` 行提供列名
    Headed { field_row: usize },
}

impl Default for SourceLayout {
    fn default() -> Self {
        SourceLayout::Positional { header_rows: 3 }
    }
}

/// 按布局把二维表格切成原始行
///
/// 完全空白的行被丢弃。
pub fn rows_from_table(table: Vec<Vec<String>>, layout: &SourceLayout) -> Vec<RawRow> {
    let non_blank = |row: &Vec<String>| row.iter().any(|cell| !cell.trim().is_empty());

    match *layout {
        SourceLayout::Positional { header_rows } => table
            .into_iter()
            .skip(header_rows)
            .filter(non_blank)
            .map(RawRow::Positional)
            .collect(),
        SourceLayout::Headed { field_row } => {
            let mut rows = table.into_iter().skip(field_row);
            let Some(headers) = rows.next() else {
                return Vec::new();
            };
            let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

            rows.filter(non_blank)
                .map(|row| {
                    let cells = headers
                        .iter()
                        .zip(row)
                        .filter(|(header, _)| !header.is_empty())
                        .map(|(header, cell)| (header.clone(), cell))
                        .collect();
                    RawRow::Keyed(cells)
                })
                .collect()
        }
    }
}

/// 解析 CSV 文本为二维表格（允许各行列数不同）
pub fn parse_csv(text: &str) -> Result<Vec<Vec<String>>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut table = Vec::new();
    for record in reader.records() {
        let record = record?;
        table.push(record.iter().map(str::to_string).collect());
    }
    Ok(table)
}

/// 原始行的提供者
pub trait RowSource: Send + Sync {
    fn fetch_rows(&self) -> impl Future<Output = Result<Vec<RawRow>, CatalogError>> + Send;
}

/// 通过 HTTP 获取已发布的 CSV 表格
pub struct HttpCsvSource {
    client: reqwest::Client,
    url: String,
    layout: SourceLayout,
}

impl HttpCsvSource {
    pub fn new(url: impl Into<String>, layout: SourceLayout, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("somer-games/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::SourceFetch(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            layout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RowSource for HttpCsvSource {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, CatalogError> {
        log::info!("从表格拉取游戏数据: {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "text/csv,text/plain;q=0.9,*/*;q=0.1")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::SourceStatus(status.as_u16()));
        }

        let text = response.text().await?;
        let table = parse_csv(&text)?;
        let rows = rows_from_table(table, &self.layout);
        log::debug!("表格解析完成，共 {} 行数据", rows.len());
        Ok(rows)
    }
}

/// 内存中的原始行（文档数据库导出、嵌入式使用）
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    rows: Vec<RawRow>,
}

impl StaticSource {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    /// 从 JSON 数组构建；非对象元素被忽略
    pub fn from_json_array(value: &serde_json::Value) -> Self {
        let rows = value
            .as_array()
            .map(|items| items.iter().filter_map(RawRow::from_json).collect())
            .unwrap_or_default();
        Self { rows }
    }
}

impl RowSource for StaticSource {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, CatalogError> {
        Ok(self.rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn positional_layout_skips_header_rows_and_blank_lines() {
        let t = table(&[
            &["Alapadatok", "", ""],
            &["Játék neve", "További nevek", "Cél"],
            &["", "", "megjegyzés"],
            &["Bomba", "", "Figyelem"],
            &["", " ", ""],
            &["Névlánc", "Névkígyó", ""],
        ]);
        let rows = rows_from_table(t, &SourceLayout::Positional { header_rows: 3 });
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            RawRow::Positional(vec!["Bomba".into(), "".into(), "Figyelem".into()])
        );
    }

    #[test]
    fn headed_layout_uses_field_row_as_keys() {
        let t = table(&[
            &["Alapadatok", "", "Tér"],
            &["name", "goal", " outdoorSpace "],
            &["Bomba", "Figyelem", "TRUE"],
            &["Rövid"],
        ]);
        let rows = rows_from_table(t, &SourceLayout::Headed { field_row: 1 });
        assert_eq!(rows.len(), 2);
        let RawRow::Keyed(first) = &rows[0] else {
            panic!("expected keyed row");
        };
        assert_eq!(first.get("outdoorSpace").map(String::as_str), Some("TRUE"));
        let RawRow::Keyed(second) = &rows[1] else {
            panic!("expected keyed row");
        };
        assert_eq!(second.len(), 1);
        assert_eq!(second.get("name").map(String::as_str), Some("Rövid"));
    }

    #[test]
    fn headed_layout_without_field_row_yields_nothing() {
        let rows = rows_from_table(table(&[&["x"]]), &SourceLayout::Headed { field_row: 3 });
        assert!(rows.is_empty());
    }

    #[test]
    fn parse_csv_handles_quotes_and_ragged_rows() {
        let text = "a,b,c\n\"Bomba, a játék\",\"idézet \"\"x\"\"\"\nutolsó\n";
        let t = parse_csv(text).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t[1], vec!["Bomba, a játék".to_string(), "idézet \"x\"".to_string()]);
        assert_eq!(t[2], vec!["utolsó".to_string()]);
    }

    #[test]
    fn from_json_keeps_scalars_and_label_arrays() {
        let value = serde_json::json!({
            "name": "Bomba",
            "outdoorSpace": true,
            "ratingCount": 3,
            "gameFunction": ["Feszültségoldó", 7, "Mozgás-verseny"],
            "status": null,
            "meta": { "a": 1 }
        });
        let RawRow::Keyed(cells) = RawRow::from_json(&value).unwrap() else {
            panic!("expected keyed row");
        };
        assert_eq!(cells.get("outdoorSpace").map(String::as_str), Some("true"));
        assert_eq!(cells.get("ratingCount").map(String::as_str), Some("3"));
        assert_eq!(
            cells.get("gameFunction").map(String::as_str),
            Some("Feszültségoldó\nMozgás-verseny")
        );
        assert!(!cells.contains_key("status"));
        assert!(!cells.contains_key("meta"));
    }

    #[tokio::test]
    async fn static_source_returns_its_rows() {
        let source = StaticSource::from_json_array(&serde_json::json!([{ "name": "A" }, 5]));
        let rows = source.fetch_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
