//! 规范化后的游戏记录
//!
//! 这是整个引擎唯一依赖的记录类型：过滤、展示、详情页和持久化缓存都使用它。
//! 序列化格式与文档数据库中的 Game 文档一致（camelCase 字段，分类使用完整标签）。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::facets::{AgeGroup, Duration, Facet, FacetFamily, GameFunction, GroupPhase, GroupSize, Location};

/// 游戏记录
///
/// 只能由规范化函数或缓存反序列化得到，`name` 保证非空。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    // === 基础信息 ===
    pub name: String,
    #[serde(default, alias = "otherNames")]
    pub alternative_names: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub rules: String,
    #[serde(default)]
    pub materials: String,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub source_link: String,

    // === 分类维度 ===
    #[serde(default)]
    pub location: BTreeSet<Location>,
    #[serde(default)]
    pub group_phase: BTreeSet<GroupPhase>,
    #[serde(default, alias = "age")]
    pub age_group: BTreeSet<AgeGroup>,
    #[serde(default)]
    pub group_size: BTreeSet<GroupSize>,
    #[serde(default, alias = "length")]
    pub duration: BTreeSet<Duration>,
    /// 按数据源顺序保存（最多 3 个，无重复）
    #[serde(default)]
    pub game_function: Vec<GameFunction>,

    // === 评分（冗余聚合数据） ===
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub rating_count: u32,
}

impl GameRecord {
    /// 创建只有名称的空记录；名称为空白时返回 None
    pub fn named(name: impl Into<String>) -> Option<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            alternative_names: String::new(),
            goal: String::new(),
            rules: String::new(),
            materials: String::new(),
            source_name: String::new(),
            source_link: String::new(),
            location: BTreeSet::new(),
            group_phase: BTreeSet::new(),
            age_group: BTreeSet::new(),
            group_size: BTreeSet::new(),
            duration: BTreeSet::new(),
            game_function: Vec::new(),
            average_rating: None,
            rating_count: 0,
        })
    }

    /// 指定维度的完整标签，按词表顺序
    pub fn labels(&self, family: FacetFamily) -> Vec<&'static str> {
        match family {
            FacetFamily::Location => labels_of(&self.location, Location::label),
            FacetFamily::GroupPhase => labels_of(&self.group_phase, GroupPhase::label),
            FacetFamily::AgeGroup => labels_of(&self.age_group, AgeGroup::label),
            FacetFamily::GroupSize => labels_of(&self.group_size, GroupSize::label),
            FacetFamily::Duration => labels_of(&self.duration, Duration::label),
            FacetFamily::GameFunction => {
                let ordered: BTreeSet<GameFunction> = self.game_function.iter().copied().collect();
                labels_of(&ordered, GameFunction::label)
            }
        }
    }

    /// 指定维度的短标签，按词表顺序
    pub fn short_labels(&self, family: FacetFamily) -> Vec<&'static str> {
        match family {
            FacetFamily::Location => labels_of(&self.location, Location::short_label),
            FacetFamily::GroupPhase => labels_of(&self.group_phase, GroupPhase::short_label),
            FacetFamily::AgeGroup => labels_of(&self.age_group, AgeGroup::short_label),
            FacetFamily::GroupSize => labels_of(&self.group_size, GroupSize::short_label),
            FacetFamily::Duration => labels_of(&self.duration, Duration::short_label),
            FacetFamily::GameFunction => {
                let ordered: BTreeSet<GameFunction> = self.game_function.iter().copied().collect();
                labels_of(&ordered, GameFunction::short_label)
            }
        }
    }
}

fn labels_of<T: Facet>(set: &BTreeSet<T>, f: fn(T) -> &'static str) -> Vec<&'static str> {
    set.iter().copied().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_rejects_blank_names() {
        assert!(GameRecord::named("   ").is_none());
        assert_eq!(GameRecord::named("  Bomba ").unwrap().name, "Bomba");
    }

    #[test]
    fn deserializes_document_store_shape() {
        let json = r#"{
            "name": "Névlánc",
            "otherNames": "Névkígyó",
            "goal": "Nevek megtanulása",
            "location": ["Beltéren játszható"],
            "age": ["6-10", "11-13"],
            "length": ["3-10p"],
            "gameFunction": ["Névtanulós gyakorlatok"],
            "averageRating": 4.5,
            "ratingCount": 2
        }"#;
        let record: GameRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.alternative_names, "Névkígyó");
        assert!(record.location.contains(&Location::Indoor));
        assert_eq!(record.age_group.len(), 2);
        assert!(record.duration.contains(&Duration::Short));
        assert_eq!(record.game_function, vec![GameFunction::NameLearning]);
        assert_eq!(record.average_rating, Some(4.5));
        assert_eq!(record.rating_count, 2);
    }

    #[test]
    fn function_labels_use_vocabulary_order() {
        let mut record = GameRecord::named("X").unwrap();
        record.game_function = vec![GameFunction::TensionRelief, GameFunction::NameLearning];
        assert_eq!(
            record.labels(FacetFamily::GameFunction),
            vec!["Névtanulós gyakorlatok", "Feszültségoldó"]
        );
    }
}
