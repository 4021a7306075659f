//! 游戏分类维度（facet）词表
//!
//! 每个维度都是一个固定词表的枚举。枚举的声明顺序就是规范顺序，
//! `Ord` 由此派生，所以 `BTreeSet` 的迭代顺序即为展示顺序。
//! 序列化时使用完整标签（与文档数据库中的 Game 结构保持一致）。

use serde::{Deserialize, Serialize};

/// 分类维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacetFamily {
    Location,
    GroupPhase,
    AgeGroup,
    GameFunction,
    GroupSize,
    Duration,
}

impl FacetFamily {
    pub const ALL: [FacetFamily; 6] = [
        FacetFamily::Location,
        FacetFamily::GroupPhase,
        FacetFamily::AgeGroup,
        FacetFamily::GameFunction,
        FacetFamily::GroupSize,
        FacetFamily::Duration,
    ];

    /// 维度标题（表头、详情页）
    pub fn title(self) -> &'static str {
        match self {
            FacetFamily::Location => "Tér",
            FacetFamily::GroupPhase => "Csoportdinamikai fázis",
            FacetFamily::AgeGroup => "Korosztály",
            FacetFamily::GameFunction => "Funkció",
            FacetFamily::GroupSize => "Létszám",
            FacetFamily::Duration => "Időtartam",
        }
    }
}

/// 固定词表的公共接口
pub trait Facet: Copy + Ord + Sized + 'static {
    const FAMILY: FacetFamily;

    /// 按规范顺序排列的全部取值
    fn all() -> &'static [Self];

    /// 完整标签
    fn label(self) -> &'static str;

    /// 表格中使用的短标签
    fn short_label(self) -> &'static str;

    /// 根据完整标签或短标签查找取值（去除首尾空白后精确匹配）
    fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::all()
            .iter()
            .copied()
            .find(|v| v.label() == label || v.short_label() == label)
    }
}

macro_rules! facet_enum {
    (
        $(#[$meta:meta])*
        $name:ident : $family:ident {
            $( $variant:ident => ($label:literal, $short:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $( #[serde(rename = $label)] $variant, )+
        }

        impl Facet for $name {
            const FAMILY: FacetFamily = FacetFamily::$family;

            fn all() -> &'static [Self] {
                &[$( $name::$variant ),+]
            }

            fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            fn short_label(self) -> &'static str {
                match self {
                    $( $name::$variant => $short, )+
                }
            }
        }
    };
}

facet_enum! {
    /// 场地
    Location: Location {
        Outdoor => ("Kültéren játszható", "Kültéri"),
        Indoor => ("Beltéren játszható", "Beltéri"),
    }
}

facet_enum! {
    /// 团体动力学阶段
    GroupPhase: GroupPhase {
        Forming => ("Alakulás", "Alakulás"),
        Storming => ("Viharzás", "Viharzás"),
        Norming => ("Normázás", "Normázás"),
        Performing => ("Működés", "Működés"),
    }
}

facet_enum! {
    /// 年龄段
    AgeGroup: AgeGroup {
        UpTo5 => ("0-5", "0-5"),
        From6To10 => ("6-10", "6-10"),
        From11To13 => ("11-13", "11-13"),
        From14To16 => ("14-16", "14-16"),
        From17 => ("17+", "17+"),
    }
}

facet_enum! {
    /// 人数规模
    GroupSize: GroupSize {
        Small => ("3-5 fő", "3-5"),
        Medium => ("6-15 fő", "6-15"),
        Large => ("16-30 fő", "16-30"),
        Community => ("30+ fő", "30+"),
    }
}

facet_enum! {
    /// 时长（分钟）
    Duration: Duration {
        Short => ("3-10p", "3-10p"),
        Medium => ("11-20p", "11-20p"),
        Long => ("21-30p", "21-30p"),
        Extended => ("30+p", "30+p"),
    }
}

facet_enum! {
    /// 游戏功能分类（15 个固定类别）
    GameFunction: GameFunction {
        NameLearning => ("Névtanulós gyakorlatok", "Névtanulós gyakorlatok"),
        Acquaintance => ("Ismerkedős gyakorlatok", "Ismerkedős gyakorlatok"),
        CommunityBuilding => ("Közösségfejlesztő gyakorlatok", "Közösségfejlesztő gyakorlatok"),
        BodyContact => ("Testkontaktus gyakorlatok", "Testkontaktus gyakorlatok"),
        TrustBuilding => ("Bizalomerősítő gyakorlatok", "Bizalomerősítő gyakorlatok"),
        Empathy => (
            "Empátia gyakorlatok/Érzelmi intelligencia fejlesztő gyakorlatok",
            "Empátia gyakorlatok/Érzelmi intelligencia fejlesztő gyakorlatok"
        ),
        SelfAwareness => ("Önismereti gyakorlatok", "Önismereti gyakorlatok"),
        Situational => ("Szituációs játékok", "Szituációs játékok"),
        Concentration => ("Koncentrációs gyakorlatok", "Koncentrációs gyakorlatok"),
        ThoughtProvoking => ("Gondolkodtató gyakorlatok", "Gondolkodtató gyakorlatok"),
        MovementContest => ("Mozgás-verseny", "Mozgás-verseny"),
        Pastime => ("Időtöltő játékok", "Időtöltő játékok"),
        Teasing => ("Ugratós játékok", "Ugratós játékok"),
        Competition => ("Játékok vetélkedőhöz", "Játékok vetélkedőhöz"),
        TensionRelief => ("Feszültségoldó", "Feszültségoldó"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_accepts_long_and_short_forms() {
        assert_eq!(Location::from_label("Kültéren játszható"), Some(Location::Outdoor));
        assert_eq!(Location::from_label(" Beltéri "), Some(Location::Indoor));
        assert_eq!(GroupSize::from_label("30+"), Some(GroupSize::Community));
        assert_eq!(GroupSize::from_label("30+ fő"), Some(GroupSize::Community));
        assert_eq!(Location::from_label("kültéri"), None);
    }

    #[test]
    fn function_vocabulary_has_fifteen_entries() {
        assert_eq!(GameFunction::all().len(), 15);
        assert_eq!(
            GameFunction::from_label("Feszültségoldó"),
            Some(GameFunction::TensionRelief)
        );
    }

    #[test]
    fn serializes_as_vocabulary_label() {
        let json = serde_json::to_string(&GroupPhase::Storming).unwrap();
        assert_eq!(json, "\"Viharzás\"");
        let back: AgeGroup = serde_json::from_str("\"17+\"").unwrap();
        assert_eq!(back, AgeGroup::From17);
        assert!(serde_json::from_str::<AgeGroup>("\"99+\"").is_err());
    }

    #[test]
    fn family_titles_are_distinct_in_column_order() {
        let titles: Vec<&str> = FacetFamily::ALL.iter().map(|f| f.title()).collect();
        assert_eq!(titles.first(), Some(&"Tér"));
        assert_eq!(titles.last(), Some(&"Időtartam"));
        let unique: std::collections::BTreeSet<&str> = titles.iter().copied().collect();
        assert_eq!(unique.len(), FacetFamily::ALL.len());
        assert_eq!(Location::FAMILY, FacetFamily::ALL[0]);
        assert_eq!(Duration::FAMILY, FacetFamily::ALL[5]);
    }

    #[test]
    fn declaration_order_is_canonical_order() {
        let mut values = vec![Duration::Extended, Duration::Short, Duration::Long];
        values.sort();
        assert_eq!(values, vec![Duration::Short, Duration::Long, Duration::Extended]);
    }
}
