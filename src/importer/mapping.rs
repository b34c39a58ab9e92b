// ==========================================
// 游戏收藏导入系统 - 列映射配置
// ==========================================
// 职责: 目标字段 ← 源列 / 常量 / 值映射
// 约束:
// - 同一字段列绑定与常量绑定互斥（单一 FieldBinding 变体）
// - 常量绑定的字段不存在值映射
// ==========================================

use crate::domain::sheet::Sheet;
use crate::domain::types::{FieldKind, TargetField};
use crate::importer::data_cleaner::{DataCleaner, ValidValues};
use crate::importer::error::MappingError;
use crate::importer::proposal::FieldMappingProposal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

// ==========================================
// FieldBinding - 单字段绑定
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldBinding {
    Column(String),
    Constant(String),
    #[default]
    Unset,
}

// ==========================================
// RawKey - 值映射键（单元格值 / 颜色标记）
// ==========================================
// 序列化为带前缀的字符串: "value:Terminado" / "tag:FF0000"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RawKey {
    Value(String),
    Tag(String),
}

impl RawKey {
    pub fn value(raw: &str) -> Self {
        RawKey::Value(raw.trim().to_string())
    }

    /// 颜色标记统一为 6 位大写 RGB（ARGB 取后 6 位，去掉 '#'）
    pub fn tag(raw: &str) -> Self {
        RawKey::Tag(normalize_tag(raw))
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, RawKey::Tag(_))
    }
}

pub fn normalize_tag(raw: &str) -> String {
    let cleaned = raw.trim().trim_start_matches('#').to_uppercase();
    let chars: Vec<char> = cleaned.chars().collect();
    if chars.len() > 6 {
        chars[chars.len() - 6..].iter().collect()
    } else {
        cleaned
    }
}

impl fmt::Display for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawKey::Value(v) => write!(f, "value:{}", v),
            RawKey::Tag(t) => write!(f, "tag:{}", t),
        }
    }
}

impl From<RawKey> for String {
    fn from(key: RawKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for RawKey {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        if let Some(tag) = raw.strip_prefix("tag:") {
            Ok(RawKey::tag(tag))
        } else if let Some(value) = raw.strip_prefix("value:") {
            Ok(RawKey::value(value))
        } else {
            Err(format!("值映射键缺少 value:/tag: 前缀: {}", raw))
        }
    }
}

/// 单字段值映射: 原始键 → 目标值
pub type ValueMap = BTreeMap<RawKey, String>;

// ==========================================
// MappingConfiguration
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingConfiguration {
    #[serde(default)]
    bindings: BTreeMap<TargetField, FieldBinding>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    value_maps: BTreeMap<TargetField, ValueMap>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    alternatives: BTreeMap<TargetField, Vec<String>>,
}

impl MappingConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据映射建议生成默认配置
    ///
    /// # 参数
    /// - sheet: 工作表（用于过滤不存在的列）
    /// - proposals: 映射建议
    /// - min_confidence: 置信度必须严格大于该值才自动绑定
    ///
    /// # 说明
    /// - 按置信度从高到低分配，同一列只绑定一个字段
    /// - 不生成常量绑定
    /// - 备选列保留给用户手动调整
    pub fn propose_default(
        sheet: &Sheet,
        proposals: &[FieldMappingProposal],
        min_confidence: u8,
    ) -> Self {
        let mut config = Self::new();

        let mut ranked: Vec<&FieldMappingProposal> = proposals.iter().collect();
        ranked.sort_by(|a, b| b.confidence.cmp(&a.confidence));

        let mut claimed: HashSet<&str> = HashSet::new();
        for proposal in ranked {
            let candidates: Vec<String> = proposal
                .column
                .iter()
                .chain(proposal.alternatives.iter())
                .filter(|c| sheet.has_header(c))
                .cloned()
                .collect();

            let selected = proposal
                .column
                .as_deref()
                .filter(|c| sheet.has_header(c))
                .filter(|c| !claimed.contains(c))
                .filter(|_| proposal.confidence > min_confidence)
                .filter(|_| !config.bindings.contains_key(&proposal.field));

            if let Some(column) = selected {
                claimed.insert(column);
                config.set_column(proposal.field, Some(column));
                config.alternatives.insert(
                    proposal.field,
                    candidates.into_iter().filter(|c| c != column).collect(),
                );
            } else if !candidates.is_empty() {
                config
                    .alternatives
                    .entry(proposal.field)
                    .or_insert(candidates);
            }
        }

        config
    }

    /// 设置列绑定（清除常量绑定）；None 表示取消绑定
    pub fn set_column(&mut self, field: TargetField, column: Option<&str>) {
        match column {
            Some(c) => {
                self.bindings
                    .insert(field, FieldBinding::Column(c.to_string()));
            }
            None => {
                self.bindings.remove(&field);
            }
        }
    }

    /// 设置常量绑定（清除列绑定与值映射）；None 表示取消绑定
    pub fn set_constant(&mut self, field: TargetField, value: Option<&str>) {
        self.value_maps.remove(&field);
        match value {
            Some(v) => {
                self.bindings
                    .insert(field, FieldBinding::Constant(v.to_string()));
            }
            None => {
                self.bindings.remove(&field);
            }
        }
    }

    /// 插入或覆盖一条值映射
    ///
    /// # 错误
    /// - MappingError::ValueMapWithConstant: 字段已绑定常量
    pub fn set_value_map(
        &mut self,
        field: TargetField,
        raw_key: RawKey,
        target_value: &str,
    ) -> Result<(), MappingError> {
        if matches!(self.binding(field), FieldBinding::Constant(_)) {
            return Err(MappingError::ValueMapWithConstant { field });
        }
        self.value_maps
            .entry(field)
            .or_default()
            .insert(raw_key, target_value.to_string());
        Ok(())
    }

    pub fn binding(&self, field: TargetField) -> &FieldBinding {
        static UNSET: FieldBinding = FieldBinding::Unset;
        self.bindings.get(&field).unwrap_or(&UNSET)
    }

    pub fn value_map(&self, field: TargetField) -> Option<&ValueMap> {
        self.value_maps.get(&field).filter(|m| !m.is_empty())
    }

    pub fn alternatives(&self, field: TargetField) -> &[String] {
        self.alternatives
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 运行前校验
    ///
    /// # 错误
    /// - MissingTitle: title 既无列绑定也无非空常量
    /// - UnknownColumn: 列绑定指向不存在的表头
    /// - InvalidConstant: 常量无法转换为字段类型（枚举需在合法取值内）
    /// - ValueMapWithConstant: 常量绑定字段存在值映射
    /// - InvalidValueMapTarget: 值映射目标无法转换为字段类型
    pub fn validate(&self, sheet: &Sheet, valid: &ValidValues) -> Result<(), MappingError> {
        let cleaner = DataCleaner::new(valid.clone());

        match self.binding(TargetField::Title) {
            FieldBinding::Unset => return Err(MappingError::MissingTitle),
            FieldBinding::Constant(v) if v.trim().is_empty() => {
                return Err(MappingError::MissingTitle)
            }
            _ => {}
        }

        for (field, binding) in &self.bindings {
            match binding {
                FieldBinding::Column(column) => {
                    if !sheet.has_header(column) {
                        return Err(MappingError::UnknownColumn {
                            field: *field,
                            column: column.clone(),
                        });
                    }
                }
                FieldBinding::Constant(value) => {
                    if self.value_map(*field).is_some() {
                        return Err(MappingError::ValueMapWithConstant { field: *field });
                    }
                    if cleaner.coerce(*field, Some(value)).is_err() {
                        return Err(MappingError::InvalidConstant {
                            field: *field,
                            value: value.clone(),
                        });
                    }
                }
                FieldBinding::Unset => {}
            }
        }

        for (field, value_map) in &self.value_maps {
            for target in value_map.values() {
                if field.kind() == FieldKind::Text {
                    continue;
                }
                if cleaner.coerce(*field, Some(target)).is_err() {
                    return Err(MappingError::InvalidValueMapTarget {
                        field: *field,
                        value: target.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Sheet {
        Sheet::new(
            "Backlog",
            vec!["Name".into(), "Hype".into(), "Estado".into()],
        )
    }

    #[test]
    fn test_raw_key_tag_normalization() {
        assert_eq!(RawKey::tag("#ff0000"), RawKey::Tag("FF0000".into()));
        assert_eq!(RawKey::tag("FFFF0000"), RawKey::Tag("FF0000".into()));
        assert_eq!(RawKey::value(" Terminado "), RawKey::Value("Terminado".into()));
        assert_eq!(String::from(RawKey::tag("00ff00")), "tag:00FF00");
        assert!(RawKey::try_from("Terminado".to_string()).is_err());
    }

    #[test]
    fn test_column_and_constant_exclusive() {
        let mut config = MappingConfiguration::new();
        config.set_column(TargetField::Status, Some("Estado"));
        config
            .set_value_map(TargetField::Status, RawKey::tag("FF0000"), "finished")
            .unwrap();

        config.set_constant(TargetField::Status, Some("finished"));
        assert_eq!(
            config.binding(TargetField::Status),
            &FieldBinding::Constant("finished".into())
        );
        assert!(config.value_map(TargetField::Status).is_none());

        config.set_column(TargetField::Status, Some("Estado"));
        assert_eq!(
            config.binding(TargetField::Status),
            &FieldBinding::Column("Estado".into())
        );

        config.set_column(TargetField::Status, None);
        assert_eq!(config.binding(TargetField::Status), &FieldBinding::Unset);
    }

    #[test]
    fn test_value_map_rejected_on_constant() {
        let mut config = MappingConfiguration::new();
        config.set_constant(TargetField::Status, Some("backlog"));
        let err = config
            .set_value_map(TargetField::Status, RawKey::value("x"), "finished")
            .unwrap_err();
        assert_eq!(
            err,
            MappingError::ValueMapWithConstant {
                field: TargetField::Status
            }
        );
    }

    #[test]
    fn test_validate_requires_title() {
        let config = MappingConfiguration::new();
        assert_eq!(
            config.validate(&sheet(), &ValidValues::default()),
            Err(MappingError::MissingTitle)
        );

        let mut config = MappingConfiguration::new();
        config.set_constant(TargetField::Title, Some("Celeste"));
        assert_eq!(config.validate(&sheet(), &ValidValues::default()), Ok(()));
    }

    #[test]
    fn test_validate_constant_vocabulary() {
        let mut config = MappingConfiguration::new();
        config.set_column(TargetField::Title, Some("Name"));
        config.set_constant(TargetField::Status, Some("terminado"));
        assert_eq!(
            config.validate(&sheet(), &ValidValues::default()),
            Err(MappingError::InvalidConstant {
                field: TargetField::Status,
                value: "terminado".into()
            })
        );

        config.set_constant(TargetField::Status, Some("Finished"));
        assert_eq!(config.validate(&sheet(), &ValidValues::default()), Ok(()));
    }

    #[test]
    fn test_validate_unknown_column_and_value_map_target() {
        let mut config = MappingConfiguration::new();
        config.set_column(TargetField::Title, Some("Título"));
        assert!(matches!(
            config.validate(&sheet(), &ValidValues::default()),
            Err(MappingError::UnknownColumn { .. })
        ));

        config.set_column(TargetField::Title, Some("Name"));
        config.set_column(TargetField::Progress, Some("Estado"));
        config
            .set_value_map(TargetField::Progress, RawKey::value("half"), "Medio")
            .unwrap();
        assert!(matches!(
            config.validate(&sheet(), &ValidValues::default()),
            Err(MappingError::InvalidValueMapTarget { .. })
        ));
    }

    #[test]
    fn test_propose_default_threshold_and_unique_columns() {
        let proposals = vec![
            FieldMappingProposal {
                field: TargetField::Title,
                column: Some("Name".into()),
                confidence: 100,
                alternatives: vec!["Hype".into()],
            },
            FieldMappingProposal {
                field: TargetField::Notes,
                column: Some("Name".into()),
                confidence: 67,
                alternatives: vec![],
            },
            FieldMappingProposal {
                field: TargetField::HypeScore,
                column: Some("Hype".into()),
                confidence: 100,
                alternatives: vec!["Missing".into()],
            },
            FieldMappingProposal {
                field: TargetField::Status,
                column: Some("Estado".into()),
                confidence: 60,
                alternatives: vec![],
            },
        ];

        let config = MappingConfiguration::propose_default(&sheet(), &proposals, 60);

        assert_eq!(
            config.binding(TargetField::Title),
            &FieldBinding::Column("Name".into())
        );
        assert_eq!(
            config.binding(TargetField::HypeScore),
            &FieldBinding::Column("Hype".into())
        );
        assert_eq!(config.binding(TargetField::Notes), &FieldBinding::Unset);
        assert_eq!(config.binding(TargetField::Status), &FieldBinding::Unset);
        assert_eq!(config.alternatives(TargetField::Title), ["Hype".to_string()]);
        assert_eq!(config.alternatives(TargetField::Status), ["Estado".to_string()]);
        assert!(config.alternatives(TargetField::HypeScore).is_empty());
    }

    #[test]
    fn test_mapping_json_shape() {
        let json = r#"{
            "bindings": {
                "title": {"column": "Name"},
                "status": {"constant": "backlog"},
                "notes": "unset"
            },
            "value_maps": {
                "hype_score": {"value:alto": "9", "tag:FFFF0000": "10"}
            }
        }"#;
        let config: MappingConfiguration = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.binding(TargetField::Title),
            &FieldBinding::Column("Name".into())
        );
        assert_eq!(
            config.binding(TargetField::Status),
            &FieldBinding::Constant("backlog".into())
        );
        let value_map = config.value_map(TargetField::HypeScore).unwrap();
        assert_eq!(value_map.get(&RawKey::tag("FF0000")), Some(&"10".to_string()));
        assert_eq!(value_map.get(&RawKey::value("alto")), Some(&"9".to_string()));
    }
}
