// ==========================================
// 游戏收藏导入系统 - 合并规划器
// ==========================================
// 职责: 原始行 + 映射配置 → 标准化记录
// 规则:
// - 常量绑定 → 常量值
// - 列绑定 → 颜色标记命中值映射 > 单元格值命中值映射 > 原值透传
// - 未绑定 → null
// 纯函数: 不访问存储，结果只取决于输入
// ==========================================

use crate::domain::game::{FieldValue, GameRecord};
use crate::domain::sheet::{Cell, RowRecord, Sheet};
use crate::domain::types::{GameStatus, TargetField};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::ValueParseError;
use crate::importer::mapping::{FieldBinding, MappingConfiguration, RawKey, ValueMap};

/// 单行规划结果
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedRow {
    /// 标准化成功
    Record { row_index: usize, record: GameRecord },
    /// 标题为空
    MissingTitle { row_index: usize },
    /// 值转换失败
    ParseFailed(ValueParseError),
}

impl PlannedRow {
    pub fn row_index(&self) -> usize {
        match self {
            PlannedRow::Record { row_index, .. } => *row_index,
            PlannedRow::MissingTitle { row_index } => *row_index,
            PlannedRow::ParseFailed(e) => e.row_index,
        }
    }
}

// ==========================================
// MergePlanner
// ==========================================
#[derive(Debug, Clone)]
pub struct MergePlanner {
    cleaner: DataCleaner,
    default_status: GameStatus,
}

impl MergePlanner {
    /// # 参数
    /// - cleaner: 数据清洗器（携带合法枚举值）
    /// - default_status: 状态为空时使用的状态
    pub fn new(cleaner: DataCleaner, default_status: GameStatus) -> Self {
        Self {
            cleaner,
            default_status,
        }
    }

    /// 标准化整张工作表（行号从 0 开始）
    pub fn normalize(&self, sheet: &Sheet, mapping: &MappingConfiguration) -> Vec<PlannedRow> {
        sheet
            .rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| self.normalize_row(row_index, row, mapping))
            .collect()
    }

    /// 标准化单行
    pub fn normalize_row(
        &self,
        row_index: usize,
        row: &RowRecord,
        mapping: &MappingConfiguration,
    ) -> PlannedRow {
        let mut title: Option<String> = None;
        let mut status = self.default_status;
        let mut values: Vec<(TargetField, FieldValue)> = Vec::new();

        for field in TargetField::ALL {
            let raw = self.resolve_raw(row, field, mapping);
            let value = match self.cleaner.coerce(field, raw.as_deref()) {
                Ok(v) => v,
                Err(message) => {
                    return PlannedRow::ParseFailed(ValueParseError {
                        row_index,
                        field,
                        raw: raw.unwrap_or_default(),
                        message,
                    })
                }
            };

            match (field, value) {
                (TargetField::Title, FieldValue::Text(t)) => title = Some(t),
                (TargetField::Status, FieldValue::Status(s)) => status = s,
                (TargetField::Title | TargetField::Status, _) => {}
                (_, FieldValue::Null) => {}
                (f, v) => values.push((f, v)),
            }
        }

        let title = match title {
            Some(t) => t,
            None => return PlannedRow::MissingTitle { row_index },
        };

        let mut record = GameRecord::new(title, status);
        for (field, value) in values {
            record.set_field(field, value);
        }

        PlannedRow::Record { row_index, record }
    }

    /// 取字段原始文本（已应用值映射）
    fn resolve_raw(
        &self,
        row: &RowRecord,
        field: TargetField,
        mapping: &MappingConfiguration,
    ) -> Option<String> {
        match mapping.binding(field) {
            FieldBinding::Constant(value) => Some(value.clone()),
            FieldBinding::Unset => None,
            FieldBinding::Column(column) => {
                let cell = row.get(column)?;
                match mapping.value_map(field) {
                    Some(value_map) => {
                        Self::lookup(cell, value_map).or_else(|| cell.value.clone())
                    }
                    None => cell.value.clone(),
                }
            }
        }
    }

    fn lookup(cell: &Cell, value_map: &ValueMap) -> Option<String> {
        let has_tag_keys = value_map.keys().any(RawKey::is_tag);
        let by_tag = cell
            .tag
            .as_deref()
            .filter(|t| has_tag_keys && !t.trim().is_empty())
            .and_then(|t| value_map.get(&RawKey::tag(t)));

        by_tag
            .or_else(|| {
                cell.value
                    .as_deref()
                    .and_then(|v| value_map.get(&RawKey::value(v)))
            })
            .cloned()
    }
}
