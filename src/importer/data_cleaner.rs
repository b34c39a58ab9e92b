// ==========================================
// 游戏收藏导入系统 - 数据清洗器
// ==========================================
// 职责: TRIM / NULL 标准化 / 类型转换 / 数值范围校验
// 纯函数: 同一输入永远得到同一输出
// ==========================================

use crate::domain::game::FieldValue;
use crate::domain::types::{FieldKind, GameProgress, GameStatus, TargetField};

/// 布尔真值 / 假值（大小写不敏感）
const TRUTHY_TOKENS: [&str; 7] = ["true", "yes", "si", "sí", "1", "y", "x"];
const FALSY_TOKENS: [&str; 4] = ["false", "no", "0", "n"];

/// 年份合法范围
const MIN_YEAR: i32 = 1950;
const MAX_YEAR: i32 = 2100;

// ==========================================
// ValidValues - 枚举字段的合法取值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ValidValues {
    pub status: Vec<GameStatus>,
    pub progress: Vec<GameProgress>,
}

impl Default for ValidValues {
    fn default() -> Self {
        Self {
            status: GameStatus::ALL.to_vec(),
            progress: GameProgress::ALL.to_vec(),
        }
    }
}

impl ValidValues {
    pub fn new(status: Vec<GameStatus>, progress: Vec<GameProgress>) -> Self {
        Self { status, progress }
    }
}

// ==========================================
// DataCleaner
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DataCleaner {
    valid: ValidValues,
}

impl DataCleaner {
    pub fn new(valid: ValidValues) -> Self {
        Self { valid }
    }

    /// 去除首尾空白
    pub fn clean_text(&self, value: &str) -> String {
        value.trim().to_string()
    }

    /// 空字符串与 None 统一为 None
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 解析浮点数（兼容逗号小数点）
    pub fn parse_float(&self, raw: &str) -> Result<f64, String> {
        let trimmed = raw.trim();
        let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
            trimmed.replace(',', ".")
        } else {
            trimmed.to_string()
        };

        let value = normalized
            .parse::<f64>()
            .map_err(|_| "不是有效数字".to_string())?;
        if !value.is_finite() {
            return Err("不是有效数字".to_string());
        }
        Ok(value)
    }

    /// 解析整数（先按小数解析再截断，兼容 "8.0"）
    pub fn parse_integer(&self, raw: &str) -> Result<i32, String> {
        let value = self.parse_float(raw)?.trunc();
        if value < i32::MIN as f64 || value > i32::MAX as f64 {
            return Err("整数超出范围".to_string());
        }
        Ok(value as i32)
    }

    /// 解析布尔值
    pub fn parse_bool(&self, raw: &str) -> Result<bool, String> {
        let normalized = raw.trim().to_lowercase();
        if TRUTHY_TOKENS.contains(&normalized.as_str()) {
            Ok(true)
        } else if FALSY_TOKENS.contains(&normalized.as_str()) {
            Ok(false)
        } else {
            Err("不是可识别的布尔值".to_string())
        }
    }

    /// 解析状态（必须在合法取值内）
    pub fn parse_status(&self, raw: &str) -> Result<GameStatus, String> {
        GameStatus::parse(raw)
            .filter(|s| self.valid.status.contains(s))
            .ok_or_else(|| "不是合法的状态取值".to_string())
    }

    /// 解析进度（必须在合法取值内）
    pub fn parse_progress(&self, raw: &str) -> Result<GameProgress, String> {
        GameProgress::parse(raw)
            .filter(|p| self.valid.progress.contains(p))
            .ok_or_else(|| "不是合法的进度取值".to_string())
    }

    /// 校验数值字段的取值范围
    pub fn validate_range(&self, field: TargetField, value: f64) -> Result<(), String> {
        let (min, max) = match field {
            TargetField::HypeScore | TargetField::Rating => (0.0, 10.0),
            TargetField::PlaytimeHours | TargetField::Price => (0.0, f64::MAX),
            TargetField::FinishYear | TargetField::ReleaseYear => {
                (MIN_YEAR as f64, MAX_YEAR as f64)
            }
            _ => return Ok(()),
        };

        if value < min || value > max {
            Err(format!("超出范围 [{}, {}]", min, max))
        } else {
            Ok(())
        }
    }

    /// 将原始文本转换为目标字段值
    ///
    /// # 返回
    /// - Ok(FieldValue::Null): 输入为空
    /// - Ok(value): 转换成功
    /// - Err(message): 无法转换或超出范围
    pub fn coerce(&self, field: TargetField, raw: Option<&str>) -> Result<FieldValue, String> {
        let value = match self.normalize_null(raw) {
            Some(v) => v,
            None => return Ok(FieldValue::Null),
        };

        match field.kind() {
            FieldKind::Text => Ok(FieldValue::Text(self.clean_text(&value))),
            FieldKind::Integer => {
                let parsed = self.parse_integer(&value)?;
                self.validate_range(field, parsed as f64)?;
                Ok(FieldValue::Integer(parsed))
            }
            FieldKind::Float => {
                let parsed = self.parse_float(&value)?;
                self.validate_range(field, parsed)?;
                Ok(FieldValue::Float(parsed))
            }
            FieldKind::Boolean => self.parse_bool(&value).map(FieldValue::Boolean),
            FieldKind::Status => self.parse_status(&value).map(FieldValue::Status),
            FieldKind::Progress => self.parse_progress(&value).map(FieldValue::Progress),
        }
    }
}
