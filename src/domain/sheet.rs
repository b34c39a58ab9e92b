// ==========================================
// 游戏收藏导入系统 - 表格描述结构
// ==========================================
// 职责: 引擎边界输入 SheetDescriptor
// 说明: 文件解码由外部完成，这里只接收解码后的行与单元格
// ==========================================

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

// ==========================================
// Cell - 单元格（值 + 可选标记，如背景色）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default, alias = "v", deserialize_with = "deserialize_cell_value")]
    pub value: Option<String>,
    #[serde(default, alias = "c")]
    pub tag: Option<String>,
}

impl Cell {
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            tag: None,
        }
    }

    pub fn tagged(value: Option<&str>, tag: impl Into<String>) -> Self {
        Self {
            value: value.map(str::to_string),
            tag: Some(tag.into()),
        }
    }
}

/// 单元格值兼容数字/布尔（外部解析器可能保留原始类型）
fn deserialize_cell_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// 行记录: 表头 → 单元格
pub type RowRecord = HashMap<String, Cell>;

// ==========================================
// Sheet - 工作表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<RowRecord>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// 追加一行（按表头顺序给出单元格）
    pub fn push_row(&mut self, cells: Vec<Cell>) {
        let row = self
            .headers
            .iter()
            .cloned()
            .zip(cells)
            .collect::<RowRecord>();
        self.rows.push(row);
    }

    pub fn has_header(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
