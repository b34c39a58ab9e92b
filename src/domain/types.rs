// ==========================================
// 游戏收藏导入系统 - 领域类型定义
// ==========================================
// 职责: 状态/进度枚举、合并策略、目标字段
// 序列化格式与存储层保持一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 游戏状态 (Game Status)
// ==========================================
// 身份键组成部分: (title, status)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Backlog,  // 待玩
    Finished, // 已通关
}

impl GameStatus {
    pub const ALL: [GameStatus; 2] = [GameStatus::Backlog, GameStatus::Finished];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Backlog => "backlog",
            GameStatus::Finished => "finished",
        }
    }

    /// 解析状态（大小写不敏感）
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == normalized)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 游戏进度 (Game Progress)
// ==========================================
// 存储值沿用表格中的西语标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameProgress {
    #[serde(rename = "Empezado")]
    Started,
    #[serde(rename = "A mitad")]
    Halfway,
    #[serde(rename = "Avanzado")]
    Advanced,
    #[serde(rename = "Terminado")]
    Completed,
}

impl GameProgress {
    pub const ALL: [GameProgress; 4] = [
        GameProgress::Started,
        GameProgress::Halfway,
        GameProgress::Advanced,
        GameProgress::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameProgress::Started => "Empezado",
            GameProgress::Halfway => "A mitad",
            GameProgress::Advanced => "Avanzado",
            GameProgress::Completed => "Terminado",
        }
    }

    /// 解析进度（大小写不敏感，忽略首尾空白）
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().to_lowercase() == normalized)
    }
}

impl fmt::Display for GameProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 合并策略 (Merge Strategy)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    Fill,      // 仅填充现有记录中的空字段
    Overwrite, // 可覆盖非空字段（需确认）
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::Fill => write!(f, "fill"),
            MergeStrategy::Overwrite => write!(f, "overwrite"),
        }
    }
}

// ==========================================
// 行处理策略 (Processing Strategy)
// ==========================================
// Skip: 身份键已存在的行直接跳过，不进入冲突检测
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStrategy {
    #[default]
    Update,
    Skip,
}

// ==========================================
// 冲突解决选择 (Resolution Choice)
// ==========================================
// 红线: 默认值永远是 Existing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionChoice {
    New,
    #[default]
    Existing,
}

impl fmt::Display for ResolutionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionChoice::New => write!(f, "new"),
            ResolutionChoice::Existing => write!(f, "existing"),
        }
    }
}

// ==========================================
// 字段类型 (Field Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    Status,
    Progress,
}

// ==========================================
// 目标字段 (Target Field)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetField {
    Title,
    Status,
    HypeScore,
    Rating,
    Progress,
    PlaytimeHours,
    FinishYear,
    ReleaseYear,
    Price,
    Platform,
    SteamDeck,
    Notes,
}

impl TargetField {
    pub const ALL: [TargetField; 12] = [
        TargetField::Title,
        TargetField::Status,
        TargetField::HypeScore,
        TargetField::Rating,
        TargetField::Progress,
        TargetField::PlaytimeHours,
        TargetField::FinishYear,
        TargetField::ReleaseYear,
        TargetField::Price,
        TargetField::Platform,
        TargetField::SteamDeck,
        TargetField::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetField::Title => "title",
            TargetField::Status => "status",
            TargetField::HypeScore => "hype_score",
            TargetField::Rating => "rating",
            TargetField::Progress => "progress",
            TargetField::PlaytimeHours => "playtime_hours",
            TargetField::FinishYear => "finish_year",
            TargetField::ReleaseYear => "release_year",
            TargetField::Price => "price",
            TargetField::Platform => "platform",
            TargetField::SteamDeck => "steam_deck",
            TargetField::Notes => "notes",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            TargetField::Title | TargetField::Platform | TargetField::Notes => FieldKind::Text,
            TargetField::HypeScore | TargetField::FinishYear | TargetField::ReleaseYear => {
                FieldKind::Integer
            }
            TargetField::Rating | TargetField::PlaytimeHours | TargetField::Price => {
                FieldKind::Float
            }
            TargetField::SteamDeck => FieldKind::Boolean,
            TargetField::Status => FieldKind::Status,
            TargetField::Progress => FieldKind::Progress,
        }
    }

    /// 身份字段（title/status）不参与差异比较
    pub fn is_identity(&self) -> bool {
        matches!(self, TargetField::Title | TargetField::Status)
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!(GameStatus::parse("Finished"), Some(GameStatus::Finished));
        assert_eq!(GameStatus::parse("  backlog "), Some(GameStatus::Backlog));
        assert_eq!(GameStatus::parse("terminado"), None);
    }

    #[test]
    fn test_progress_parse() {
        assert_eq!(GameProgress::parse("a mitad"), Some(GameProgress::Halfway));
        assert_eq!(GameProgress::parse("Terminado"), Some(GameProgress::Completed));
        assert_eq!(GameProgress::parse("half"), None);
    }

    #[test]
    fn test_resolution_choice_default_is_existing() {
        assert_eq!(ResolutionChoice::default(), ResolutionChoice::Existing);
    }

    #[test]
    fn test_progress_serde_uses_labels() {
        let json = serde_json::to_string(&GameProgress::Halfway).unwrap();
        assert_eq!(json, "\"A mitad\"");
    }
}
