// ==========================================
// 游戏收藏导入系统 - 游戏记录领域模型
// ==========================================
// 职责: 标准化记录 / 持久化记录 / 身份键 / 字段值
// ==========================================

use crate::domain::types::{GameProgress, GameStatus, TargetField};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 字段变更集合（目标字段 → 新值）
pub type FieldChanges = BTreeMap<TargetField, FieldValue>;

// ==========================================
// FieldValue - 单个字段的标准化值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i32),
    Float(f64),
    Status(GameStatus),
    Progress(GameProgress),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Boolean(v) => write!(f, "{}", v),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Status(v) => write!(f, "{}", v),
            FieldValue::Progress(v) => write!(f, "{}", v),
            FieldValue::Text(v) => write!(f, "{}", v),
        }
    }
}

// ==========================================
// IdentityKey - 身份键 (title, status)
// ==========================================
// 标题去除首尾空白后按小写比较
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    title_key: String,
    status: GameStatus,
}

impl IdentityKey {
    pub fn new(title: &str, status: GameStatus) -> Self {
        Self {
            title_key: normalize_title_key(title),
            status,
        }
    }

    pub fn title_key(&self) -> &str {
        &self.title_key
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.title_key, self.status)
    }
}

/// 标题比较键（存储层 UNIQUE 约束使用同一规则）
pub fn normalize_title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

// ==========================================
// GameRecord - 标准化游戏记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub title: String,
    pub status: GameStatus,

    // 待玩专用
    #[serde(default)]
    pub hype_score: Option<i32>,

    // 已通关专用
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub progress: Option<GameProgress>,
    #[serde(default)]
    pub playtime_hours: Option<f64>,
    #[serde(default)]
    pub finish_year: Option<i32>,
    #[serde(default)]
    pub release_year: Option<i32>,

    // 通用
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub steam_deck: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl GameRecord {
    /// 创建仅含身份字段的记录
    pub fn new(title: impl Into<String>, status: GameStatus) -> Self {
        Self {
            title: title.into(),
            status,
            hype_score: None,
            rating: None,
            progress: None,
            playtime_hours: None,
            finish_year: None,
            release_year: None,
            price: None,
            platform: None,
            steam_deck: None,
            notes: None,
        }
    }

    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::new(&self.title, self.status)
    }

    /// 读取字段值（空值统一为 FieldValue::Null）
    pub fn field_value(&self, field: TargetField) -> FieldValue {
        fn opt<T>(value: &Option<T>, wrap: impl Fn(T) -> FieldValue) -> FieldValue
        where
            T: Clone,
        {
            value.clone().map(wrap).unwrap_or(FieldValue::Null)
        }

        match field {
            TargetField::Title => FieldValue::Text(self.title.clone()),
            TargetField::Status => FieldValue::Status(self.status),
            TargetField::HypeScore => opt(&self.hype_score, FieldValue::Integer),
            TargetField::Rating => opt(&self.rating, FieldValue::Float),
            TargetField::Progress => opt(&self.progress, FieldValue::Progress),
            TargetField::PlaytimeHours => opt(&self.playtime_hours, FieldValue::Float),
            TargetField::FinishYear => opt(&self.finish_year, FieldValue::Integer),
            TargetField::ReleaseYear => opt(&self.release_year, FieldValue::Integer),
            TargetField::Price => opt(&self.price, FieldValue::Float),
            TargetField::Platform => opt(&self.platform, FieldValue::Text),
            TargetField::SteamDeck => opt(&self.steam_deck, FieldValue::Boolean),
            TargetField::Notes => opt(&self.notes, FieldValue::Text),
        }
    }

    /// 写入字段值
    ///
    /// # 返回
    /// - true: 写入成功
    /// - false: 值类型与字段类型不匹配（记录保持不变）
    ///
    /// # 说明
    /// - 身份字段不接受 Null
    pub fn set_field(&mut self, field: TargetField, value: FieldValue) -> bool {
        match (field, value) {
            (TargetField::Title, FieldValue::Text(v)) => self.title = v,
            (TargetField::Status, FieldValue::Status(v)) => self.status = v,
            (TargetField::HypeScore, FieldValue::Integer(v)) => self.hype_score = Some(v),
            (TargetField::HypeScore, FieldValue::Null) => self.hype_score = None,
            (TargetField::Rating, FieldValue::Float(v)) => self.rating = Some(v),
            (TargetField::Rating, FieldValue::Null) => self.rating = None,
            (TargetField::Progress, FieldValue::Progress(v)) => self.progress = Some(v),
            (TargetField::Progress, FieldValue::Null) => self.progress = None,
            (TargetField::PlaytimeHours, FieldValue::Float(v)) => self.playtime_hours = Some(v),
            (TargetField::PlaytimeHours, FieldValue::Null) => self.playtime_hours = None,
            (TargetField::FinishYear, FieldValue::Integer(v)) => self.finish_year = Some(v),
            (TargetField::FinishYear, FieldValue::Null) => self.finish_year = None,
            (TargetField::ReleaseYear, FieldValue::Integer(v)) => self.release_year = Some(v),
            (TargetField::ReleaseYear, FieldValue::Null) => self.release_year = None,
            (TargetField::Price, FieldValue::Float(v)) => self.price = Some(v),
            (TargetField::Price, FieldValue::Null) => self.price = None,
            (TargetField::Platform, FieldValue::Text(v)) => self.platform = Some(v),
            (TargetField::Platform, FieldValue::Null) => self.platform = None,
            (TargetField::SteamDeck, FieldValue::Boolean(v)) => self.steam_deck = Some(v),
            (TargetField::SteamDeck, FieldValue::Null) => self.steam_deck = None,
            (TargetField::Notes, FieldValue::Text(v)) => self.notes = Some(v),
            (TargetField::Notes, FieldValue::Null) => self.notes = None,
            _ => return false,
        }
        true
    }

    /// 应用变更集合，返回实际写入的字段数
    pub fn apply_changes(&mut self, changes: &FieldChanges) -> usize {
        changes
            .iter()
            .filter(|(field, value)| self.set_field(**field, (*value).clone()))
            .count()
    }
}

// ==========================================
// StoredGame - 已持久化的游戏记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGame {
    pub id: i64,
    /// 条件写入版本号（每次更新 +1）
    pub revision: i64,
    pub record: GameRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredGame {
    pub fn identity_key(&self) -> IdentityKey {
        self.record.identity_key()
    }
}
