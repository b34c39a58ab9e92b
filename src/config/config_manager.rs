// ==========================================
// 游戏收藏导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::{GameProgress, GameStatus};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// 默认值
const DEFAULT_STATUS_VOCABULARY: &str = "backlog,finished";
const DEFAULT_PROGRESS_VOCABULARY: &str = "Empezado,A mitad,Avanzado,Terminado";
const DEFAULT_STATUS: &str = "backlog";
const DEFAULT_MIN_PROPOSAL_CONFIDENCE: u8 = 60;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        Ok(())
    }

    /// 获取所有 global 配置（含未写入的默认值）
    pub fn get_effective_config(&self) -> Result<HashMap<String, String>, Box<dyn Error>> {
        let mut config = HashMap::new();
        config.insert(
            config_keys::STATUS_VOCABULARY.to_string(),
            self.get_config_or_default(config_keys::STATUS_VOCABULARY, DEFAULT_STATUS_VOCABULARY)?,
        );
        config.insert(
            config_keys::PROGRESS_VOCABULARY.to_string(),
            self.get_config_or_default(
                config_keys::PROGRESS_VOCABULARY,
                DEFAULT_PROGRESS_VOCABULARY,
            )?,
        );
        config.insert(
            config_keys::DEFAULT_STATUS.to_string(),
            self.get_config_or_default(config_keys::DEFAULT_STATUS, DEFAULT_STATUS)?,
        );
        config.insert(
            config_keys::MIN_PROPOSAL_CONFIDENCE.to_string(),
            self.get_config_or_default(
                config_keys::MIN_PROPOSAL_CONFIDENCE,
                &DEFAULT_MIN_PROPOSAL_CONFIDENCE.to_string(),
            )?,
        );
        Ok(config)
    }
}

/// 解析逗号分隔的枚举列表，忽略无法识别的项
fn parse_list<T>(raw: &str, parse: impl Fn(&str) -> Option<T>) -> Vec<T> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| {
            let parsed = parse(s);
            if parsed.is_none() {
                warn!("忽略无法识别的配置项: {}", s.trim());
            }
            parsed
        })
        .collect()
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    // ===== 合法枚举值 =====

    async fn get_status_vocabulary(&self) -> Result<Vec<GameStatus>, Box<dyn Error>> {
        let value =
            self.get_config_or_default(config_keys::STATUS_VOCABULARY, DEFAULT_STATUS_VOCABULARY)?;
        let statuses = parse_list(&value, GameStatus::parse);

        if statuses.is_empty() {
            Ok(GameStatus::ALL.to_vec()) // 默认值
        } else {
            Ok(statuses)
        }
    }

    async fn get_progress_vocabulary(&self) -> Result<Vec<GameProgress>, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::PROGRESS_VOCABULARY,
            DEFAULT_PROGRESS_VOCABULARY,
        )?;
        let progress = parse_list(&value, GameProgress::parse);

        if progress.is_empty() {
            Ok(GameProgress::ALL.to_vec()) // 默认值
        } else {
            Ok(progress)
        }
    }

    // ===== 导入行为 =====

    async fn get_default_status(&self) -> Result<GameStatus, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DEFAULT_STATUS, DEFAULT_STATUS)?;
        Ok(GameStatus::parse(&value).unwrap_or(GameStatus::Backlog))
    }

    async fn get_min_proposal_confidence(&self) -> Result<u8, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::MIN_PROPOSAL_CONFIDENCE,
            &DEFAULT_MIN_PROPOSAL_CONFIDENCE.to_string(),
        )?;
        Ok(value
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|v| *v <= 100)
            .unwrap_or(DEFAULT_MIN_PROPOSAL_CONFIDENCE))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 合法枚举值（逗号分隔）
    pub const STATUS_VOCABULARY: &str = "status_vocabulary";
    pub const PROGRESS_VOCABULARY: &str = "progress_vocabulary";

    // 导入行为
    pub const DEFAULT_STATUS: &str = "default_status";
    pub const MIN_PROPOSAL_CONFIDENCE: &str = "min_proposal_confidence";
}
