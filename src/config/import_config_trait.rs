// ==========================================
// 游戏收藏导入系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::{GameProgress, GameStatus};
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 合法枚举值 =====

    /// 获取合法的状态取值
    ///
    /// # 默认值
    /// - backlog, finished
    async fn get_status_vocabulary(&self) -> Result<Vec<GameStatus>, Box<dyn Error>>;

    /// 获取合法的进度取值
    ///
    /// # 默认值
    /// - Empezado, A mitad, Avanzado, Terminado
    async fn get_progress_vocabulary(&self) -> Result<Vec<GameProgress>, Box<dyn Error>>;

    // ===== 导入行为 =====

    /// 获取状态为空时使用的默认状态
    ///
    /// # 默认值
    /// - backlog
    async fn get_default_status(&self) -> Result<GameStatus, Box<dyn Error>>;

    /// 获取列映射建议的最低置信度（0-100）
    ///
    /// # 默认值
    /// - 60（低于或等于该值的建议不自动绑定）
    async fn get_min_proposal_confidence(&self) -> Result<u8, Box<dyn Error>>;
}
