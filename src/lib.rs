// ==========================================
// 游戏收藏导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 表格导入对账引擎（列映射 / 合并 / 冲突确认）
// 红线: 冲突永远需要用户确认，未确认时保留现有数据
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 映射、标准化、冲突处理
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    GameProgress, GameStatus, MergeStrategy, ProcessingStrategy, ResolutionChoice, TargetField,
};

// 领域实体
pub use domain::{
    Cell, ConflictItem, GameRecord, ImportSummary, Resolution, ResolveSummary, Sheet, StoredGame,
};

// 导入
pub use importer::{
    HeaderProposer, ImportError, ImportExecutor, MappingConfiguration, MappingError, RawKey,
};

// 仓储与配置
pub use config::{ConfigManager, ImportConfigReader};
pub use repository::{GameRepository, GameRepositoryImpl, RepositoryError};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "游戏收藏导入系统";
