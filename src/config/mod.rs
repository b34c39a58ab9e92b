// ==========================================
// 游戏收藏导入系统 - 配置层
// ==========================================
// 职责: 导入所需配置读取（合法枚举值、默认状态、映射建议阈值）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportConfigReader;
