// ==========================================
// 游戏收藏导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分级:
// - MappingError: 致命，任何写入前中止
// - ValueParseError: 行级，仅跳过该行
// - ResolutionError: 仅影响该条解决指令
// - RepositoryError (StoreError): 仅影响该条记录
// ==========================================

use crate::domain::types::TargetField;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 映射配置错误（运行前校验）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("标题字段未映射: title 既没有绑定列也没有绑定常量")]
    MissingTitle,

    #[error("常量值不合法 (字段 {field}): {value}")]
    InvalidConstant { field: TargetField, value: String },

    #[error("绑定的列不存在 (字段 {field}): {column}")]
    UnknownColumn { field: TargetField, column: String },

    #[error("值映射目标不合法 (字段 {field}): {value}")]
    InvalidValueMapTarget { field: TargetField, value: String },

    #[error("字段已绑定常量，不能设置值映射 (字段 {field})")]
    ValueMapWithConstant { field: TargetField },
}

/// 值转换错误（行级）
#[derive(Error, Debug, Clone, PartialEq)]
#[error("类型转换失败 (行 {row_index}, 字段 {field}): 值 '{raw}' {message}")]
pub struct ValueParseError {
    pub row_index: usize,
    pub field: TargetField,
    pub raw: String,
    pub message: String,
}

/// 冲突解决错误（单条指令）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("冲突不存在: game_id={0}")]
    UnknownConflict(i64),

    #[error("冲突已解决，不能重复处理: game_id={0}")]
    AlreadyResolved(i64),

    #[error("选择 new 时必须提供替换数据: game_id={0}")]
    MissingReplacement(i64),

    #[error("选择 existing 时不能提供替换数据: game_id={0}")]
    UnexpectedReplacement(i64),

    #[error("替换数据身份键与冲突记录不一致: game_id={game_id}, expected={expected}, actual={actual}")]
    IdentityMismatch {
        game_id: i64,
        expected: String,
        actual: String,
    },
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("映射配置错误: {0}")]
    Mapping(#[from] MappingError),

    #[error("存储错误: {0}")]
    Store(#[from] RepositoryError),

    #[error("配置读取失败: {0}")]
    Config(String),
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
