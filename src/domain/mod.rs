// ==========================================
// 游戏收藏导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、导入运行结果
// 红线: 不含数据访问逻辑,不含合并规则
// ==========================================

pub mod game;
pub mod import;
pub mod sheet;
pub mod types;

// 重导出核心类型
pub use game::{normalize_title_key, FieldChanges, FieldValue, GameRecord, IdentityKey, StoredGame};
pub use import::{
    ConflictItem, ImportSummary, Resolution, ResolutionFailure, ResolveSummary, RowFailure,
    RowSkip, SkipReason,
};
pub use sheet::{Cell, RowRecord, Sheet};
pub use types::{
    FieldKind, GameProgress, GameStatus, MergeStrategy, ProcessingStrategy, ResolutionChoice,
    TargetField,
};
