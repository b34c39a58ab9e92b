// ==========================================
// 游戏收藏导入系统 - 导入层
// ==========================================
// 职责: 表格行 → 标准化记录 → 合并 / 冲突 → 落库
// 流程: 映射校验 → 标准化 → 冲突检测 → 立即写入 → 冲突确认
// ==========================================

// 模块声明
pub mod conflict_detector;
pub mod conflict_resolver;
pub mod data_cleaner;
pub mod error;
pub mod import_executor;
pub mod mapping;
pub mod merge_planner;
pub mod proposal;

// 重导出核心类型
pub use conflict_detector::{Classification, ConflictDetector, IdentityIndex};
pub use conflict_resolver::ConflictResolver;
pub use data_cleaner::{DataCleaner, ValidValues};
pub use error::{ImportError, ImportResult, MappingError, ResolutionError, ValueParseError};
pub use import_executor::ImportExecutor;
pub use mapping::{FieldBinding, MappingConfiguration, RawKey, ValueMap};
pub use merge_planner::{MergePlanner, PlannedRow};
pub use proposal::{FieldMappingProposal, FieldMappingProposalSource, HeaderProposer};
