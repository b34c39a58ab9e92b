// ==========================================
// 游戏收藏导入系统 - 导入运行结果模型
// ==========================================
// 职责: 冲突项 / 解决指令 / 导入汇总 / 解决汇总
// 两阶段提交: 阶段一立即写入（applied），阶段二等待确认（pending）
// ==========================================

use crate::domain::game::GameRecord;
use crate::domain::types::{ResolutionChoice, TargetField};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// SkipReason - 跳过原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ParseError,        // 值转换失败
    MissingTitle,      // 标题为空，无法确定身份
    NoChanges,         // 与现有记录一致（no-op）
    KnownIdentity,     // Skip 策略下身份键已存在
    DuplicateConflict, // 目标记录已有待确认冲突
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::ParseError => "parse_error",
            SkipReason::MissingTitle => "missing_title",
            SkipReason::NoChanges => "no_changes",
            SkipReason::KnownIdentity => "known_identity",
            SkipReason::DuplicateConflict => "duplicate_conflict",
        };
        write!(f, "{}", s)
    }
}

/// 被跳过的行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSkip {
    pub row_index: usize,
    pub reason: SkipReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// 写入失败的行（StoreError）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFailure {
    pub row_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<i64>,
    pub message: String,
}

// ==========================================
// ConflictItem - 待确认冲突
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictItem {
    pub row_index: usize,
    pub game_id: i64,
    /// 检测时现有记录的版本号（阶段二条件写入使用）
    pub existing_revision: i64,
    pub existing: GameRecord,
    pub new_data: GameRecord,
    /// 现有值非空且与导入值不同的字段
    pub fields: Vec<TargetField>,
}

// ==========================================
// Resolution - 用户对冲突的决定
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub game_id: i64,
    #[serde(default)]
    pub choice: ResolutionChoice,
    /// choice = new 时必填
    #[serde(default)]
    pub new_data: Option<GameRecord>,
}

impl Resolution {
    pub fn keep_existing(game_id: i64) -> Self {
        Self {
            game_id,
            choice: ResolutionChoice::Existing,
            new_data: None,
        }
    }

    pub fn accept_new(game_id: i64, new_data: GameRecord) -> Self {
        Self {
            game_id,
            choice: ResolutionChoice::New,
            new_data: Some(new_data),
        }
    }
}

/// 被拒绝的解决指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionFailure {
    pub game_id: i64,
    pub message: String,
}

// ==========================================
// ImportSummary - 阶段一汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub run_id: String,
    pub total_rows: usize,
    pub created: usize,
    /// 仅统计阶段一自动更新
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// 已落库行数（created + updated，含折算后的阶段二写入）
    pub applied: usize,
    /// 仍待确认的冲突数
    pub pending: usize,
    /// 本次运行开始前按 existing 关闭的上一次运行遗留冲突数
    #[serde(default)]
    pub defaulted_prior: usize,
    pub skip_reasons: BTreeMap<SkipReason, usize>,
    pub skips: Vec<RowSkip>,
    pub failures: Vec<RowFailure>,
    pub conflicts: Vec<ConflictItem>,
}

impl ImportSummary {
    pub fn new(run_id: impl Into<String>, total_rows: usize) -> Self {
        Self {
            run_id: run_id.into(),
            total_rows,
            ..Default::default()
        }
    }

    pub fn record_created(&mut self) {
        self.created += 1;
        self.applied += 1;
    }

    pub fn record_updated(&mut self) {
        self.updated += 1;
        self.applied += 1;
    }

    pub fn record_skip(&mut self, row_index: usize, reason: SkipReason, detail: Option<String>) {
        self.skipped += 1;
        *self.skip_reasons.entry(reason).or_insert(0) += 1;
        self.skips.push(RowSkip {
            row_index,
            reason,
            detail,
        });
    }

    pub fn record_failure(&mut self, row_index: usize, game_id: Option<i64>, message: String) {
        self.failed += 1;
        self.failures.push(RowFailure {
            row_index,
            game_id,
            message,
        });
    }

    pub fn record_conflict(&mut self, item: ConflictItem) {
        self.pending += 1;
        self.conflicts.push(item);
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skip_reasons.get(&reason).copied().unwrap_or(0)
    }

    /// 每行恰好落入 created/updated/skipped/conflict/failed 之一
    pub fn accounted_rows(&self) -> usize {
        self.created + self.updated + self.skipped + self.failed + self.conflicts.len()
    }

    /// 将阶段二结果折算进最终统计
    pub fn fold_resolved(&mut self, resolve: &ResolveSummary) {
        self.updated += resolve.resolved;
        self.applied += resolve.resolved;
        self.pending = self.pending.saturating_sub(resolve.resolved + resolve.kept);
    }

    /// 关闭会话时按 existing 默认处理的冲突不再计入待确认
    pub fn settle_defaulted(&mut self, defaulted: usize) {
        self.pending = self.pending.saturating_sub(defaulted);
    }
}

// ==========================================
// ResolveSummary - 阶段二汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveSummary {
    /// 选择 new 且已写入的冲突数
    pub resolved: usize,
    /// 保留现有数据的冲突数（含默认处理）
    pub kept: usize,
    /// 写入失败的冲突数（保持待确认）
    pub failed: usize,
    pub errors: Vec<ResolutionFailure>,
}
