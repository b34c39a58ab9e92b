// ==========================================
// 游戏收藏导入系统 - 冲突解决器
// ==========================================
// 职责: 将用户决定应用到待确认冲突（阶段二）
// 红线:
// - 默认选择永远是 existing（不写入）
// - 每个冲突只能解决一次
// - 单条指令失败不影响其他指令
// ==========================================

use crate::domain::game::GameRecord;
use crate::domain::import::{ConflictItem, Resolution, ResolutionFailure, ResolveSummary};
use crate::domain::types::ResolutionChoice;
use crate::importer::conflict_detector::ConflictDetector;
use crate::importer::error::ResolutionError;
use crate::repository::GameRepository;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
enum ConflictState {
    Pending(ConflictItem),
    Resolved(ResolutionChoice),
}

/// 通过校验、待执行的指令
enum Decision<'a> {
    Keep,
    Replace {
        item: &'a ConflictItem,
        replacement: &'a GameRecord,
    },
}

// ==========================================
// ConflictResolver
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConflictResolver {
    states: BTreeMap<i64, ConflictState>,
}

impl ConflictResolver {
    pub fn new(conflicts: Vec<ConflictItem>) -> Self {
        Self {
            states: conflicts
                .into_iter()
                .map(|item| (item.game_id, ConflictState::Pending(item)))
                .collect(),
        }
    }

    /// 待确认的冲突（按 game_id 排序）
    pub fn pending(&self) -> Vec<&ConflictItem> {
        self.states
            .values()
            .filter_map(|s| match s {
                ConflictState::Pending(item) => Some(item),
                ConflictState::Resolved(_) => None,
            })
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    pub fn is_pending(&self, game_id: i64) -> bool {
        matches!(self.states.get(&game_id), Some(ConflictState::Pending(_)))
    }

    /// 已解决冲突的最终选择
    pub fn outcome(&self, game_id: i64) -> Option<ResolutionChoice> {
        match self.states.get(&game_id) {
            Some(ConflictState::Resolved(choice)) => Some(*choice),
            _ => None,
        }
    }

    /// 校验单条指令
    fn check<'a>(&'a self, resolution: &'a Resolution) -> Result<Decision<'a>, ResolutionError> {
        let item = match self.states.get(&resolution.game_id) {
            None => return Err(ResolutionError::UnknownConflict(resolution.game_id)),
            Some(ConflictState::Resolved(_)) => {
                return Err(ResolutionError::AlreadyResolved(resolution.game_id))
            }
            Some(ConflictState::Pending(item)) => item,
        };

        match (resolution.choice, resolution.new_data.as_ref()) {
            (ResolutionChoice::Existing, None) => Ok(Decision::Keep),
            (ResolutionChoice::Existing, Some(_)) => {
                Err(ResolutionError::UnexpectedReplacement(resolution.game_id))
            }
            (ResolutionChoice::New, None) => {
                Err(ResolutionError::MissingReplacement(resolution.game_id))
            }
            (ResolutionChoice::New, Some(replacement)) => {
                let expected = item.existing.identity_key();
                let actual = replacement.identity_key();
                if expected != actual {
                    return Err(ResolutionError::IdentityMismatch {
                        game_id: resolution.game_id,
                        expected: expected.to_string(),
                        actual: actual.to_string(),
                    });
                }
                Ok(Decision::Replace { item, replacement })
            }
        }
    }

    /// 应用一批解决指令
    ///
    /// # 返回
    /// - resolved: 选择 new 并已写入
    /// - kept: 保留现有数据（含替换数据无差异的 new）
    /// - failed / errors: 被拒绝或写入失败的指令
    ///
    /// # 说明
    /// - new 使用冲突检测时的 revision 条件写入；存储失败时冲突保持待确认
    pub async fn resolve<R>(&mut self, repo: &R, resolutions: Vec<Resolution>) -> ResolveSummary
    where
        R: GameRepository + ?Sized,
    {
        let mut summary = ResolveSummary::default();

        for resolution in &resolutions {
            let game_id = resolution.game_id;

            let write = match self.check(resolution) {
                Err(e) => {
                    warn!(game_id, error = %e, "冲突解决指令被拒绝");
                    summary.failed += 1;
                    summary.errors.push(ResolutionFailure {
                        game_id,
                        message: e.to_string(),
                    });
                    continue;
                }
                Ok(Decision::Keep) => None,
                Ok(Decision::Replace { item, replacement }) => {
                    let fields = ConflictDetector::differing_fields(&item.existing, replacement);
                    if fields.is_empty() {
                        None
                    } else {
                        Some((
                            item.existing_revision,
                            ConflictDetector::changes_for(replacement, &fields),
                        ))
                    }
                }
            };

            match write {
                None => {
                    // 未写入任何字段，记为保留现有数据
                    debug!(game_id, "保留现有数据");
                    summary.kept += 1;
                    self.states
                        .insert(game_id, ConflictState::Resolved(ResolutionChoice::Existing));
                }
                Some((revision, changes)) => {
                    match repo.update_game(game_id, revision, &changes).await {
                        Ok(updated) => {
                            debug!(game_id, revision = updated.revision, "冲突已按导入数据写入");
                            summary.resolved += 1;
                            self.states
                                .insert(game_id, ConflictState::Resolved(ResolutionChoice::New));
                        }
                        Err(e) => {
                            warn!(game_id, error = %e, "冲突写入失败，保持待确认");
                            summary.failed += 1;
                            summary.errors.push(ResolutionFailure {
                                game_id,
                                message: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        info!(
            resolved = summary.resolved,
            kept = summary.kept,
            failed = summary.failed,
            pending = self.pending_count(),
            "冲突解决完成"
        );
        summary
    }

    /// 关闭会话: 所有待确认冲突按 existing 处理
    ///
    /// # 返回
    /// - 被默认处理的冲突数
    pub fn close(&mut self) -> usize {
        let mut defaulted = 0;
        for state in self.states.values_mut() {
            if matches!(state, ConflictState::Pending(_)) {
                *state = ConflictState::Resolved(ResolutionChoice::default());
                defaulted += 1;
            }
        }
        if defaulted > 0 {
            info!(defaulted, "未处理的冲突已默认保留现有数据");
        }
        defaulted
    }
}
