// ==========================================
// 游戏收藏导入系统 - 冲突检测器
// ==========================================
// 职责: 按合并策略将标准化记录分类为
//       create / auto-update / no-op / conflict
// 规则:
// - 只比较导入值非空的字段，身份字段不参与比较
// - fill: 只写入现有值为空的字段，永不产生冲突
// - overwrite: 任一差异字段现有值非空 → conflict
// ==========================================

use crate::domain::game::{FieldChanges, GameRecord, IdentityKey, StoredGame};
use crate::domain::types::{MergeStrategy, TargetField};
use std::collections::HashMap;

/// 分类结果
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Create,
    AutoUpdate { changes: FieldChanges },
    NoOp,
    Conflict { fields: Vec<TargetField> },
}

// ==========================================
// ConflictDetector
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector {
    strategy: MergeStrategy,
}

impl ConflictDetector {
    pub fn new(strategy: MergeStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// 差异字段: 导入值非空且与现有值不同
    pub fn differing_fields(existing: &GameRecord, candidate: &GameRecord) -> Vec<TargetField> {
        TargetField::ALL
            .into_iter()
            .filter(|f| !f.is_identity())
            .filter(|f| {
                let new_value = candidate.field_value(*f);
                !new_value.is_null() && new_value != existing.field_value(*f)
            })
            .collect()
    }

    /// 分类单条记录
    ///
    /// # 参数
    /// - candidate: 标准化后的导入记录
    /// - existing: 身份键匹配的现有记录
    pub fn classify(&self, candidate: &GameRecord, existing: Option<&GameRecord>) -> Classification {
        let existing = match existing {
            Some(e) => e,
            None => return Classification::Create,
        };

        let differing = Self::differing_fields(existing, candidate);
        if differing.is_empty() {
            return Classification::NoOp;
        }

        let (empty_in_existing, filled_in_existing): (Vec<TargetField>, Vec<TargetField>) =
            differing
                .into_iter()
                .partition(|f| existing.field_value(*f).is_null());

        match self.strategy {
            MergeStrategy::Fill => {
                if empty_in_existing.is_empty() {
                    Classification::NoOp
                } else {
                    Classification::AutoUpdate {
                        changes: Self::changes_for(candidate, &empty_in_existing),
                    }
                }
            }
            MergeStrategy::Overwrite => {
                if filled_in_existing.is_empty() {
                    Classification::AutoUpdate {
                        changes: Self::changes_for(candidate, &empty_in_existing),
                    }
                } else {
                    Classification::Conflict {
                        fields: filled_in_existing,
                    }
                }
            }
        }
    }

    /// 取导入记录中指定字段的值
    pub fn changes_for(candidate: &GameRecord, fields: &[TargetField]) -> FieldChanges {
        fields
            .iter()
            .map(|f| (*f, candidate.field_value(*f)))
            .collect()
    }
}

// ==========================================
// IdentityIndex - 运行期身份键索引
// ==========================================
// 运行开始时从存储加载，每次写入后更新，后续行可见本次运行的写入
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    games: HashMap<IdentityKey, StoredGame>,
}

impl IdentityIndex {
    pub fn from_games(games: Vec<StoredGame>) -> Self {
        Self {
            games: games
                .into_iter()
                .map(|g| (g.identity_key(), g))
                .collect(),
        }
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&StoredGame> {
        self.games.get(key)
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.games.contains_key(key)
    }

    pub fn upsert(&mut self, game: StoredGame) {
        self.games.insert(game.identity_key(), game);
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
