// ==========================================
// 游戏收藏导入系统 - 游戏记录 Repository Trait
// ==========================================
// 职责: 定义游戏记录数据访问接口（不包含合并规则）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 并发: 同一身份键同一时刻只允许一个写入者
// ==========================================

use crate::domain::game::{FieldChanges, GameRecord, IdentityKey, StoredGame};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// GameRepository Trait
// ==========================================
// 实现者: GameRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait GameRepository: Send + Sync {
    // ===== 查询 =====

    /// 查询全部游戏记录（按 id 升序）
    async fn list_games(&self) -> RepositoryResult<Vec<StoredGame>>;

    /// 按身份键查询（标题大小写不敏感）
    ///
    /// # 返回
    /// - Ok(Some): 找到记录
    /// - Ok(None): 不存在
    async fn find_by_identity(&self, key: &IdentityKey) -> RepositoryResult<Option<StoredGame>>;

    /// 按 id 查询
    async fn get_game(&self, game_id: i64) -> RepositoryResult<Option<StoredGame>>;

    // ===== 写入 =====

    /// 创建记录
    ///
    /// # 错误
    /// - `RepositoryError::DuplicateIdentity`: 身份键已存在
    async fn create_game(&self, record: &GameRecord) -> RepositoryResult<StoredGame>;

    /// 条件更新（仅当当前 revision == expected_revision）
    ///
    /// # 参数
    /// - game_id: 记录 id
    /// - expected_revision: 调用方读取时的版本号
    /// - changes: 需要写入的字段
    ///
    /// # 错误
    /// - `RepositoryError::OptimisticLockFailure`: 记录已被其他写入者修改
    /// - `RepositoryError::NotFound`: 记录不存在
    async fn update_game(
        &self,
        game_id: i64,
        expected_revision: i64,
        changes: &FieldChanges,
    ) -> RepositoryResult<StoredGame>;
}
