// ==========================================
// 游戏收藏导入系统 - 游戏记录 Repository 实现
// ==========================================
// 职责: 实现游戏记录数据访问（使用 rusqlite）
// 并发控制:
// - 创建: (title_key, status) UNIQUE 约束
// - 更新: revision 条件写入（乐观锁）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::game::{normalize_title_key, FieldChanges, GameRecord, IdentityKey, StoredGame};
use crate::domain::types::{GameProgress, GameStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::game_repo::GameRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::sync::{Arc, Mutex};
use tracing::debug;

const SELECT_COLUMNS: &str = r#"
    SELECT id, title, status, hype_score, rating, progress, playtime_hours,
           finish_year, release_year, price, platform, steam_deck, notes,
           revision, created_at, updated_at
    FROM games
"#;

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        Box::<dyn std::error::Error + Send + Sync>::from(message),
    )
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, format!("时间格式错误: {} ({})", raw, e)))
}

// ==========================================
// GameRepositoryImpl
// ==========================================
pub struct GameRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl GameRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与 ConfigManager 共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<StoredGame> {
        let status_raw: String = row.get(2)?;
        let status = GameStatus::parse(&status_raw)
            .ok_or_else(|| conversion_error(2, format!("未知状态: {}", status_raw)))?;

        let progress = match row.get::<_, Option<String>>(5)? {
            Some(raw) => Some(
                GameProgress::parse(&raw)
                    .ok_or_else(|| conversion_error(5, format!("未知进度: {}", raw)))?,
            ),
            None => None,
        };

        let record = GameRecord {
            title: row.get(1)?,
            status,
            hype_score: row.get(3)?,
            rating: row.get(4)?,
            progress,
            playtime_hours: row.get(6)?,
            finish_year: row.get(7)?,
            release_year: row.get(8)?,
            price: row.get(9)?,
            platform: row.get(10)?,
            steam_deck: row.get(11)?,
            notes: row.get(12)?,
        };

        Ok(StoredGame {
            id: row.get(0)?,
            revision: row.get(13)?,
            record,
            created_at: parse_timestamp(14, &row.get::<_, String>(14)?)?,
            updated_at: parse_timestamp(15, &row.get::<_, String>(15)?)?,
        })
    }

    fn find_by_id_locked(conn: &Connection, game_id: i64) -> RepositoryResult<Option<StoredGame>> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let game = conn
            .query_row(&sql, params![game_id], Self::map_row)
            .optional()?;
        Ok(game)
    }
}

#[async_trait]
impl GameRepository for GameRepositoryImpl {
    async fn list_games(&self) -> RepositoryResult<Vec<StoredGame>> {
        let conn = self.get_conn()?;

        let sql = format!("{} ORDER BY id ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let games = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<StoredGame>, _>>()?;

        Ok(games)
    }

    async fn find_by_identity(&self, key: &IdentityKey) -> RepositoryResult<Option<StoredGame>> {
        let conn = self.get_conn()?;

        let sql = format!("{} WHERE title_key = ?1 AND status = ?2", SELECT_COLUMNS);
        let game = conn
            .query_row(
                &sql,
                params![key.title_key(), key.status().as_str()],
                Self::map_row,
            )
            .optional()?;

        Ok(game)
    }

    async fn get_game(&self, game_id: i64) -> RepositoryResult<Option<StoredGame>> {
        let conn = self.get_conn()?;
        Self::find_by_id_locked(&conn, game_id)
    }

    async fn create_game(&self, record: &GameRecord) -> RepositoryResult<StoredGame> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO games (
                title, title_key, status, hype_score, rating, progress, playtime_hours,
                finish_year, release_year, price, platform, steam_deck, notes,
                revision, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 1, ?14, ?14
            )
            "#,
            params![
                record.title.trim(),
                normalize_title_key(&record.title),
                record.status.as_str(),
                record.hype_score,
                record.rating,
                record.progress.map(|p| p.as_str()),
                record.playtime_hours,
                record.finish_year,
                record.release_year,
                record.price,
                record.platform,
                record.steam_deck,
                record.notes,
                now,
            ],
        )?;

        let game_id = conn.last_insert_rowid();
        debug!(game_id, title = %record.title, "游戏记录已创建");

        Self::find_by_id_locked(&conn, game_id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Game".to_string(),
            id: game_id.to_string(),
        })
    }

    async fn update_game(
        &self,
        game_id: i64,
        expected_revision: i64,
        changes: &FieldChanges,
    ) -> RepositoryResult<StoredGame> {
        let conn = self.get_conn()?;
        // IMMEDIATE: 读取 revision 前先取得写锁，并发写入者按 busy_timeout 排队
        let tx = Transaction::new_unchecked(&conn, TransactionBehavior::Immediate)?;

        let current = Self::find_by_id_locked(&tx, game_id)?.ok_or_else(|| {
            RepositoryError::NotFound {
                entity: "Game".to_string(),
                id: game_id.to_string(),
            }
        })?;

        if current.revision != expected_revision {
            return Err(RepositoryError::OptimisticLockFailure {
                game_id,
                expected: expected_revision,
                actual: current.revision,
            });
        }

        let mut record = current.record.clone();
        for (field, value) in changes {
            if !record.set_field(*field, value.clone()) {
                return Err(RepositoryError::FieldValueError {
                    field: field.to_string(),
                    message: format!("值类型不匹配: {}", value),
                });
            }
        }

        let now = Utc::now().to_rfc3339();
        let rows_affected = tx.execute(
            r#"
            UPDATE games
            SET title = ?1, title_key = ?2, status = ?3, hype_score = ?4, rating = ?5,
                progress = ?6, playtime_hours = ?7, finish_year = ?8, release_year = ?9,
                price = ?10, platform = ?11, steam_deck = ?12, notes = ?13,
                revision = revision + 1, updated_at = ?14
            WHERE id = ?15 AND revision = ?16
            "#,
            params![
                record.title.trim(),
                normalize_title_key(&record.title),
                record.status.as_str(),
                record.hype_score,
                record.rating,
                record.progress.map(|p| p.as_str()),
                record.playtime_hours,
                record.finish_year,
                record.release_year,
                record.price,
                record.platform,
                record.steam_deck,
                record.notes,
                now,
                game_id,
                expected_revision,
            ],
        )?;

        if rows_affected == 0 {
            let actual: i64 = tx
                .query_row(
                    "SELECT revision FROM games WHERE id = ?1",
                    params![game_id],
                    |row| row.get(0),
                )
                .optional()?
                .unwrap_or(-1);
            return Err(RepositoryError::OptimisticLockFailure {
                game_id,
                expected: expected_revision,
                actual,
            });
        }

        let updated = Self::find_by_id_locked(&tx, game_id)?.ok_or_else(|| {
            RepositoryError::NotFound {
                entity: "Game".to_string(),
                id: game_id.to_string(),
            }
        })?;
        tx.commit()?;

        debug!(game_id, revision = updated.revision, fields = changes.len(), "游戏记录已更新");
        Ok(updated)
    }
}
