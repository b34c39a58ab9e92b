// ==========================================
// 游戏收藏导入系统 - 导入执行器
// ==========================================
// 职责: 编排一次导入会话（两阶段）
// 阶段一 run: 校验映射 → 标准化 → 分类 → 立即写入 create/auto-update → 收集冲突
// 阶段二 resolve_conflicts: 应用用户决定
// 说明: 两阶段之间不保证原子性，放弃会话时阶段一的写入保留
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::import::{ConflictItem, ImportSummary, Resolution, ResolveSummary, SkipReason};
use crate::domain::sheet::Sheet;
use crate::domain::types::{GameStatus, MergeStrategy, ProcessingStrategy};
use crate::importer::conflict_detector::{Classification, ConflictDetector, IdentityIndex};
use crate::importer::conflict_resolver::ConflictResolver;
use crate::importer::data_cleaner::{DataCleaner, ValidValues};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::mapping::MappingConfiguration;
use crate::importer::merge_planner::{MergePlanner, PlannedRow};
use crate::importer::proposal::FieldMappingProposalSource;
use crate::repository::GameRepository;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ImportExecutor - 单个导入会话
// ==========================================
pub struct ImportExecutor<R, C>
where
    R: GameRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    repo: R,

    // 配置读取器
    config: C,

    // 行处理策略
    processing_strategy: ProcessingStrategy,

    // 当前运行的冲突
    resolver: ConflictResolver,
}

impl<R, C> ImportExecutor<R, C>
where
    R: GameRepository,
    C: ImportConfigReader,
{
    /// 创建新的导入会话
    ///
    /// # 参数
    /// - repo: 游戏记录仓储
    /// - config: 配置读取器
    pub fn new(repo: R, config: C) -> Self {
        Self {
            repo,
            config,
            processing_strategy: ProcessingStrategy::default(),
            resolver: ConflictResolver::default(),
        }
    }

    /// 设置行处理策略（skip: 身份键已存在的行直接跳过）
    pub fn with_processing_strategy(mut self, strategy: ProcessingStrategy) -> Self {
        self.processing_strategy = strategy;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 当前仍待确认的冲突
    pub fn pending_conflicts(&self) -> Vec<ConflictItem> {
        self.resolver.pending().into_iter().cloned().collect()
    }

    /// 读取合法枚举值与默认状态
    async fn load_rules(&self) -> ImportResult<(ValidValues, GameStatus)> {
        let status = self
            .config
            .get_status_vocabulary()
            .await
            .map_err(|e| ImportError::Config(e.to_string()))?;
        let progress = self
            .config
            .get_progress_vocabulary()
            .await
            .map_err(|e| ImportError::Config(e.to_string()))?;
        let default_status = self
            .config
            .get_default_status()
            .await
            .map_err(|e| ImportError::Config(e.to_string()))?;

        Ok((ValidValues::new(status, progress), default_status))
    }

    /// 生成默认列映射
    ///
    /// # 参数
    /// - sheet: 工作表
    /// - source: 映射建议来源（默认 HeaderProposer）
    pub async fn propose_mapping(
        &self,
        sheet: &Sheet,
        source: &dyn FieldMappingProposalSource,
    ) -> ImportResult<MappingConfiguration> {
        let min_confidence = self
            .config
            .get_min_proposal_confidence()
            .await
            .map_err(|e| ImportError::Config(e.to_string()))?;

        let proposals = source.propose(sheet);
        let mapping = MappingConfiguration::propose_default(sheet, &proposals, min_confidence);
        debug!(proposals = proposals.len(), min_confidence, "默认映射已生成");
        Ok(mapping)
    }

    /// 阶段一: 执行导入
    ///
    /// # 参数
    /// - sheet: 工作表
    /// - mapping: 列映射配置
    /// - strategy: 合并策略
    ///
    /// # 返回
    /// - Ok(ImportSummary): 每行恰好计入 created/updated/skipped/conflict/failed 之一
    /// - Err(ImportError::Mapping): 映射无效，未写入任何数据
    /// - Err(ImportError::Store): 无法读取现有记录，未写入任何数据
    ///
    /// # 说明
    /// - 上一次运行遗留的待确认冲突仅在本次运行开始写入前按 existing 关闭，
    ///   数量记入 ImportSummary::defaulted_prior；运行中止时保持待确认
    #[instrument(skip(self, sheet, mapping), fields(sheet = %sheet.name, run_id))]
    pub async fn run(
        &mut self,
        sheet: &Sheet,
        mapping: &MappingConfiguration,
        strategy: MergeStrategy,
    ) -> ImportResult<ImportSummary> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        info!(
            run_id = %run_id,
            rows = sheet.row_count(),
            strategy = %strategy,
            "开始导入"
        );

        // === 步骤 1: 读取配置并校验映射 ===
        debug!("步骤 1: 校验映射");
        let (valid, default_status) = self.load_rules().await?;
        mapping.validate(sheet, &valid)?;

        // === 步骤 2: 标准化 ===
        debug!("步骤 2: 标准化");
        let planner = MergePlanner::new(DataCleaner::new(valid), default_status);
        let planned = planner.normalize(sheet, mapping);

        // === 步骤 3: 加载身份键索引 ===
        debug!("步骤 3: 加载现有记录");
        let mut index = IdentityIndex::from_games(self.repo.list_games().await?);
        debug!(existing = index.len(), "现有记录已加载");

        // 映射校验与记录加载成功后才关闭上一次运行遗留的冲突（按 existing 处理）
        let leftover = self.resolver.close();
        if leftover > 0 {
            warn!(leftover, "上一次运行存在未处理冲突，已默认保留现有数据");
        }

        // === 步骤 4: 分类并写入 ===
        debug!("步骤 4: 分类并写入");
        let detector = ConflictDetector::new(strategy);
        let mut summary = ImportSummary::new(run_id.clone(), sheet.row_count());
        summary.defaulted_prior = leftover;
        let mut conflicted: HashSet<i64> = HashSet::new();

        for row in planned {
            let (row_index, record) = match row {
                PlannedRow::ParseFailed(e) => {
                    debug!(row_index = e.row_index, field = %e.field, "值转换失败，跳过该行");
                    summary.record_skip(e.row_index, SkipReason::ParseError, Some(e.to_string()));
                    continue;
                }
                PlannedRow::MissingTitle { row_index } => {
                    summary.record_skip(row_index, SkipReason::MissingTitle, None);
                    continue;
                }
                PlannedRow::Record { row_index, record } => (row_index, record),
            };

            let key = record.identity_key();
            if self.processing_strategy == ProcessingStrategy::Skip && index.contains(&key) {
                summary.record_skip(row_index, SkipReason::KnownIdentity, Some(key.to_string()));
                continue;
            }

            let existing = index.get(&key).cloned();
            if let Some(game) = &existing {
                if conflicted.contains(&game.id) {
                    summary.record_skip(
                        row_index,
                        SkipReason::DuplicateConflict,
                        Some(format!("game_id={}", game.id)),
                    );
                    continue;
                }
            }

            match detector.classify(&record, existing.as_ref().map(|g| &g.record)) {
                Classification::Create => match self.repo.create_game(&record).await {
                    Ok(created) => {
                        debug!(row_index, game_id = created.id, "新建记录");
                        index.upsert(created);
                        summary.record_created();
                    }
                    Err(e) => {
                        warn!(row_index, error = %e, "新建记录失败");
                        summary.record_failure(row_index, None, e.to_string());
                    }
                },
                Classification::AutoUpdate { changes } => {
                    // AutoUpdate 只会在存在现有记录时产生
                    let Some(game) = existing else { continue };
                    match self.repo.update_game(game.id, game.revision, &changes).await {
                        Ok(updated) => {
                            debug!(row_index, game_id = updated.id, fields = changes.len(), "自动更新记录");
                            index.upsert(updated);
                            summary.record_updated();
                        }
                        Err(e) => {
                            warn!(row_index, game_id = game.id, error = %e, "更新记录失败");
                            summary.record_failure(row_index, Some(game.id), e.to_string());
                        }
                    }
                }
                Classification::NoOp => {
                    summary.record_skip(row_index, SkipReason::NoChanges, None);
                }
                Classification::Conflict { fields } => {
                    let Some(game) = existing else { continue };
                    debug!(row_index, game_id = game.id, fields = fields.len(), "检测到冲突");
                    conflicted.insert(game.id);
                    summary.record_conflict(ConflictItem {
                        row_index,
                        game_id: game.id,
                        existing_revision: game.revision,
                        existing: game.record,
                        new_data: record,
                        fields,
                    });
                }
            }
        }

        self.resolver = ConflictResolver::new(summary.conflicts.clone());

        info!(
            run_id = %run_id,
            total = summary.total_rows,
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed,
            pending = summary.pending,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "导入阶段一完成"
        );

        Ok(summary)
    }

    /// 阶段二: 应用冲突解决指令
    ///
    /// # 返回
    /// - ResolveSummary: 单条指令失败计入 failed，不中断其他指令
    #[instrument(skip(self, resolutions), fields(count = resolutions.len()))]
    pub async fn resolve_conflicts(
        &mut self,
        resolutions: Vec<Resolution>,
    ) -> ImportResult<ResolveSummary> {
        Ok(self.resolver.resolve(&self.repo, resolutions).await)
    }

    /// 关闭会话: 未处理的冲突按 existing 处理
    ///
    /// # 返回
    /// - 被默认处理的冲突数
    pub fn close(&mut self) -> usize {
        self.resolver.close()
    }
}
