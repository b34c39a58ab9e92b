// ==========================================
// ImportExecutor 集成测试
// ==========================================
// 测试目标: 两阶段导入流程（映射 → 合并 → 冲突确认）
// ==========================================


use async_trait::async_trait;
use game_backlog_import::config::ConfigManager;
use game_backlog_import::domain::{
    Cell, FieldChanges, FieldValue, GameRecord, GameStatus, IdentityKey, MergeStrategy,
    ProcessingStrategy, Resolution, Sheet, SkipReason, StoredGame, TargetField,
};
use game_backlog_import::importer::{
    FieldBinding, HeaderProposer, ImportError, ImportExecutor, MappingConfiguration, MappingError,
    RawKey,
};
use game_backlog_import::logging;
use game_backlog_import::repository::{
    GameRepository, GameRepositoryImpl, RepositoryError, RepositoryResult,
};
use test_helpers::{
    build_sheet, create_test_db, create_test_executor, insert_test_config, open_test_connection,
    seed_game,
};

fn finished_mapping() -> MappingConfiguration {
    let mut mapping = MappingConfiguration::new();
    mapping.set_column(TargetField::Title, Some("Juego"));
    mapping.set_column(TargetField::Status, Some("Estado"));
    mapping.set_column(TargetField::Rating, Some("Nota"));
    mapping
}

fn hades(rating: Option<f64>) -> GameRecord {
    let mut record = GameRecord::new("Hades", GameStatus::Finished);
    record.rating = rating;
    record
}

/// 对指定标题的新建、指定记录的更新返回存储错误，其余委托给 SQLite 仓储
struct FlakyRepo {
    inner: GameRepositoryImpl,
    fail_create_title: Option<String>,
    fail_update_id: Option<i64>,
}

impl FlakyRepo {
    fn new(db_path: &str) -> Self {
        Self {
            inner: GameRepositoryImpl::new(db_path).expect("Failed to create GameRepository"),
            fail_create_title: None,
            fail_update_id: None,
        }
    }
}

#[async_trait]
impl GameRepository for FlakyRepo {
    async fn list_games(&self) -> RepositoryResult<Vec<StoredGame>> {
        self.inner.list_games().await
    }

    async fn find_by_identity(&self, key: &IdentityKey) -> RepositoryResult<Option<StoredGame>> {
        self.inner.find_by_identity(key).await
    }

    async fn get_game(&self, game_id: i64) -> RepositoryResult<Option<StoredGame>> {
        self.inner.get_game(game_id).await
    }

    async fn create_game(&self, record: &GameRecord) -> RepositoryResult<StoredGame> {
        if self.fail_create_title.as_deref() == Some(record.title.as_str()) {
            return Err(RepositoryError::DatabaseQueryError("disk I/O error".into()));
        }
        self.inner.create_game(record).await
    }

    async fn update_game(
        &self,
        game_id: i64,
        expected_revision: i64,
        changes: &FieldChanges,
    ) -> RepositoryResult<StoredGame> {
        if self.fail_update_id == Some(game_id) {
            return Err(RepositoryError::DatabaseQueryError("disk I/O error".into()));
        }
        self.inner
            .update_game(game_id, expected_revision, changes)
            .await
    }
}

fn flaky_executor(repo: FlakyRepo, db_path: &str) -> ImportExecutor<FlakyRepo, ConfigManager> {
    let config = ConfigManager::new(db_path).expect("Failed to create ConfigManager");
    ImportExecutor::new(repo, config)
}

async fn load_hades(db_path: &str) -> GameRecord {
    let repo = GameRepositoryImpl::new(db_path).expect("Failed to create GameRepository");
    repo.find_by_identity(&hades(None).identity_key())
        .await
        .expect("query failed")
        .expect("Hades should exist")
        .record
}

// ==========================================
// 典型场景
// ==========================================

#[tokio::test]
async fn test_scenario_create_new_record() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet("Backlog", &["Name", "Hype"], &[&["Celeste", "8"]]);
    let mut mapping = MappingConfiguration::new();
    mapping.set_column(TargetField::Title, Some("Name"));
    mapping.set_column(TargetField::HypeScore, Some("Hype"));

    let summary = executor
        .run(&sheet, &mapping, MergeStrategy::Fill)
        .await
        .expect("run failed");

    assert_eq!(summary.created, 1);
    assert_eq!(summary.applied, 1);
    assert_eq!(summary.pending, 0);
    assert!(!summary.run_id.is_empty());

    let games = executor.repository().list_games().await.unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].record.title, "Celeste");
    assert_eq!(games[0].record.status, GameStatus::Backlog);
    assert_eq!(games[0].record.hype_score, Some(8));
}

#[tokio::test]
async fn test_scenario_overwrite_conflict_accept_new() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_game(&db_path, &hades(Some(8.5))).await;
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Terminados",
        &["Juego", "Estado", "Nota"],
        &[&["Hades", "finished", "9.0"]],
    );
    let mut summary = executor
        .run(&sheet, &finished_mapping(), MergeStrategy::Overwrite)
        .await
        .expect("run failed");

    assert_eq!(summary.updated, 0);
    assert_eq!(summary.pending, 1);
    assert_eq!(summary.conflicts.len(), 1);
    let item = summary.conflicts[0].clone();
    assert_eq!(item.fields, vec![TargetField::Rating]);
    assert_eq!(item.existing.rating, Some(8.5));
    assert_eq!(item.new_data.rating, Some(9.0));

    // 阶段一不触碰冲突记录
    assert_eq!(load_hades(&db_path).await.rating, Some(8.5));

    let resolve = executor
        .resolve_conflicts(vec![Resolution::accept_new(item.game_id, item.new_data)])
        .await
        .expect("resolve failed");
    assert_eq!(resolve.resolved, 1);
    summary.fold_resolved(&resolve);

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.pending, 0);
    assert_eq!(load_hades(&db_path).await.rating, Some(9.0));
}

#[tokio::test]
async fn test_scenario_overwrite_conflict_keep_existing() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_game(&db_path, &hades(Some(8.5))).await;
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Terminados",
        &["Juego", "Estado", "Nota"],
        &[&["Hades", "finished", "9.0"]],
    );
    let summary = executor
        .run(&sheet, &finished_mapping(), MergeStrategy::Overwrite)
        .await
        .expect("run failed");

    let resolve = executor
        .resolve_conflicts(vec![Resolution::keep_existing(summary.conflicts[0].game_id)])
        .await
        .expect("resolve failed");

    assert_eq!(resolve.kept, 1);
    assert_eq!(resolve.resolved, 0);
    assert_eq!(load_hades(&db_path).await.rating, Some(8.5));
}

#[tokio::test]
async fn test_scenario_fill_null_field_applied_immediately() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_game(&db_path, &hades(None)).await;
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Terminados",
        &["Juego", "Estado", "Nota"],
        &[&["Hades", "finished", "9.0"]],
    );
    let summary = executor
        .run(&sheet, &finished_mapping(), MergeStrategy::Fill)
        .await
        .expect("run failed");

    assert_eq!(summary.updated, 1);
    assert!(summary.conflicts.is_empty());
    assert_eq!(load_hades(&db_path).await.rating, Some(9.0));
}

#[tokio::test]
async fn test_scenario_tag_value_map_sets_status() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let mut executor = create_test_executor(&db_path);

    let mut sheet = Sheet::new("Juegos", vec!["Juego".into(), "Estado".into()]);
    sheet.push_row(vec![Cell::value("Hades"), Cell::tagged(Some(""), "FFFF0000")]);

    let mut mapping = MappingConfiguration::new();
    mapping.set_column(TargetField::Title, Some("Juego"));
    mapping.set_column(TargetField::Status, Some("Estado"));
    mapping
        .set_value_map(TargetField::Status, RawKey::tag("FF0000"), "finished")
        .unwrap();

    let summary = executor
        .run(&sheet, &mapping, MergeStrategy::Fill)
        .await
        .expect("run failed");

    assert_eq!(summary.created, 1);
    let games = executor.repository().list_games().await.unwrap();
    assert_eq!(games[0].record.status, GameStatus::Finished);
}

// ==========================================
// 合并性质
// ==========================================

#[tokio::test]
async fn test_fill_never_changes_non_null_fields() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let mut existing = hades(Some(8.5));
    existing.notes = Some("GOTY".into());
    seed_game(&db_path, &existing).await;
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Terminados",
        &["Juego", "Estado", "Nota", "Plataforma", "Notas"],
        &[&["HADES", "Finished", "9.5", "PC", "meh"]],
    );
    let mut mapping = finished_mapping();
    mapping.set_column(TargetField::Platform, Some("Plataforma"));
    mapping.set_column(TargetField::Notes, Some("Notas"));

    let summary = executor
        .run(&sheet, &mapping, MergeStrategy::Fill)
        .await
        .expect("run failed");

    assert_eq!(summary.updated, 1);
    assert!(summary.conflicts.is_empty());

    let stored = load_hades(&db_path).await;
    assert_eq!(stored.rating, Some(8.5));
    assert_eq!(stored.notes.as_deref(), Some("GOTY"));
    assert_eq!(stored.platform.as_deref(), Some("PC"));
}

#[tokio::test]
async fn test_overwrite_conflict_defers_all_fields_of_row() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_game(&db_path, &hades(Some(8.5))).await;
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Terminados",
        &["Juego", "Estado", "Nota", "Plataforma"],
        &[&["Hades", "finished", "9", "PC"]],
    );
    let mut mapping = finished_mapping();
    mapping.set_column(TargetField::Platform, Some("Plataforma"));

    let summary = executor
        .run(&sheet, &mapping, MergeStrategy::Overwrite)
        .await
        .expect("run failed");

    assert_eq!(summary.pending, 1);
    assert_eq!(summary.conflicts[0].fields, vec![TargetField::Rating]);
    assert_eq!(load_hades(&db_path).await.platform, None);
}

#[tokio::test]
async fn test_rows_see_earlier_writes_in_same_run() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Backlog",
        &["Name", "Hype", "Platform"],
        &[
            &["Celeste", "8", ""],
            &["celeste", "", "Switch"],
            &["Celeste", "8", "Switch"],
        ],
    );
    let mut mapping = MappingConfiguration::new();
    mapping.set_column(TargetField::Title, Some("Name"));
    mapping.set_column(TargetField::HypeScore, Some("Hype"));
    mapping.set_column(TargetField::Platform, Some("Platform"));

    let summary = executor
        .run(&sheet, &mapping, MergeStrategy::Fill)
        .await
        .expect("run failed");

    assert_eq!(summary.created, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.skipped_for(SkipReason::NoChanges), 1);
    assert_eq!(summary.accounted_rows(), summary.total_rows);
    assert_eq!(executor.repository().list_games().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_conflict_for_same_record_skipped() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_game(&db_path, &hades(Some(8.5))).await;
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Terminados",
        &["Juego", "Estado", "Nota"],
        &[&["Hades", "finished", "9"], &["Hades", "finished", "7"]],
    );
    let summary = executor
        .run(&sheet, &finished_mapping(), MergeStrategy::Overwrite)
        .await
        .expect("run failed");

    assert_eq!(summary.conflicts.len(), 1);
    assert_eq!(summary.conflicts[0].row_index, 0);
    assert_eq!(summary.skipped_for(SkipReason::DuplicateConflict), 1);
}

// ==========================================
// 冲突解决
// ==========================================

#[tokio::test]
async fn test_resolution_is_not_repeatable() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_game(&db_path, &hades(Some(8.5))).await;
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Terminados",
        &["Juego", "Estado", "Nota"],
        &[&["Hades", "finished", "9.0"]],
    );
    let summary = executor
        .run(&sheet, &finished_mapping(), MergeStrategy::Overwrite)
        .await
        .expect("run failed");
    let item = summary.conflicts[0].clone();

    let first = executor
        .resolve_conflicts(vec![Resolution::keep_existing(item.game_id)])
        .await
        .unwrap();
    assert_eq!(first.kept, 1);

    let second = executor
        .resolve_conflicts(vec![Resolution::accept_new(item.game_id, item.new_data)])
        .await
        .unwrap();
    assert_eq!(second.failed, 1);
    assert_eq!(second.resolved, 0);
    assert_eq!(load_hades(&db_path).await.rating, Some(8.5));
}

#[tokio::test]
async fn test_close_defaults_unresolved_to_existing() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_game(&db_path, &hades(Some(8.5))).await;
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Terminados",
        &["Juego", "Estado", "Nota"],
        &[&["Hades", "finished", "9.0"]],
    );
    let mut summary = executor
        .run(&sheet, &finished_mapping(), MergeStrategy::Overwrite)
        .await
        .expect("run failed");

    let defaulted = executor.close();
    summary.settle_defaulted(defaulted);

    assert_eq!(defaulted, 1);
    assert_eq!(summary.pending, 0);
    assert!(executor.pending_conflicts().is_empty());
    assert_eq!(load_hades(&db_path).await.rating, Some(8.5));
}

#[tokio::test]
async fn test_stale_revision_keeps_conflict_pending() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let seeded = seed_game(&db_path, &hades(Some(8.5))).await;
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Terminados",
        &["Juego", "Estado", "Nota"],
        &[&["Hades", "finished", "9.0"]],
    );
    let summary = executor
        .run(&sheet, &finished_mapping(), MergeStrategy::Overwrite)
        .await
        .expect("run failed");
    let item = summary.conflicts[0].clone();

    // 另一写入者修改了同一记录
    let other_writer = GameRepositoryImpl::new(&db_path).unwrap();
    let mut changes = FieldChanges::new();
    changes.insert(TargetField::Notes, FieldValue::Text("editado".into()));
    other_writer
        .update_game(seeded.id, seeded.revision, &changes)
        .await
        .unwrap();

    let resolve = executor
        .resolve_conflicts(vec![Resolution::accept_new(item.game_id, item.new_data)])
        .await
        .unwrap();

    assert_eq!(resolve.failed, 1);
    assert_eq!(executor.pending_conflicts().len(), 1);
    assert_eq!(load_hades(&db_path).await.rating, Some(8.5));
}

#[tokio::test]
async fn test_failed_run_keeps_previous_conflicts_pending() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_game(&db_path, &hades(Some(8.5))).await;
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Terminados",
        &["Juego", "Estado", "Nota"],
        &[&["Hades", "finished", "9.0"]],
    );
    let first = executor
        .run(&sheet, &finished_mapping(), MergeStrategy::Overwrite)
        .await
        .expect("run failed");
    let item = first.conflicts[0].clone();

    // 映射缺少标题，运行中止
    let err = executor
        .run(&sheet, &MappingConfiguration::new(), MergeStrategy::Overwrite)
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Mapping(MappingError::MissingTitle)));
    assert_eq!(executor.pending_conflicts().len(), 1);

    let resolve = executor
        .resolve_conflicts(vec![Resolution::accept_new(item.game_id, item.new_data)])
        .await
        .unwrap();
    assert_eq!(resolve.resolved, 1);
    assert_eq!(load_hades(&db_path).await.rating, Some(9.0));
}

#[tokio::test]
async fn test_next_run_reports_defaulted_prior_conflicts() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_game(&db_path, &hades(Some(8.5))).await;
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Terminados",
        &["Juego", "Estado", "Nota"],
        &[&["Hades", "finished", "9.0"]],
    );
    let first = executor
        .run(&sheet, &finished_mapping(), MergeStrategy::Overwrite)
        .await
        .expect("run failed");
    assert_eq!(first.defaulted_prior, 0);
    assert_eq!(first.pending, 1);

    let second = executor
        .run(&sheet, &finished_mapping(), MergeStrategy::Overwrite)
        .await
        .expect("run failed");

    assert_eq!(second.defaulted_prior, 1);
    assert_eq!(second.pending, 1);
    assert_eq!(load_hades(&db_path).await.rating, Some(8.5));
}

// ==========================================
// 行级 / 运行级错误
// ==========================================

#[tokio::test]
async fn test_create_failure_marks_row_failed_and_continues() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let mut repo = FlakyRepo::new(&db_path);
    repo.fail_create_title = Some("Hades".into());
    let mut executor = flaky_executor(repo, &db_path);

    let sheet = build_sheet(
        "Backlog",
        &["Name", "Hype"],
        &[&["Celeste", "8"], &["Hades", "9"], &["Hollow Knight", "7"]],
    );
    let mut mapping = MappingConfiguration::new();
    mapping.set_column(TargetField::Title, Some("Name"));
    mapping.set_column(TargetField::HypeScore, Some("Hype"));

    let summary = executor
        .run(&sheet, &mapping, MergeStrategy::Fill)
        .await
        .expect("run failed");

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].row_index, 1);
    assert_eq!(summary.failures[0].game_id, None);
    assert_eq!(summary.created, 2);
    assert_eq!(summary.accounted_rows(), summary.total_rows);

    let titles: Vec<String> = executor
        .repository()
        .list_games()
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.record.title)
        .collect();
    assert!(titles.contains(&"Hollow Knight".to_string()));
    assert!(!titles.contains(&"Hades".to_string()));
}

#[tokio::test]
async fn test_update_failure_marks_row_failed_and_continues() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let seeded = seed_game(&db_path, &hades(None)).await;
    let mut repo = FlakyRepo::new(&db_path);
    repo.fail_update_id = Some(seeded.id);
    let mut executor = flaky_executor(repo, &db_path);

    let sheet = build_sheet(
        "Terminados",
        &["Juego", "Estado", "Nota"],
        &[&["Hades", "finished", "9.0"], &["Celeste", "finished", "10"]],
    );
    let summary = executor
        .run(&sheet, &finished_mapping(), MergeStrategy::Fill)
        .await
        .expect("run failed");

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].row_index, 0);
    assert_eq!(summary.failures[0].game_id, Some(seeded.id));
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.created, 1);
    assert_eq!(summary.accounted_rows(), summary.total_rows);
    assert_eq!(load_hades(&db_path).await.rating, None);
}

#[tokio::test]
async fn test_parse_error_skips_row_only() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Backlog",
        &["Name", "Hype"],
        &[&["Celeste", "muy alto"], &["Hollow Knight", "9"], &["", "3"]],
    );
    let mut mapping = MappingConfiguration::new();
    mapping.set_column(TargetField::Title, Some("Name"));
    mapping.set_column(TargetField::HypeScore, Some("Hype"));

    let summary = executor
        .run(&sheet, &mapping, MergeStrategy::Fill)
        .await
        .expect("run failed");

    assert_eq!(summary.created, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.skipped_for(SkipReason::ParseError), 1);
    assert_eq!(summary.skipped_for(SkipReason::MissingTitle), 1);
    assert_eq!(summary.skips[0].row_index, 0);
    assert_eq!(summary.accounted_rows(), 3);
}

#[tokio::test]
async fn test_mapping_error_aborts_before_writes() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet("Backlog", &["Name", "Hype"], &[&["Celeste", "8"]]);
    let mut mapping = MappingConfiguration::new();
    mapping.set_column(TargetField::HypeScore, Some("Hype"));

    let err = executor
        .run(&sheet, &mapping, MergeStrategy::Fill)
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Mapping(MappingError::MissingTitle)));
    assert!(executor.repository().list_games().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_skip_strategy_skips_known_identity() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_game(&db_path, &hades(Some(8.5))).await;
    let mut executor =
        create_test_executor(&db_path).with_processing_strategy(ProcessingStrategy::Skip);

    let sheet = build_sheet(
        "Terminados",
        &["Juego", "Estado", "Nota"],
        &[&["hades", "finished", "9.0"], &["Celeste", "finished", "10"]],
    );
    let summary = executor
        .run(&sheet, &finished_mapping(), MergeStrategy::Overwrite)
        .await
        .expect("run failed");

    assert_eq!(summary.skipped_for(SkipReason::KnownIdentity), 1);
    assert_eq!(summary.created, 1);
    assert!(summary.conflicts.is_empty());
}

// ==========================================
// 映射建议
// ==========================================

#[tokio::test]
async fn test_propose_mapping_uses_configured_confidence() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn).expect("Failed to insert test config");
    let executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Terminados",
        &["Título", "Horas", "Unnamed: 2"],
        &[&["Hades", "40", "x"]],
    );
    let mapping = executor
        .propose_mapping(&sheet, &HeaderProposer)
        .await
        .expect("propose failed");

    assert_eq!(
        mapping.binding(TargetField::Title),
        &FieldBinding::Column("Título".into())
    );
    assert_eq!(
        mapping.binding(TargetField::PlaytimeHours),
        &FieldBinding::Column("Horas".into())
    );
    assert_eq!(mapping.binding(TargetField::Status), &FieldBinding::Unset);
}

#[tokio::test]
async fn test_proposed_mapping_ignores_unrelated_headers() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let mut executor = create_test_executor(&db_path);

    let sheet = build_sheet(
        "Backlog",
        &["Juego", "Fecha", "Desarrollador"],
        &[
            &["Celeste", "2018-01-25", "Maddy Makes Games"],
            &["Hades", "2020-09-17", "Supergiant Games"],
        ],
    );
    let mapping = executor
        .propose_mapping(&sheet, &HeaderProposer)
        .await
        .expect("propose failed");

    assert_eq!(
        mapping.binding(TargetField::Title),
        &FieldBinding::Column("Juego".into())
    );
    assert_eq!(mapping.binding(TargetField::Progress), &FieldBinding::Unset);
    assert_eq!(mapping.binding(TargetField::SteamDeck), &FieldBinding::Unset);

    let summary = executor
        .run(&sheet, &mapping, MergeStrategy::Fill)
        .await
        .expect("run failed");
    assert_eq!(summary.created, 2);
    assert_eq!(summary.skipped, 0);
}
