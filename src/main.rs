// ==========================================
// 游戏收藏导入系统 - 命令行入口
// ==========================================
// 用法:
//   game-backlog-import [db_path] <request.json>
// 说明:
// - 省略 db_path 时使用 GAME_BACKLOG_DB_PATH 或用户数据目录
// - 请求 JSON 包含 sheet / mapping / merge_strategy / processing_strategy / resolutions
// - 结果 JSON 输出到 stdout，日志输出到 stderr
// ==========================================

use anyhow::{anyhow, bail, Context};
use game_backlog_import::config::ConfigManager;
use game_backlog_import::db::{get_default_db_path, init_schema, open_sqlite_connection};
use game_backlog_import::domain::{
    ImportSummary, MergeStrategy, ProcessingStrategy, Resolution, ResolveSummary, Sheet,
};
use game_backlog_import::importer::{HeaderProposer, ImportExecutor, MappingConfiguration};
use game_backlog_import::logging;
use game_backlog_import::repository::GameRepositoryImpl;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// 导入请求
#[derive(Debug, Deserialize)]
struct ImportRequest {
    sheet: Sheet,
    /// 省略时按表头自动生成
    #[serde(default)]
    mapping: Option<MappingConfiguration>,
    #[serde(default = "default_merge_strategy")]
    merge_strategy: MergeStrategy,
    #[serde(default)]
    processing_strategy: ProcessingStrategy,
    #[serde(default)]
    resolutions: Vec<Resolution>,
}

fn default_merge_strategy() -> MergeStrategy {
    MergeStrategy::Fill
}

/// 导入结果
#[derive(Debug, Serialize)]
struct ImportResponse {
    mapping: MappingConfiguration,
    import: ImportSummary,
    resolve: ResolveSummary,
    /// 未收到指令、按 existing 默认处理的冲突数
    defaulted: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (db_path, request_path) = match args.as_slice() {
        [request] => (get_default_db_path(), request.clone()),
        [db, request] => (db.clone(), request.clone()),
        _ => bail!("用法: game-backlog-import [db_path] <request.json>"),
    };

    tracing::info!("==================================================");
    tracing::info!("{} v{}", game_backlog_import::APP_NAME, game_backlog_import::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let raw = std::fs::read_to_string(&request_path)
        .with_context(|| format!("读取请求文件失败: {}", request_path))?;
    let request: ImportRequest =
        serde_json::from_str(&raw).with_context(|| format!("请求格式错误: {}", request_path))?;

    let conn = open_sqlite_connection(&db_path).context("打开数据库失败")?;
    init_schema(&conn).context("初始化数据库失败")?;
    let conn = Arc::new(Mutex::new(conn));

    let repo = GameRepositoryImpl::from_connection(conn.clone());
    let config = ConfigManager::from_connection(conn).map_err(|e| anyhow!(e.to_string()))?;
    let mut executor =
        ImportExecutor::new(repo, config).with_processing_strategy(request.processing_strategy);

    let mapping = match request.mapping {
        Some(mapping) => mapping,
        None => executor.propose_mapping(&request.sheet, &HeaderProposer).await?,
    };

    let mut summary = executor
        .run(&request.sheet, &mapping, request.merge_strategy)
        .await?;

    let resolve = if request.resolutions.is_empty() {
        ResolveSummary::default()
    } else {
        executor.resolve_conflicts(request.resolutions).await?
    };
    summary.fold_resolved(&resolve);

    let defaulted = executor.close();
    summary.settle_defaulted(defaulted);

    let response = ImportResponse {
        mapping,
        import: summary,
        resolve,
        defaulted,
    };
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
