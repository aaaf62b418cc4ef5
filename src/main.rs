// ==========================================
// 课程模板实例化引擎 - 命令行入口
// ==========================================
// 用法:
//   curriculum-engine adopt <class_id> <course_id> [<class_id> <course_id> ...]
//   curriculum-engine show <class_id>
//   任意位置追加 --json-logs 以 JSON 格式输出日志
// 数据库路径: CURRICULUM_ENGINE_DB_PATH 或用户数据目录
// ==========================================

use anyhow::{anyhow, bail, Context};
use futures::future::join_all;

use curriculum_engine::app::{get_default_db_path, AppState};
use curriculum_engine::logging;

const USAGE: &str = "用法: curriculum-engine [--json-logs] adopt <class_id> <course_id> [<class_id> <course_id> ...] | show <class_id>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (log_format, args) = logging::take_log_format(std::env::args().skip(1).collect());
    logging::init_with_format(log_format);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", curriculum_engine::APP_NAME, curriculum_engine::VERSION);
    tracing::info!("==================================================");

    let (command, rest) = args.split_first().ok_or_else(|| anyhow!(USAGE))?;

    let db_path = get_default_db_path();
    tracing::info!(db_path = %db_path, "使用数据库");
    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    match command.as_str() {
        "adopt" => adopt(&state, rest).await,
        "show" => {
            let class_id = rest.first().ok_or_else(|| anyhow!(USAGE))?;
            let curriculum = state
                .module_api
                .list_class_curriculum(class_id)
                .with_context(|| format!("查询班级课程结构失败: class_id={}", class_id))?;
            println!("{}", serde_json::to_string_pretty(&curriculum)?);
            Ok(())
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }
}

/// 批量采纳: 各班级独立事务，单个失败不影响其他班级
async fn adopt(state: &AppState, pairs: &[String]) -> anyhow::Result<()> {
    if pairs.is_empty() || pairs.len() % 2 != 0 {
        bail!(USAGE);
    }

    let tasks = pairs.chunks(2).map(|pair| {
        let (class_id, course_id) = (pair[0].as_str(), pair[1].as_str());
        async move {
            let result = state.adoption_api.adopt_course(class_id, course_id).await;
            (class_id, course_id, result)
        }
    });

    let mut failures = 0usize;
    for (class_id, course_id, result) in join_all(tasks).await {
        match result {
            Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
            Err(e) => {
                failures += 1;
                tracing::error!(class_id, course_id, error = %e, "课程采纳失败");
                eprintln!("采纳失败 class_id={} course_id={}: {}", class_id, course_id, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} 个班级采纳失败", failures);
    }
    Ok(())
}
