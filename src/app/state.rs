// ==========================================
// 课程模板实例化引擎 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::Arc;

use crate::api::{AdoptionApi, ModuleApi, ProvenanceApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_shared_connection, SharedConnection};
use crate::engine::CurriculumRepositories;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "CURRICULUM_ENGINE_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,
    /// 仓储集合
    pub repos: CurriculumRepositories,
    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
    /// 课程采纳API
    pub adoption_api: Arc<AdoptionApi<ConfigManager>>,
    /// 班级课程结构API
    pub module_api: Arc<ModuleApi>,
    /// 溯源查询API
    pub provenance_api: Arc<ProvenanceApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并初始化 schema（幂等）
    /// 2. 初始化所有Repository与ConfigManager
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = open_shared_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        {
            let guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            init_schema(&guard).map_err(|e| format!("schema 初始化失败: {}", e))?;
        }

        let mut state = Self::from_connection(conn)?;
        state.db_path = db_path;
        Ok(state)
    }

    /// 基于已有共享连接组装（schema 需已初始化）
    pub fn from_connection(conn: SharedConnection) -> Result<Self, String> {
        let repos = CurriculumRepositories::from_connection(conn.clone());

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        let adoption_api = Arc::new(AdoptionApi::new(&repos, config_manager.clone()));
        let module_api = Arc::new(ModuleApi::new(
            repos.class_repo.clone(),
            repos.module_repo.clone(),
            repos.assessment_repo.clone(),
            repos.provenance_repo.clone(),
        ));
        let provenance_api = Arc::new(ProvenanceApi::new(
            repos.provenance_repo.clone(),
            repos.template_repo.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path: String::new(),
            repos,
            config_manager,
            adoption_api,
            module_api,
            provenance_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先读取环境变量 `CURRICULUM_ENGINE_DB_PATH`，否则使用用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./curriculum_engine.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("curriculum-engine-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("curriculum-engine");
        }

        // 目录创建失败时仍返回路径，由打开连接时报错
        std::fs::create_dir_all(&path).ok();
        path = path.join("curriculum_engine.db");
    }

    path.to_string_lossy().to_string()
}
