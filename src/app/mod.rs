// ==========================================
// 课程模板实例化引擎 - 应用层
// ==========================================
// 职责: 组装仓储、配置与 API，供二进制入口使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
