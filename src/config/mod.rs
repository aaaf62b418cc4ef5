// ==========================================
// 课程模板实例化引擎 - 配置层
// ==========================================
// 职责: 系统配置管理
// 存储: config_kv 表
// ==========================================

pub mod clone_config_trait;
pub mod config_manager;

// 重导出核心配置管理器
pub use clone_config_trait::{CloneConfigReader, ConfigError};
pub use config_manager::{config_keys, ConfigManager};
