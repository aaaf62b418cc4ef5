// ==========================================
// 课程模板实例化引擎 - 克隆配置读取 Trait
// ==========================================
// 职责: 定义实例化引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::PrerequisitePolicy;
use async_trait::async_trait;
use std::error::Error;

/// 配置读取错误
pub type ConfigError = Box<dyn Error + Send + Sync>;

// ==========================================
// CloneConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait CloneConfigReader: Send + Sync {
    /// 先修模块无法解析时的处理策略
    ///
    /// # 默认值
    /// - WARN（丢弃并告警）
    async fn get_prerequisite_policy(&self) -> Result<PrerequisitePolicy, ConfigError>;

    /// 克隆出的测评是否直接发布
    ///
    /// # 默认值
    /// - true（测评立即可见，模块级可见性由教师另行控制）
    async fn get_publish_assessments_on_clone(&self) -> Result<bool, ConfigError>;

    /// 克隆出的模块是否直接发布
    ///
    /// # 默认值
    /// - true
    async fn get_publish_modules_on_clone(&self) -> Result<bool, ConfigError>;

    /// 配置快照（JSON），随采纳报告一并返回
    async fn get_config_snapshot(&self) -> Result<String, ConfigError>;
}
