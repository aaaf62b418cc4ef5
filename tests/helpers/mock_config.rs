// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use curriculum_engine::config::{CloneConfigReader, ConfigError};
use curriculum_engine::domain::types::PrerequisitePolicy;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub prerequisite_policy: PrerequisitePolicy,
    pub publish_assessments: bool,
    pub publish_modules: bool,
}

impl MockConfig {
    /// 创建默认配置（WARN + 全部发布）
    pub fn default() -> Self {
        Self {
            prerequisite_policy: PrerequisitePolicy::Warn,
            publish_assessments: true,
            publish_modules: true,
        }
    }

    /// 指定先修解析策略
    pub fn with_policy(policy: PrerequisitePolicy) -> Self {
        let mut config = Self::default();
        config.prerequisite_policy = policy;
        config
    }

    /// 克隆后不发布
    pub fn unpublished() -> Self {
        let mut config = Self::default();
        config.publish_assessments = false;
        config.publish_modules = false;
        config
    }
}

#[async_trait]
impl CloneConfigReader for MockConfig {
    async fn get_prerequisite_policy(&self) -> Result<PrerequisitePolicy, ConfigError> {
        Ok(self.prerequisite_policy)
    }

    async fn get_publish_assessments_on_clone(&self) -> Result<bool, ConfigError> {
        Ok(self.publish_assessments)
    }

    async fn get_publish_modules_on_clone(&self) -> Result<bool, ConfigError> {
        Ok(self.publish_modules)
    }

    async fn get_config_snapshot(&self) -> Result<String, ConfigError> {
        Ok(format!(
            r#"{{"curriculum/prerequisite_policy":"{}"}}"#,
            self.prerequisite_policy.to_db_str()
        ))
    }
}
