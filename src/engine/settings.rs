// ==========================================
// 课程模板实例化引擎 - 克隆参数
// ==========================================
// 在进入阻塞事务之前一次性读取配置，事务内不再访问配置层
// ==========================================

use crate::config::CloneConfigReader;
use crate::domain::types::PrerequisitePolicy;
use crate::engine::error::{EngineError, EngineResult};

/// 单次采纳使用的克隆参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloneSettings {
    pub prerequisite_policy: PrerequisitePolicy,
    pub publish_assessments: bool,
    pub publish_modules: bool,
}

impl Default for CloneSettings {
    fn default() -> Self {
        Self {
            prerequisite_policy: PrerequisitePolicy::default(),
            publish_assessments: true,
            publish_modules: true,
        }
    }
}

impl CloneSettings {
    /// 从配置读取器加载
    pub async fn load<C>(config: &C) -> EngineResult<Self>
    where
        C: CloneConfigReader + ?Sized,
    {
        let prerequisite_policy = config
            .get_prerequisite_policy()
            .await
            .map_err(|e| EngineError::Config(e.to_string()))?;
        let publish_assessments = config
            .get_publish_assessments_on_clone()
            .await
            .map_err(|e| EngineError::Config(e.to_string()))?;
        let publish_modules = config
            .get_publish_modules_on_clone()
            .await
            .map_err(|e| EngineError::Config(e.to_string()))?;

        Ok(Self {
            prerequisite_policy,
            publish_assessments,
            publish_modules,
        })
    }
}
