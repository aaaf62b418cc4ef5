// ==========================================
// 课程采纳API
// ==========================================
// 职责: 封装课程模板实例化入口（测评克隆、模块克隆、完整采纳）
// 约束: 同一班级只应采纳一次；重复调用会产生重复实例
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::CloneConfigReader;
use crate::engine::{AdoptionReport, CurriculumInstantiator, CurriculumRepositories};

/// 课程采纳API
pub struct AdoptionApi<C>
where
    C: CloneConfigReader,
{
    instantiator: CurriculumInstantiator<C>,
}

impl<C> AdoptionApi<C>
where
    C: CloneConfigReader,
{
    /// 创建新的AdoptionApi实例
    pub fn new(repos: &CurriculumRepositories, config: Arc<C>) -> Self {
        Self {
            instantiator: CurriculumInstantiator::new(repos, config),
        }
    }

    /// 将课程的测评模板克隆到班级
    ///
    /// # 返回
    /// - Ok(usize): 创建的测评数量（无启用模板时为 0）
    pub async fn clone_assessments(&self, class_id: &str, course_id: &str) -> ApiResult<usize> {
        validate_ids(class_id, course_id)?;
        Ok(self.instantiator.clone_assessments(class_id, course_id).await?)
    }

    /// 将课程的模块模板克隆到班级（需先完成测评克隆）
    ///
    /// # 返回
    /// - Ok(usize): 创建的模块数量
    /// - Err(ApiError::CurriculumConfigurationError): 测评引用无法解析
    pub async fn clone_modules(&self, class_id: &str, course_id: &str) -> ApiResult<usize> {
        validate_ids(class_id, course_id)?;
        Ok(self.instantiator.clone_modules(class_id, course_id).await?)
    }

    /// 完整采纳（单事务）
    pub async fn adopt_course(&self, class_id: &str, course_id: &str) -> ApiResult<AdoptionReport> {
        validate_ids(class_id, course_id)?;
        Ok(self.instantiator.adopt_course(class_id, course_id).await?)
    }
}

fn validate_ids(class_id: &str, course_id: &str) -> ApiResult<()> {
    if class_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("班级ID不能为空".to_string()));
    }
    if course_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("课程ID不能为空".to_string()));
    }
    Ok(())
}
