// ==========================================
// 课程模板实例化引擎 - 溯源查询 API
// ==========================================
// 职责: 回答"该实例是否来自模板、来自哪个模板"
// 约束: 无映射时返回 None / false，映射缺失不是错误
// ==========================================

use std::collections::HashSet;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::template::{AssessmentTemplate, ModuleItemTemplate, ModuleTemplate};
use crate::repository::{ProvenanceRepository, TemplateRepository};

// ==========================================
// ProvenanceApi - 溯源查询 API
// ==========================================

/// 溯源查询API
///
/// 职责：
/// 1. 按实例 ID 点查来源模板（测评 / 模块 / 条目）
/// 2. 按班级批量查询带溯源的测评（徽标渲染）
pub struct ProvenanceApi {
    provenance_repo: Arc<ProvenanceRepository>,
    template_repo: Arc<TemplateRepository>,
}

impl ProvenanceApi {
    /// 创建新的ProvenanceApi实例
    pub fn new(provenance_repo: Arc<ProvenanceRepository>, template_repo: Arc<TemplateRepository>) -> Self {
        Self {
            provenance_repo,
            template_repo,
        }
    }

    // ==========================================
    // 测评
    // ==========================================

    /// 查询测评的来源模板
    pub fn get_assessment_template(&self, assessment_id: &str) -> ApiResult<Option<AssessmentTemplate>> {
        require_id("测评ID", assessment_id)?;

        match self.provenance_repo.find_assessment_mapping(assessment_id)? {
            Some(mapping) => Ok(self
                .template_repo
                .find_assessment_template(&mapping.assessment_template_id)?),
            None => Ok(None),
        }
    }

    /// 测评是否来自模板
    pub fn is_assessment_from_template(&self, assessment_id: &str) -> ApiResult<bool> {
        require_id("测评ID", assessment_id)?;
        Ok(self.provenance_repo.find_assessment_mapping(assessment_id)?.is_some())
    }

    // ==========================================
    // 模块
    // ==========================================

    /// 查询模块的来源模板
    pub fn get_module_template(&self, module_id: &str) -> ApiResult<Option<ModuleTemplate>> {
        require_id("模块ID", module_id)?;

        match self.provenance_repo.find_module_mapping(module_id)? {
            Some(mapping) => Ok(self.template_repo.find_module_template(&mapping.module_template_id)?),
            None => Ok(None),
        }
    }

    /// 模块是否来自模板
    pub fn is_module_from_template(&self, module_id: &str) -> ApiResult<bool> {
        require_id("模块ID", module_id)?;
        Ok(self.provenance_repo.find_module_mapping(module_id)?.is_some())
    }

    // ==========================================
    // 模块条目
    // ==========================================

    /// 查询模块条目的来源模板
    pub fn get_module_item_template(&self, module_item_id: &str) -> ApiResult<Option<ModuleItemTemplate>> {
        require_id("模块条目ID", module_item_id)?;

        match self.provenance_repo.find_module_item_mapping(module_item_id)? {
            Some(mapping) => Ok(self
                .template_repo
                .find_module_item_template(&mapping.module_item_template_id)?),
            None => Ok(None),
        }
    }

    /// 模块条目是否来自模板
    pub fn is_module_item_from_template(&self, module_item_id: &str) -> ApiResult<bool> {
        require_id("模块条目ID", module_item_id)?;
        Ok(self.provenance_repo.find_module_item_mapping(module_item_id)?.is_some())
    }

    // ==========================================
    // 批量
    // ==========================================

    /// 班级内带溯源的测评 ID 集合
    pub fn templated_assessment_ids(&self, class_id: &str) -> ApiResult<HashSet<String>> {
        require_id("班级ID", class_id)?;

        Ok(self
            .provenance_repo
            .find_assessment_mappings_by_class(class_id)?
            .into_iter()
            .map(|mapping| mapping.assessment_id)
            .collect())
    }
}

fn require_id(label: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", label)));
    }
    Ok(())
}
