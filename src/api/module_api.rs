// ==========================================
// 课程模板实例化引擎 - 班级课程结构查询 API
// ==========================================
// 职责: 按顺序返回班级的模块与条目，供课程页面渲染
// 说明: 条目描述在读取时计算（自定义描述优先，否则取所引用测评的描述）
// ==========================================

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::instance::{Assessment, Module, ModuleItem};
use crate::domain::types::ModuleItemKind;
use crate::repository::{AssessmentRepository, ClassRepository, ModuleRepository, ProvenanceRepository};

// ==========================================
// ModuleApi - 班级课程结构 API
// ==========================================
pub struct ModuleApi {
    class_repo: Arc<ClassRepository>,
    module_repo: Arc<ModuleRepository>,
    assessment_repo: Arc<AssessmentRepository>,
    provenance_repo: Arc<ProvenanceRepository>,
}

impl ModuleApi {
    /// 创建新的ModuleApi实例
    pub fn new(
        class_repo: Arc<ClassRepository>,
        module_repo: Arc<ModuleRepository>,
        assessment_repo: Arc<AssessmentRepository>,
        provenance_repo: Arc<ProvenanceRepository>,
    ) -> Self {
        Self {
            class_repo,
            module_repo,
            assessment_repo,
            provenance_repo,
        }
    }

    /// 查询班级的完整课程结构
    ///
    /// # 参数
    /// - class_id: 班级ID
    ///
    /// # 返回
    /// - Ok(Vec<ModuleView>): 按 order_index 排序的模块（含有序条目）
    /// - Err(ApiError::NotFound): 班级不存在
    pub fn list_class_curriculum(&self, class_id: &str) -> ApiResult<Vec<ModuleView>> {
        if class_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("班级ID不能为空".to_string()));
        }

        if self.class_repo.find_by_id(class_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Class(id={})不存在", class_id)));
        }

        let assessments: HashMap<String, Assessment> = self
            .assessment_repo
            .find_by_class(class_id)?
            .into_iter()
            .map(|a| (a.assessment_id.clone(), a))
            .collect();

        let templated_modules: HashSet<String> = self
            .provenance_repo
            .find_module_mappings_by_class(class_id)?
            .into_iter()
            .map(|m| m.module_id)
            .collect();

        let modules = self.module_repo.find_by_class(class_id)?;
        let mut views = Vec::with_capacity(modules.len());

        for module in modules {
            let items = self.module_repo.find_items_by_module(&module.module_id)?;
            let templated_items: HashSet<String> = self
                .provenance_repo
                .find_module_item_mappings_by_module(&module.module_id)?
                .into_iter()
                .map(|m| m.module_item_id)
                .collect();

            let item_views = items
                .iter()
                .map(|item| {
                    let assessment = item.assessment_id.as_ref().and_then(|id| assessments.get(id));
                    ModuleItemView::build(item, assessment, templated_items.contains(&item.module_item_id))
                })
                .collect();

            let from_template = templated_modules.contains(&module.module_id);
            views.push(ModuleView::build(module, from_template, item_views));
        }

        tracing::debug!(class_id, modules = views.len(), "班级课程结构查询完成");
        Ok(views)
    }
}

// ==========================================
// 视图对象
// ==========================================

/// 模块视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleView {
    pub module_id: String,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub is_published: bool,
    pub unlock_at: Option<NaiveDateTime>,
    pub prerequisite_ids: Vec<String>,
    pub from_template: bool,
    pub items: Vec<ModuleItemView>,
}

impl ModuleView {
    fn build(module: Module, from_template: bool, items: Vec<ModuleItemView>) -> Self {
        Self {
            module_id: module.module_id,
            title: module.title,
            description: module.description,
            order_index: module.order_index,
            is_published: module.is_published,
            unlock_at: module.unlock_at,
            prerequisite_ids: module.prerequisite_ids,
            from_template,
            items,
        }
    }
}

/// 模块条目视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleItemView {
    pub module_item_id: String,
    pub item_kind: ModuleItemKind,
    pub title: String,
    pub assessment_id: Option<String>,
    pub effective_description: Option<String>,
    pub page_content: Option<String>,
    pub external_url: Option<String>,
    pub order_index: i32,
    pub is_published: bool,
    pub is_required: bool,
    pub from_template: bool,
}

impl ModuleItemView {
    fn build(item: &ModuleItem, assessment: Option<&Assessment>, from_template: bool) -> Self {
        Self {
            module_item_id: item.module_item_id.clone(),
            item_kind: item.item_kind,
            title: item.title.clone(),
            assessment_id: item.assessment_id.clone(),
            effective_description: item.effective_description(assessment).map(str::to_string),
            page_content: item.page_content.clone(),
            external_url: item.external_url.clone(),
            order_index: item.order_index,
            is_published: item.is_published,
            is_required: item.is_required,
            from_template,
        }
    }
}
