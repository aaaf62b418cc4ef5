// ==========================================
// 课程模板实例化引擎 - 模块克隆器 (Module Cloner)
// ==========================================
// 职责: 将课程的启用模块模板及其条目实例化到班级
// 前置: 必须持有同一班级的 AssessmentLookup
// 流程:
// 1. 逐个模块写入（先修列表置空）+ 模块溯源
// 2. 逐个条目写入 + 条目溯源；ASSESSMENT 条目经查找表解析
// 3. 全部模块写完后交给 PrerequisiteResolver 回填先修
// 红线: ASSESSMENT 引用解析失败立即返回错误，不写入悬空条目
// ==========================================

use crate::domain::instance::{Module, ModuleItem};
use crate::domain::provenance::{ModuleItemTemplateMapping, ModuleTemplateMapping};
use crate::domain::template::{ModuleItemTemplate, ModuleTemplate};
use crate::domain::types::ModuleItemKind;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::lookup::AssessmentLookup;
use crate::engine::prerequisite::{PrerequisiteReport, PrerequisiteResolver};
use crate::engine::settings::CloneSettings;
use crate::repository::{ModuleRepository, ProvenanceRepository, TemplateRepository};
use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use tracing::{debug, info};
use uuid::Uuid;

/// 模块克隆结果
#[derive(Debug, Clone, Default)]
pub struct ModuleCloneOutcome {
    pub modules_created: usize,
    pub items_created: usize,
    pub prerequisites: PrerequisiteReport,
}

// ==========================================
// ModuleCloner
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleCloner {
    resolver: PrerequisiteResolver,
}

impl ModuleCloner {
    pub fn new() -> Self {
        Self {
            resolver: PrerequisiteResolver::new(),
        }
    }

    /// 由模板构造模块实例；先修列表在第二遍回填
    pub fn materialize_module(
        &self,
        template: &ModuleTemplate,
        class_id: &str,
        publish: bool,
        created_at: NaiveDateTime,
    ) -> Module {
        Module {
            module_id: Uuid::new_v4().to_string(),
            class_id: class_id.to_string(),
            title: template.title.clone(),
            description: template.description.clone(),
            order_index: template.order_index,
            is_published: publish,
            unlock_at: template.default_unlock_at,
            prerequisite_ids: Vec::new(),
            created_at,
        }
    }

    /// 由条目模板构造条目实例
    ///
    /// ASSESSMENT 条目的测评模板必须在查找表中命中，
    /// 其他类型原样复制内容字段，不涉及测评
    pub fn materialize_item(
        &self,
        template: &ModuleItemTemplate,
        module_id: &str,
        assessments: &AssessmentLookup,
    ) -> EngineResult<ModuleItem> {
        let assessment_id = match template.item_kind {
            ModuleItemKind::Assessment => {
                let assessment_template_id = template.assessment_template_id.as_deref().ok_or_else(|| {
                    EngineError::AssessmentItemWithoutTemplate {
                        item_template_id: template.template_id.clone(),
                        item_title: template.title.clone(),
                    }
                })?;

                let resolved = assessments.resolve(assessment_template_id).ok_or_else(|| {
                    EngineError::MissingAssessmentReference {
                        assessment_template_id: assessment_template_id.to_string(),
                        item_title: template.title.clone(),
                    }
                })?;
                Some(resolved.to_string())
            }
            ModuleItemKind::Page | ModuleItemKind::ExternalLink => None,
        };

        Ok(ModuleItem {
            module_item_id: Uuid::new_v4().to_string(),
            module_id: module_id.to_string(),
            item_kind: template.item_kind,
            title: template.title.clone(),
            assessment_id,
            custom_description: template.custom_description.clone(),
            page_content: template.page_content.clone(),
            external_url: template.external_url.clone(),
            order_index: template.order_index,
            is_published: template.is_published,
            is_required: template.is_required,
        })
    }

    /// 在调用方事务内克隆课程的全部启用模块模板
    pub fn clone_course_tx(
        &self,
        conn: &Connection,
        class_id: &str,
        course_id: &str,
        assessments: &AssessmentLookup,
        settings: &CloneSettings,
    ) -> EngineResult<ModuleCloneOutcome> {
        if assessments.class_id() != class_id {
            return Err(EngineError::LookupScopeMismatch {
                expected_class_id: class_id.to_string(),
                lookup_class_id: assessments.class_id().to_string(),
            });
        }

        let templates = TemplateRepository::find_active_module_templates_with_items_tx(conn, course_id)?;
        if templates.is_empty() {
            info!(class_id, course_id, "课程没有启用的模块模板，跳过模块克隆");
            return Ok(ModuleCloneOutcome::default());
        }

        let now = Local::now().naive_local();
        let mut items_created = 0usize;

        for entry in &templates {
            let module = self.materialize_module(&entry.module, class_id, settings.publish_modules, now);
            ModuleRepository::insert_module_tx(conn, &module)?;
            ProvenanceRepository::insert_module_mapping_tx(
                conn,
                &ModuleTemplateMapping {
                    class_id: class_id.to_string(),
                    module_id: module.module_id.clone(),
                    module_template_id: entry.module.template_id.clone(),
                },
            )?;

            for item_template in &entry.items {
                let item = self.materialize_item(item_template, &module.module_id, assessments)?;
                ModuleRepository::insert_item_tx(conn, &item)?;
                ProvenanceRepository::insert_module_item_mapping_tx(
                    conn,
                    &ModuleItemTemplateMapping {
                        module_id: module.module_id.clone(),
                        module_item_id: item.module_item_id.clone(),
                        module_item_template_id: item_template.template_id.clone(),
                    },
                )?;
                items_created += 1;
            }

            debug!(
                template_id = %entry.module.template_id,
                module_id = %module.module_id,
                items = entry.items.len(),
                "模块已实例化"
            );
        }

        let module_templates: Vec<ModuleTemplate> =
            templates.iter().map(|entry| entry.module.clone()).collect();
        let prerequisites = self.resolver.resolve_tx(
            conn,
            class_id,
            &module_templates,
            settings.prerequisite_policy,
        )?;

        info!(
            class_id,
            course_id,
            modules_created = templates.len(),
            items_created,
            prerequisite_edges = prerequisites.resolved_edges,
            dropped_prerequisites = prerequisites.dropped.len(),
            "模块克隆完成"
        );

        Ok(ModuleCloneOutcome {
            modules_created: templates.len(),
            items_created,
            prerequisites,
        })
    }
}
