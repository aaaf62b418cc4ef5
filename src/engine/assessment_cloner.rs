// ==========================================
// 课程模板实例化引擎 - 测评克隆器 (Assessment Cloner)
// ==========================================
// 职责: 将课程的启用测评模板实例化到班级
// 输出: AssessmentLookup（供模块克隆解析 ASSESSMENT 条目）
// 约束:
// - 按 order_index 顺序逐个写入，每写一个测评立即写一条溯源
// - 讨论策略仅对 DISCUSSION 类型复制，其他类型留空
// - 运行在调用方事务内，任一步失败由调用方整体回滚
// ==========================================

use crate::domain::instance::Assessment;
use crate::domain::provenance::AssessmentTemplateMapping;
use crate::domain::template::AssessmentTemplate;
use crate::engine::error::EngineResult;
use crate::engine::lookup::AssessmentLookup;
use crate::engine::settings::CloneSettings;
use crate::engine::slug::slugify;
use crate::repository::{AssessmentRepository, ProvenanceRepository, TemplateRepository};
use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use tracing::{debug, info};
use uuid::Uuid;

/// 测评克隆结果
#[derive(Debug, Clone)]
pub struct AssessmentCloneOutcome {
    pub lookup: AssessmentLookup,
    pub created: usize,
}

// ==========================================
// AssessmentCloner
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct AssessmentCloner;

impl AssessmentCloner {
    pub fn new() -> Self {
        Self
    }

    /// 由模板构造测评实例（不落库）
    ///
    /// 截止时间、最大尝试次数等班级级设置不来自模板，保持为空
    pub fn materialize(
        &self,
        template: &AssessmentTemplate,
        class_id: &str,
        publish: bool,
        created_at: NaiveDateTime,
    ) -> Assessment {
        let discussion = template
            .assessment_type
            .carries_discussion_policy()
            .then(|| template.discussion_defaults.clone());

        Assessment {
            assessment_id: Uuid::new_v4().to_string(),
            class_id: class_id.to_string(),
            title: template.title.clone(),
            slug: slugify(&template.title),
            description: template.description.clone(),
            assessment_type: template.assessment_type,
            max_points: template.default_max_points,
            submission_mode: template.default_submission_mode,
            is_published: publish,
            order_index: template.order_index,
            discussion,
            due_at: None,
            max_attempts: None,
            created_at,
        }
    }

    /// 在调用方事务内克隆课程的全部启用测评模板
    pub fn clone_course_tx(
        &self,
        conn: &Connection,
        class_id: &str,
        course_id: &str,
        settings: &CloneSettings,
    ) -> EngineResult<AssessmentCloneOutcome> {
        let templates = TemplateRepository::find_active_assessment_templates_tx(conn, course_id)?;
        let mut lookup = AssessmentLookup::empty(class_id);

        if templates.is_empty() {
            info!(class_id, course_id, "课程没有启用的测评模板，跳过测评克隆");
            return Ok(AssessmentCloneOutcome { lookup, created: 0 });
        }

        let now = Local::now().naive_local();
        for template in &templates {
            let assessment = self.materialize(template, class_id, settings.publish_assessments, now);
            AssessmentRepository::insert_tx(conn, &assessment)?;
            ProvenanceRepository::insert_assessment_mapping_tx(
                conn,
                &AssessmentTemplateMapping {
                    class_id: class_id.to_string(),
                    assessment_id: assessment.assessment_id.clone(),
                    assessment_template_id: template.template_id.clone(),
                },
            )?;
            lookup.record(&template.template_id, &assessment.assessment_id);

            debug!(
                template_id = %template.template_id,
                assessment_id = %assessment.assessment_id,
                slug = %assessment.slug,
                "测评已实例化"
            );
        }

        info!(class_id, course_id, created = templates.len(), "测评克隆完成");

        Ok(AssessmentCloneOutcome {
            lookup,
            created: templates.len(),
        })
    }
}
