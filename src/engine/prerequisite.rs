// ==========================================
// 课程模板实例化引擎 - 先修模块解析 (Prerequisite Resolver)
// ==========================================
// 第二遍处理: 全部模块写入后，由刚写入的模块溯源重建 ModuleLookup，
// 把模板上的先修模板 ID 列表翻译为实例 ID 列表并回填
// 策略:
// - DROP: 静默丢弃无法解析的先修
// - WARN: 丢弃并记录告警（默认）
// - FAIL: 返回错误，整个采纳回滚
// 自引用视为无法解析
// ==========================================

use crate::domain::template::ModuleTemplate;
use crate::domain::types::PrerequisitePolicy;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::lookup::ModuleLookup;
use crate::repository::{ModuleRepository, ProvenanceRepository, RepositoryError};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, warn};

/// 被丢弃的先修引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedPrerequisite {
    pub module_template_id: String,
    pub prerequisite_template_id: String,
}

/// 先修解析汇总
#[derive(Debug, Clone, Default, Serialize)]
pub struct PrerequisiteReport {
    pub resolved_edges: usize,
    pub dropped: Vec<DroppedPrerequisite>,
}

/// 单个模块的翻译结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslatedPrerequisites {
    pub resolved: Vec<String>,
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrerequisiteResolver;

impl PrerequisiteResolver {
    pub fn new() -> Self {
        Self
    }

    /// 翻译单个模板的先修列表（保持原顺序）
    pub fn translate(&self, template: &ModuleTemplate, lookup: &ModuleLookup) -> TranslatedPrerequisites {
        let own_module_id = lookup.resolve(&template.template_id);
        let mut translated = TranslatedPrerequisites::default();

        for prerequisite_template_id in &template.default_prerequisite_ids {
            match lookup.resolve(prerequisite_template_id) {
                Some(module_id) if Some(module_id) != own_module_id => {
                    translated.resolved.push(module_id.to_string());
                }
                _ => translated.unresolved.push(prerequisite_template_id.clone()),
            }
        }

        translated
    }

    /// 在调用方事务内回填班级模块的先修列表
    pub fn resolve_tx(
        &self,
        conn: &Connection,
        class_id: &str,
        templates: &[ModuleTemplate],
        policy: PrerequisitePolicy,
    ) -> EngineResult<PrerequisiteReport> {
        let mappings = ProvenanceRepository::find_module_mappings_by_class_tx(conn, class_id)?;
        let lookup = ModuleLookup::from_mappings(class_id, &mappings);
        let mut report = PrerequisiteReport::default();

        for template in templates.iter().filter(|t| !t.default_prerequisite_ids.is_empty()) {
            let module_id = lookup.resolve(&template.template_id).ok_or_else(|| {
                RepositoryError::NotFound {
                    entity: "ModuleTemplateMapping".to_string(),
                    id: template.template_id.clone(),
                }
            })?;

            let translated = self.translate(template, &lookup);

            for prerequisite_template_id in translated.unresolved {
                match policy {
                    PrerequisitePolicy::Fail => {
                        return Err(EngineError::UnresolvedPrerequisite {
                            module_template_id: template.template_id.clone(),
                            prerequisite_template_id,
                        });
                    }
                    PrerequisitePolicy::Warn => {
                        warn!(
                            class_id,
                            module_template_id = %template.template_id,
                            prerequisite_template_id = %prerequisite_template_id,
                            "先修模块在本班级无实例，已丢弃"
                        );
                    }
                    PrerequisitePolicy::Drop => {
                        debug!(
                            class_id,
                            module_template_id = %template.template_id,
                            prerequisite_template_id = %prerequisite_template_id,
                            "先修模块无法解析，已丢弃"
                        );
                    }
                }
                report.dropped.push(DroppedPrerequisite {
                    module_template_id: template.template_id.clone(),
                    prerequisite_template_id,
                });
            }

            if !translated.resolved.is_empty() {
                ModuleRepository::update_prerequisites_tx(conn, module_id, &translated.resolved)?;
                report.resolved_edges += translated.resolved.len();
            }
        }

        Ok(report)
    }
}
