// ==========================================
// 课程模板实例化引擎 - 溯源映射
// ==========================================
// 映射以旁路表形式存在，实例表本身不含模板外键
// 无映射行的实例是教师后续手工创建的，同样合法
// ==========================================

use serde::{Deserialize, Serialize};

/// 测评实例 ← 测评模板
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentTemplateMapping {
    pub class_id: String,
    pub assessment_id: String,
    pub assessment_template_id: String,
}

/// 模块实例 ← 模块模板
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleTemplateMapping {
    pub class_id: String,
    pub module_id: String,
    pub module_template_id: String,
}

/// 模块条目实例 ← 模块条目模板
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleItemTemplateMapping {
    pub module_id: String,
    pub module_item_id: String,
    pub module_item_template_id: String,
}
