// ==========================================
// 课程模板实例化引擎 - 领域模型层
// ==========================================
// 职责: 定义模板、实例、溯源映射等领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod class;
pub mod instance;
pub mod provenance;
pub mod template;
pub mod types;

// 重导出核心类型
pub use class::{Class, Course};
pub use instance::{Assessment, Module, ModuleItem};
pub use provenance::{AssessmentTemplateMapping, ModuleItemTemplateMapping, ModuleTemplateMapping};
pub use template::{
    AssessmentTemplate, DiscussionPolicy, ModuleItemTemplate, ModuleTemplate,
    ModuleTemplateWithItems,
};
pub use types::{AssessmentType, ModuleItemKind, PrerequisitePolicy, SubmissionMode, UnknownVariantError};
