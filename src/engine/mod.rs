// ==========================================
// 课程模板实例化引擎 - 引擎层
// ==========================================
// 职责: 把课程模板实例化为班级的测评、模块与条目，并记录溯源
// 红线: Engine 不拼 SQL，数据访问全部经由 Repository 的 *_tx 函数
// ==========================================

pub mod assessment_cloner;
pub mod error;
pub mod instantiator;
pub mod lookup;
pub mod module_cloner;
pub mod prerequisite;
pub mod repositories;
pub mod settings;
pub mod slug;

#[cfg(test)]
pub(crate) mod test_fixtures;

// 重导出核心引擎
pub use assessment_cloner::{AssessmentCloneOutcome, AssessmentCloner};
pub use error::{EngineError, EngineResult};
pub use instantiator::{AdoptionReport, CurriculumInstantiator};
pub use lookup::{AssessmentLookup, ModuleLookup};
pub use module_cloner::{ModuleCloneOutcome, ModuleCloner};
pub use prerequisite::{DroppedPrerequisite, PrerequisiteReport, PrerequisiteResolver};
pub use repositories::CurriculumRepositories;
pub use settings::CloneSettings;
pub use slug::slugify;
