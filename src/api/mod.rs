// ==========================================
// 课程模板实例化引擎 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行与上层服务调用
// ==========================================

pub mod adoption_api;
pub mod error;
pub mod module_api;
pub mod provenance_api;

// 重导出核心类型
pub use adoption_api::AdoptionApi;
pub use error::{ApiError, ApiResult};
pub use module_api::{ModuleApi, ModuleItemView, ModuleView};
pub use provenance_api::ProvenanceApi;
