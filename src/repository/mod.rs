// ==========================================
// 课程模板实例化引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约定: *_tx 关联函数运行在调用方提供的连接/事务上，
//       引擎借此把多张表的写入放进同一个事务
// ==========================================

pub mod assessment_repo;
pub mod class_repo;
pub mod error;
pub mod module_repo;
pub mod provenance_repo;
pub mod sql_types;
pub mod template_repo;

// 重导出核心仓储
pub use assessment_repo::AssessmentRepository;
pub use class_repo::ClassRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use module_repo::ModuleRepository;
pub use provenance_repo::ProvenanceRepository;
pub use template_repo::TemplateRepository;
