// ==========================================
// 课程模板实例化引擎 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合采纳流程与查询 API 所需的所有 Repository
// 约束: 所有仓储共享同一个连接，采纳事务在该连接上串行执行
// ==========================================

use std::sync::Arc;

use crate::db::SharedConnection;
use crate::repository::{
    AssessmentRepository, ClassRepository, ModuleRepository, ProvenanceRepository,
    TemplateRepository,
};

/// 课程实例化仓储集合
///
/// # 包含的仓储
/// - `class_repo`: 课程/班级
/// - `template_repo`: 模板（只读）
/// - `assessment_repo`: 测评实例
/// - `module_repo`: 模块与条目实例
/// - `provenance_repo`: 溯源映射
#[derive(Clone)]
pub struct CurriculumRepositories {
    conn: SharedConnection,
    pub class_repo: Arc<ClassRepository>,
    pub template_repo: Arc<TemplateRepository>,
    pub assessment_repo: Arc<AssessmentRepository>,
    pub module_repo: Arc<ModuleRepository>,
    pub provenance_repo: Arc<ProvenanceRepository>,
}

impl CurriculumRepositories {
    /// 基于共享连接创建全部仓储
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self {
            class_repo: Arc::new(ClassRepository::new(conn.clone())),
            template_repo: Arc::new(TemplateRepository::new(conn.clone())),
            assessment_repo: Arc::new(AssessmentRepository::new(conn.clone())),
            module_repo: Arc::new(ModuleRepository::new(conn.clone())),
            provenance_repo: Arc::new(ProvenanceRepository::new(conn.clone())),
            conn,
        }
    }

    /// 共享连接（引擎在其上开启采纳事务）
    pub fn connection(&self) -> SharedConnection {
        self.conn.clone()
    }
}
