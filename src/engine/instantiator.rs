// ==========================================
// 课程模板实例化引擎 - 采纳编排器
// ==========================================
// 职责: 协调测评克隆 → 模块克隆 → 先修回填的执行顺序
// 约束:
// - 每个入口（clone_assessments / clone_modules / adopt_course）
//   运行在单个 IMMEDIATE 事务内，失败时不留下任何部分状态
// - 配置在进入事务前一次性读取
// - 事务在 blocking 线程池执行，不阻塞 async 运行时
// ==========================================

use crate::config::CloneConfigReader;
use crate::db::SharedConnection;
use crate::engine::assessment_cloner::AssessmentCloner;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::lookup::AssessmentLookup;
use crate::engine::module_cloner::ModuleCloner;
use crate::engine::prerequisite::DroppedPrerequisite;
use crate::engine::repositories::CurriculumRepositories;
use crate::engine::settings::CloneSettings;
use crate::repository::{ClassRepository, ProvenanceRepository, RepositoryError};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

// ==========================================
// AdoptionReport - 采纳结果
// ==========================================

#[derive(Debug, Clone, Serialize)]
pub struct AdoptionReport {
    pub class_id: String,
    pub course_id: String,

    // 实例计数
    pub assessments_created: usize,
    pub modules_created: usize,
    pub items_created: usize,

    // 先修回填
    pub prerequisite_edges_resolved: usize,
    pub dropped_prerequisites: Vec<DroppedPrerequisite>,

    // 本次使用的配置快照（JSON）
    pub config_snapshot: String,
    pub elapsed_ms: u64,
}

// ==========================================
// CurriculumInstantiator - 采纳编排器
// ==========================================

pub struct CurriculumInstantiator<C>
where
    C: CloneConfigReader,
{
    conn: SharedConnection,
    config: Arc<C>,
    assessment_cloner: AssessmentCloner,
    module_cloner: ModuleCloner,
}

impl<C> CurriculumInstantiator<C>
where
    C: CloneConfigReader,
{
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - repos: 仓储集合（取其共享连接）
    /// - config: 配置读取器
    pub fn new(repos: &CurriculumRepositories, config: Arc<C>) -> Self {
        Self {
            conn: repos.connection(),
            config,
            assessment_cloner: AssessmentCloner::new(),
            module_cloner: ModuleCloner::new(),
        }
    }

    /// 仅克隆测评，返回创建数量
    pub async fn clone_assessments(&self, class_id: &str, course_id: &str) -> EngineResult<usize> {
        let settings = CloneSettings::load(self.config.as_ref()).await?;
        let cloner = self.assessment_cloner;
        let (class_id, course_id) = (class_id.to_string(), course_id.to_string());

        self.run_in_transaction(move |conn| {
            ensure_class_course(conn, &class_id, &course_id)?;
            let outcome = cloner.clone_course_tx(conn, &class_id, &course_id, &settings)?;
            Ok(outcome.created)
        })
        .await
    }

    /// 仅克隆模块，返回创建的模块数量
    ///
    /// 测评查找表由班级已有的测评溯源重建，
    /// 因此必须在 clone_assessments 提交之后调用
    pub async fn clone_modules(&self, class_id: &str, course_id: &str) -> EngineResult<usize> {
        let settings = CloneSettings::load(self.config.as_ref()).await?;
        let cloner = self.module_cloner;
        let (class_id, course_id) = (class_id.to_string(), course_id.to_string());

        self.run_in_transaction(move |conn| {
            ensure_class_course(conn, &class_id, &course_id)?;
            let mappings = ProvenanceRepository::find_assessment_mappings_by_class_tx(conn, &class_id)?;
            let assessments = AssessmentLookup::from_mappings(&class_id, &mappings);
            let outcome = cloner.clone_course_tx(conn, &class_id, &course_id, &assessments, &settings)?;
            Ok(outcome.modules_created)
        })
        .await
    }

    /// 完整采纳: 测评 → 模块 → 先修，单事务
    pub async fn adopt_course(&self, class_id: &str, course_id: &str) -> EngineResult<AdoptionReport> {
        let started = Instant::now();
        info!(class_id, course_id, "开始课程采纳");

        let settings = CloneSettings::load(self.config.as_ref()).await?;
        let config_snapshot = self
            .config
            .get_config_snapshot()
            .await
            .map_err(|e| EngineError::Config(e.to_string()))?;

        let assessment_cloner = self.assessment_cloner;
        let module_cloner = self.module_cloner;
        let (owned_class_id, owned_course_id) = (class_id.to_string(), course_id.to_string());

        let result = self
            .run_in_transaction(move |conn| {
                ensure_class_course(conn, &owned_class_id, &owned_course_id)?;
                let assessments =
                    assessment_cloner.clone_course_tx(conn, &owned_class_id, &owned_course_id, &settings)?;
                let modules = module_cloner.clone_course_tx(
                    conn,
                    &owned_class_id,
                    &owned_course_id,
                    &assessments.lookup,
                    &settings,
                )?;
                Ok((assessments.created, modules))
            })
            .await;

        let (assessments_created, modules) = match result {
            Ok(value) => value,
            Err(e) => {
                error!(class_id, course_id, error = %e, "课程采纳失败，事务已回滚");
                return Err(e);
            }
        };

        let report = AdoptionReport {
            class_id: class_id.to_string(),
            course_id: course_id.to_string(),
            assessments_created,
            modules_created: modules.modules_created,
            items_created: modules.items_created,
            prerequisite_edges_resolved: modules.prerequisites.resolved_edges,
            dropped_prerequisites: modules.prerequisites.dropped,
            config_snapshot,
            elapsed_ms: duration_ms(started.elapsed()),
        };

        info!(
            class_id,
            course_id,
            assessments = report.assessments_created,
            modules = report.modules_created,
            items = report.items_created,
            prerequisite_edges = report.prerequisite_edges_resolved,
            dropped_prerequisites = report.dropped_prerequisites.len(),
            elapsed_ms = report.elapsed_ms,
            "课程采纳完成"
        );

        Ok(report)
    }

    /// 在 blocking 线程池内执行单个事务；闭包返回错误时事务随 drop 回滚
    async fn run_in_transaction<T, F>(&self, work: F) -> EngineResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> EngineResult<T> + Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> EngineResult<T> {
            let mut guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            let tx = guard
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

            let tx_conn: &Connection = &tx;
            let value = work(tx_conn)?;

            tx.commit()
                .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
            Ok(value)
        })
        .await
        .map_err(|e| EngineError::Task(e.to_string()))?
    }
}

/// 前置检查: 班级存在且属于该课程
fn ensure_class_course(conn: &Connection, class_id: &str, course_id: &str) -> EngineResult<()> {
    let class = ClassRepository::find_by_id_tx(conn, class_id)?
        .ok_or_else(|| EngineError::ClassNotFound(class_id.to_string()))?;

    if class.course_id != course_id {
        return Err(EngineError::ClassCourseMismatch {
            class_id: class_id.to_string(),
            expected_course_id: course_id.to_string(),
            actual_course_id: class.course_id,
        });
    }
    Ok(())
}

/// 耗时毫秒数，超出 u64 时饱和
fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
