// ==========================================
// 课程模板实例化引擎 - 引擎层错误类型
// ==========================================
// 约束: 所有错误信息必须包含可定位的模板 ID / 标题
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 引用解析错误 =====
    /// 必需引用缺失: ASSESSMENT 条目指向的测评模板在本班级没有实例
    #[error("测评引用无法解析: assessment_template_id={assessment_template_id}, item_title={item_title}（请先完成测评克隆，或检查课程模板配置）")]
    MissingAssessmentReference {
        assessment_template_id: String,
        item_title: String,
    },

    /// ASSESSMENT 条目模板未填写测评模板
    #[error("ASSESSMENT 条目模板缺少测评模板引用: item_template_id={item_template_id}, item_title={item_title}")]
    AssessmentItemWithoutTemplate {
        item_template_id: String,
        item_title: String,
    },

    /// 可选引用缺失（仅 FAIL 策略下报错）
    #[error("先修模块无法解析: module_template_id={module_template_id}, prerequisite_template_id={prerequisite_template_id}")]
    UnresolvedPrerequisite {
        module_template_id: String,
        prerequisite_template_id: String,
    },

    /// 查找表与目标班级不一致（禁止跨班级链接）
    #[error("查找表作用域不匹配: expected_class_id={expected_class_id}, lookup_class_id={lookup_class_id}")]
    LookupScopeMismatch {
        expected_class_id: String,
        lookup_class_id: String,
    },

    // ===== 前置条件错误 =====
    #[error("班级不存在: class_id={0}")]
    ClassNotFound(String),

    #[error("班级与课程不匹配: class_id={class_id}, expected_course_id={expected_course_id}, actual_course_id={actual_course_id}")]
    ClassCourseMismatch {
        class_id: String,
        expected_course_id: String,
        actual_course_id: String,
    },

    // ===== 基础设施错误 =====
    #[error("配置读取失败: {0}")]
    Config(String),

    #[error("后台任务失败: {0}")]
    Task(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        EngineError::Repository(err.into())
    }
}

impl EngineError {
    /// 是否属于课程模板配置问题（而非基础设施故障）
    pub fn is_curriculum_misconfiguration(&self) -> bool {
        matches!(
            self,
            EngineError::MissingAssessmentReference { .. }
                | EngineError::AssessmentItemWithoutTemplate { .. }
                | EngineError::UnresolvedPrerequisite { .. }
        )
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
