// ==========================================
// 课程模板实例化引擎 - 实例领域模型
// ==========================================
// 实例归属班级，采纳时由引擎创建，之后由教师 CRUD 独立维护
// 对齐: migrations/v0.1_curriculum.sql assessment / module / module_item 表
// ==========================================

use crate::domain::template::DiscussionPolicy;
use crate::domain::types::{AssessmentType, ModuleItemKind, SubmissionMode};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Assessment - 测评实例
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub assessment_id: String,
    pub class_id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub assessment_type: AssessmentType,
    pub max_points: f64,
    pub submission_mode: SubmissionMode,
    pub is_published: bool,
    pub order_index: i32,
    /// 仅 DISCUSSION 类型有值
    pub discussion: Option<DiscussionPolicy>,

    // ===== 运行期字段（克隆时保持默认，由教师后续设置）=====
    pub due_at: Option<NaiveDateTime>,
    pub max_attempts: Option<i32>,

    pub created_at: NaiveDateTime,
}

// ==========================================
// Module - 模块实例
// ==========================================
// 红线: prerequisite_ids 解析完成后只能包含同班级的 module_id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub module_id: String,
    pub class_id: String,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub is_published: bool,
    pub unlock_at: Option<NaiveDateTime>,
    pub prerequisite_ids: Vec<String>,
    pub created_at: NaiveDateTime,
}

// ==========================================
// ModuleItem - 模块条目实例
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleItem {
    pub module_item_id: String,
    pub module_id: String,
    pub item_kind: ModuleItemKind,
    pub title: String,
    /// 指向同班级的测评实例（不是模板）
    pub assessment_id: Option<String>,
    pub custom_description: Option<String>,
    pub page_content: Option<String>,
    pub external_url: Option<String>,
    pub order_index: i32,
    pub is_published: bool,
    pub is_required: bool,
}

impl ModuleItem {
    /// 展示用描述: 自定义描述优先，否则取所引用测评的描述
    ///
    /// 克隆时不做默认值回填，读取时才计算
    pub fn effective_description<'a>(
        &'a self,
        assessment: Option<&'a Assessment>,
    ) -> Option<&'a str> {
        self.custom_description
            .as_deref()
            .or_else(|| assessment.and_then(|a| a.description.as_deref()))
    }
}
