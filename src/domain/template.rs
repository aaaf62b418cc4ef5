// ==========================================
// 课程模板实例化引擎 - 模板领域模型
// ==========================================
// 模板归属课程，由管理员维护；本引擎只读
// 对齐: migrations/v0.1_curriculum.sql *_template 表
// ==========================================

use crate::domain::types::{AssessmentType, ModuleItemKind, SubmissionMode};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// DiscussionPolicy - 讨论策略
// ==========================================
// 模板上为默认值，实例上仅 DISCUSSION 类型持有
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionPolicy {
    pub allow_peer_replies: bool,
    pub minimum_reply_count: i32,
    pub auto_complete_enabled: bool,
    pub locked_after_due: bool,
    pub require_post_before_viewing: bool,
    pub allow_anonymous: bool,
}

impl Default for DiscussionPolicy {
    fn default() -> Self {
        Self {
            allow_peer_replies: true,
            minimum_reply_count: 0,
            auto_complete_enabled: false,
            locked_after_due: false,
            require_post_before_viewing: false,
            allow_anonymous: false,
        }
    }
}

// ==========================================
// AssessmentTemplate - 测评模板
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentTemplate {
    pub template_id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub assessment_type: AssessmentType,
    pub default_max_points: f64,
    pub default_submission_mode: SubmissionMode,
    pub is_active: bool,
    pub order_index: i32,
    pub discussion_defaults: DiscussionPolicy,
}

// ==========================================
// ModuleTemplate - 模块模板
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleTemplate {
    pub template_id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
    pub default_unlock_at: Option<NaiveDateTime>,
    /// 同课程下其他模块模板的 template_id
    pub default_prerequisite_ids: Vec<String>,
}

// ==========================================
// ModuleItemTemplate - 模块条目模板
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleItemTemplate {
    pub template_id: String,
    pub module_template_id: String,
    pub item_kind: ModuleItemKind,
    pub title: String,
    /// 仅 ASSESSMENT 条目: 指向测评模板（不是实例）
    pub assessment_template_id: Option<String>,
    /// 仅 ASSESSMENT 条目: 覆盖测评默认描述
    pub custom_description: Option<String>,
    pub page_content: Option<String>,
    pub external_url: Option<String>,
    pub order_index: i32,
    pub is_published: bool,
    pub is_required: bool,
}

/// 模块模板及其有序条目模板（预加载）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleTemplateWithItems {
    pub module: ModuleTemplate,
    pub items: Vec<ModuleItemTemplate>,
}
