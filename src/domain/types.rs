// ==========================================
// 课程模板实例化引擎 - 领域类型定义
// ==========================================
// 数据库存储格式: SCREAMING_SNAKE_CASE
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 枚举解析失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知的{kind}取值: {value}")]
pub struct UnknownVariantError {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariantError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ==========================================
// 测评类型 (Assessment Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentType {
    Lesson,     // 课程讲义
    Lab,        // 实验
    Exam,       // 考试
    Quiz,       // 测验
    Discussion, // 讨论
}

impl AssessmentType {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AssessmentType::Lesson => "LESSON",
            AssessmentType::Lab => "LAB",
            AssessmentType::Exam => "EXAM",
            AssessmentType::Quiz => "QUIZ",
            AssessmentType::Discussion => "DISCUSSION",
        }
    }

    /// 讨论策略字段仅对 DISCUSSION 有意义
    pub fn carries_discussion_policy(&self) -> bool {
        matches!(self, AssessmentType::Discussion)
    }
}

impl fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl FromStr for AssessmentType {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LESSON" => Ok(AssessmentType::Lesson),
            "LAB" => Ok(AssessmentType::Lab),
            "EXAM" => Ok(AssessmentType::Exam),
            "QUIZ" => Ok(AssessmentType::Quiz),
            "DISCUSSION" => Ok(AssessmentType::Discussion),
            _ => Err(UnknownVariantError::new("测评类型", s)),
        }
    }
}

// ==========================================
// 提交方式 (Submission Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionMode {
    TextEntry,    // 在线文本
    FileUpload,   // 文件上传
    ExternalUrl,  // 外部链接
    NoSubmission, // 无需提交
}

impl SubmissionMode {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SubmissionMode::TextEntry => "TEXT_ENTRY",
            SubmissionMode::FileUpload => "FILE_UPLOAD",
            SubmissionMode::ExternalUrl => "EXTERNAL_URL",
            SubmissionMode::NoSubmission => "NO_SUBMISSION",
        }
    }
}

impl fmt::Display for SubmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl FromStr for SubmissionMode {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TEXT_ENTRY" => Ok(SubmissionMode::TextEntry),
            "FILE_UPLOAD" => Ok(SubmissionMode::FileUpload),
            "EXTERNAL_URL" => Ok(SubmissionMode::ExternalUrl),
            "NO_SUBMISSION" => Ok(SubmissionMode::NoSubmission),
            _ => Err(UnknownVariantError::new("提交方式", s)),
        }
    }
}

// ==========================================
// 模块条目类型 (Module Item Kind)
// ==========================================
// 仅 ASSESSMENT 需要跨模板引用解析
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleItemKind {
    Page,         // 内联页面
    Assessment,   // 测评引用
    ExternalLink, // 外部链接
}

impl ModuleItemKind {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ModuleItemKind::Page => "PAGE",
            ModuleItemKind::Assessment => "ASSESSMENT",
            ModuleItemKind::ExternalLink => "EXTERNAL_LINK",
        }
    }
}

impl fmt::Display for ModuleItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl FromStr for ModuleItemKind {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PAGE" => Ok(ModuleItemKind::Page),
            "ASSESSMENT" => Ok(ModuleItemKind::Assessment),
            "EXTERNAL_LINK" => Ok(ModuleItemKind::ExternalLink),
            _ => Err(UnknownVariantError::new("模块条目类型", s)),
        }
    }
}

// ==========================================
// 先修模块解析失败策略
// ==========================================
// DROP: 静默丢弃; WARN: 丢弃并告警; FAIL: 中止采纳
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrerequisitePolicy {
    Drop,
    #[default]
    Warn,
    Fail,
}

impl PrerequisitePolicy {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PrerequisitePolicy::Drop => "DROP",
            PrerequisitePolicy::Warn => "WARN",
            PrerequisitePolicy::Fail => "FAIL",
        }
    }
}

impl fmt::Display for PrerequisitePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl FromStr for PrerequisitePolicy {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DROP" => Ok(PrerequisitePolicy::Drop),
            "WARN" => Ok(PrerequisitePolicy::Warn),
            "FAIL" => Ok(PrerequisitePolicy::Fail),
            _ => Err(UnknownVariantError::new("先修解析策略", s)),
        }
    }
}
