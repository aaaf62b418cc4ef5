// ==========================================
// 课程模板实例化引擎 - 课程与班级
// ==========================================
// 由外部 CRUD 子系统维护，本引擎只读
// ==========================================

use serde::{Deserialize, Serialize};

/// 课程
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String,
    pub title: String,
}

/// 班级（教师采纳课程后创建）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub class_id: String,
    pub course_id: String,
    pub name: String,
}
