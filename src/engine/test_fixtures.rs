// 引擎单元测试共用的建库与模板构造函数

use crate::db::{configure_sqlite_connection, init_schema, SharedConnection};
use crate::domain::class::{Class, Course};
use crate::domain::template::{
    AssessmentTemplate, DiscussionPolicy, ModuleItemTemplate, ModuleTemplate,
};
use crate::domain::types::{AssessmentType, ModuleItemKind, SubmissionMode};
use crate::repository::{ClassRepository, TemplateRepository};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub const COURSE_ID: &str = "COURSE-CS101";
pub const CLASS_ID: &str = "CLASS-CS101-A";

/// 内存库 + schema + 一门课程和一个班级
pub fn setup_db() -> SharedConnection {
    let conn = Connection::open_in_memory().unwrap();
    configure_sqlite_connection(&conn).unwrap();
    init_schema(&conn).unwrap();
    let shared = Arc::new(Mutex::new(conn));

    let class_repo = ClassRepository::new(shared.clone());
    class_repo
        .insert_course(&Course {
            course_id: COURSE_ID.to_string(),
            title: "Intro to Programming".to_string(),
        })
        .unwrap();
    class_repo
        .insert_class(&Class {
            class_id: CLASS_ID.to_string(),
            course_id: COURSE_ID.to_string(),
            name: "Section A".to_string(),
        })
        .unwrap();

    shared
}

pub fn assessment_template(
    template_id: &str,
    title: &str,
    assessment_type: AssessmentType,
    order_index: i32,
) -> AssessmentTemplate {
    AssessmentTemplate {
        template_id: template_id.to_string(),
        course_id: COURSE_ID.to_string(),
        title: title.to_string(),
        description: Some(format!("{} description", title)),
        assessment_type,
        default_max_points: 100.0,
        default_submission_mode: SubmissionMode::TextEntry,
        is_active: true,
        order_index,
        discussion_defaults: DiscussionPolicy {
            allow_peer_replies: true,
            minimum_reply_count: 2,
            auto_complete_enabled: true,
            locked_after_due: false,
            require_post_before_viewing: true,
            allow_anonymous: false,
        },
    }
}

pub fn module_template(template_id: &str, title: &str, order_index: i32, prerequisites: &[&str]) -> ModuleTemplate {
    ModuleTemplate {
        template_id: template_id.to_string(),
        course_id: COURSE_ID.to_string(),
        title: title.to_string(),
        description: None,
        order_index,
        is_active: true,
        default_unlock_at: None,
        default_prerequisite_ids: prerequisites.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn page_item(template_id: &str, module_template_id: &str, order_index: i32) -> ModuleItemTemplate {
    ModuleItemTemplate {
        template_id: template_id.to_string(),
        module_template_id: module_template_id.to_string(),
        item_kind: ModuleItemKind::Page,
        title: format!("Page {}", template_id),
        assessment_template_id: None,
        custom_description: None,
        page_content: Some("# Welcome".to_string()),
        external_url: None,
        order_index,
        is_published: true,
        is_required: false,
    }
}

pub fn assessment_item(
    template_id: &str,
    module_template_id: &str,
    assessment_template_id: Option<&str>,
    order_index: i32,
) -> ModuleItemTemplate {
    ModuleItemTemplate {
        template_id: template_id.to_string(),
        module_template_id: module_template_id.to_string(),
        item_kind: ModuleItemKind::Assessment,
        title: format!("Item {}", template_id),
        assessment_template_id: assessment_template_id.map(str::to_string),
        custom_description: None,
        page_content: None,
        external_url: None,
        order_index,
        is_published: true,
        is_required: true,
    }
}

pub fn template_repo(conn: &SharedConnection) -> TemplateRepository {
    TemplateRepository::new(conn.clone())
}
