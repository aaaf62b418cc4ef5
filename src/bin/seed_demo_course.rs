use std::error::Error;

use curriculum_engine::app::get_default_db_path;
use curriculum_engine::db::{init_schema, open_shared_connection};
use curriculum_engine::domain::{
    AssessmentTemplate, AssessmentType, Class, Course, DiscussionPolicy, ModuleItemKind,
    ModuleItemTemplate, ModuleTemplate, SubmissionMode,
};
use curriculum_engine::logging;
use curriculum_engine::repository::{ClassRepository, TemplateRepository};

const COURSE_ID: &str = "DEMO-CS101";
const CLASS_ID: &str = "DEMO-CS101-FALL";

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    let conn = open_shared_connection(&db_path)?;
    {
        let guard = conn.lock().map_err(|e| e.to_string())?;
        init_schema(&guard)?;
    }

    let class_repo = ClassRepository::new(conn.clone());
    let template_repo = TemplateRepository::new(conn.clone());

    class_repo.insert_course(&Course {
        course_id: COURSE_ID.to_string(),
        title: "Introduction to Programming".to_string(),
    })?;
    class_repo.insert_class(&Class {
        class_id: CLASS_ID.to_string(),
        course_id: COURSE_ID.to_string(),
        name: "Fall Section".to_string(),
    })?;

    for template in assessment_templates() {
        template_repo.insert_assessment_template(&template)?;
    }
    for module in module_templates() {
        template_repo.insert_module_template(&module)?;
    }
    for item in item_templates() {
        template_repo.insert_module_item_template(&item)?;
    }

    eprintln!("Seeded {} into {}", COURSE_ID, db_path);
    eprintln!("Next: curriculum-engine adopt {} {}", CLASS_ID, COURSE_ID);
    Ok(())
}

fn assessment_templates() -> Vec<AssessmentTemplate> {
    let base = |template_id: &str, title: &str, assessment_type, points, mode, order_index| AssessmentTemplate {
        template_id: template_id.to_string(),
        course_id: COURSE_ID.to_string(),
        title: title.to_string(),
        description: Some(format!("{} for the demo course", title)),
        assessment_type,
        default_max_points: points,
        default_submission_mode: mode,
        is_active: true,
        order_index,
        discussion_defaults: DiscussionPolicy::default(),
    };

    let mut forum = base(
        "AT-FORUM-1",
        "Week 1 Introductions",
        AssessmentType::Discussion,
        10.0,
        SubmissionMode::TextEntry,
        1,
    );
    forum.discussion_defaults.minimum_reply_count = 2;
    forum.discussion_defaults.require_post_before_viewing = true;

    vec![
        base(
            "AT-LAB-1",
            "Lab 1: Hello, World!",
            AssessmentType::Lab,
            50.0,
            SubmissionMode::FileUpload,
            0,
        ),
        forum,
        base(
            "AT-QUIZ-1",
            "Quiz 1: Variables",
            AssessmentType::Quiz,
            20.0,
            SubmissionMode::NoSubmission,
            2,
        ),
    ]
}

fn module_templates() -> Vec<ModuleTemplate> {
    let module = |template_id: &str, title: &str, order_index, prerequisites: &[&str]| ModuleTemplate {
        template_id: template_id.to_string(),
        course_id: COURSE_ID.to_string(),
        title: title.to_string(),
        description: None,
        order_index,
        is_active: true,
        default_unlock_at: None,
        default_prerequisite_ids: prerequisites.iter().map(|s| s.to_string()).collect(),
    };

    vec![
        module("MT-WEEK-1", "Week 1: Getting Started", 0, &[]),
        module("MT-WEEK-2", "Week 2: Variables", 1, &["MT-WEEK-1"]),
    ]
}

fn item_templates() -> Vec<ModuleItemTemplate> {
    let item = |template_id: &str,
                module_template_id: &str,
                item_kind,
                title: &str,
                assessment_template_id: Option<&str>,
                order_index| ModuleItemTemplate {
        template_id: template_id.to_string(),
        module_template_id: module_template_id.to_string(),
        item_kind,
        title: title.to_string(),
        assessment_template_id: assessment_template_id.map(str::to_string),
        custom_description: None,
        page_content: None,
        external_url: None,
        order_index,
        is_published: true,
        is_required: assessment_template_id.is_some(),
    };

    let mut welcome = item("IT-W1-WELCOME", "MT-WEEK-1", ModuleItemKind::Page, "Welcome", None, 0);
    welcome.page_content = Some("# Welcome to CS101".to_string());

    let mut docs = item(
        "IT-W2-DOCS",
        "MT-WEEK-2",
        ModuleItemKind::ExternalLink,
        "Language Reference",
        None,
        1,
    );
    docs.external_url = Some("https://doc.rust-lang.org/book/".to_string());

    let mut lab = item(
        "IT-W1-LAB",
        "MT-WEEK-1",
        ModuleItemKind::Assessment,
        "Lab 1",
        Some("AT-LAB-1"),
        1,
    );
    lab.custom_description = Some("Submit your first program".to_string());

    vec![
        welcome,
        lab,
        item(
            "IT-W1-FORUM",
            "MT-WEEK-1",
            ModuleItemKind::Assessment,
            "Introduce yourself",
            Some("AT-FORUM-1"),
            2,
        ),
        item(
            "IT-W2-QUIZ",
            "MT-WEEK-2",
            ModuleItemKind::Assessment,
            "Quiz 1",
            Some("AT-QUIZ-1"),
            0,
        ),
        docs,
    ]
}
