// ==========================================
// 课程模板构建器 - 用于集成测试
// ==========================================

use curriculum_engine::db::SharedConnection;
use curriculum_engine::domain::{
    AssessmentTemplate, AssessmentType, Class, Course, DiscussionPolicy, ModuleItemKind,
    ModuleItemTemplate, ModuleTemplate, SubmissionMode,
};
use curriculum_engine::repository::{ClassRepository, TemplateRepository};

/// 课程 + 班级 + 模板的链式构建器，order_index 按添加顺序递增
pub struct CourseBuilder {
    course_id: String,
    class_ids: Vec<String>,
    assessments: Vec<AssessmentTemplate>,
    modules: Vec<ModuleTemplate>,
    items: Vec<ModuleItemTemplate>,
}

impl CourseBuilder {
    pub fn new(course_id: &str) -> Self {
        Self {
            course_id: course_id.to_string(),
            class_ids: Vec::new(),
            assessments: Vec::new(),
            modules: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn class(mut self, class_id: &str) -> Self {
        self.class_ids.push(class_id.to_string());
        self
    }

    pub fn assessment(mut self, template_id: &str, title: &str, assessment_type: AssessmentType, points: f64) -> Self {
        let order_index = self.assessments.len() as i32;
        self.assessments.push(AssessmentTemplate {
            template_id: template_id.to_string(),
            course_id: self.course_id.clone(),
            title: title.to_string(),
            description: Some(format!("{} description", title)),
            assessment_type,
            default_max_points: points,
            default_submission_mode: SubmissionMode::FileUpload,
            is_active: true,
            order_index,
            discussion_defaults: DiscussionPolicy {
                allow_peer_replies: true,
                minimum_reply_count: 3,
                auto_complete_enabled: true,
                locked_after_due: true,
                require_post_before_viewing: true,
                allow_anonymous: true,
            },
        });
        self
    }

    pub fn discussion(mut self, template_id: &str, title: &str, minimum_reply_count: i32) -> Self {
        self = self.assessment(template_id, title, AssessmentType::Discussion, 10.0);
        if let Some(template) = self.assessments.last_mut() {
            template.default_submission_mode = SubmissionMode::TextEntry;
            template.discussion_defaults.minimum_reply_count = minimum_reply_count;
        }
        self
    }

    pub fn inactive_assessment(mut self, template_id: &str, title: &str) -> Self {
        self = self.assessment(template_id, title, AssessmentType::Exam, 100.0);
        if let Some(template) = self.assessments.last_mut() {
            template.is_active = false;
        }
        self
    }

    pub fn module(mut self, template_id: &str, title: &str, prerequisites: &[&str]) -> Self {
        let order_index = self.modules.len() as i32;
        self.modules.push(ModuleTemplate {
            template_id: template_id.to_string(),
            course_id: self.course_id.clone(),
            title: title.to_string(),
            description: Some(format!("{} overview", title)),
            order_index,
            is_active: true,
            default_unlock_at: None,
            default_prerequisite_ids: prerequisites.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn inactive_module(mut self, template_id: &str, title: &str) -> Self {
        self = self.module(template_id, title, &[]);
        if let Some(template) = self.modules.last_mut() {
            template.is_active = false;
        }
        self
    }

    pub fn page(self, template_id: &str, module_template_id: &str, title: &str) -> Self {
        self.item(template_id, module_template_id, ModuleItemKind::Page, title, None)
    }

    pub fn link(self, template_id: &str, module_template_id: &str, title: &str) -> Self {
        self.item(template_id, module_template_id, ModuleItemKind::ExternalLink, title, None)
    }

    pub fn assessment_item(
        self,
        template_id: &str,
        module_template_id: &str,
        title: &str,
        assessment_template_id: Option<&str>,
    ) -> Self {
        self.item(
            template_id,
            module_template_id,
            ModuleItemKind::Assessment,
            title,
            assessment_template_id,
        )
    }

    /// 为最后添加的条目设置自定义描述
    pub fn with_custom_description(mut self, description: &str) -> Self {
        if let Some(item) = self.items.last_mut() {
            item.custom_description = Some(description.to_string());
        }
        self
    }

    fn item(
        mut self,
        template_id: &str,
        module_template_id: &str,
        item_kind: ModuleItemKind,
        title: &str,
        assessment_template_id: Option<&str>,
    ) -> Self {
        let order_index = self
            .items
            .iter()
            .filter(|i| i.module_template_id == module_template_id)
            .count() as i32;

        self.items.push(ModuleItemTemplate {
            template_id: template_id.to_string(),
            module_template_id: module_template_id.to_string(),
            item_kind,
            title: title.to_string(),
            assessment_template_id: assessment_template_id.map(str::to_string),
            custom_description: None,
            page_content: (item_kind == ModuleItemKind::Page).then(|| format!("# {}", title)),
            external_url: (item_kind == ModuleItemKind::ExternalLink)
                .then(|| "https://example.org/reference".to_string()),
            order_index,
            is_published: true,
            is_required: item_kind == ModuleItemKind::Assessment,
        });
        self
    }

    /// 写入数据库
    pub fn seed(self, conn: &SharedConnection) {
        let class_repo = ClassRepository::new(conn.clone());
        let template_repo = TemplateRepository::new(conn.clone());

        class_repo
            .insert_course(&Course {
                course_id: self.course_id.clone(),
                title: format!("Course {}", self.course_id),
            })
            .expect("写入课程失败");

        for class_id in &self.class_ids {
            class_repo
                .insert_class(&Class {
                    class_id: class_id.clone(),
                    course_id: self.course_id.clone(),
                    name: format!("Class {}", class_id),
                })
                .expect("写入班级失败");
        }

        for template in &self.assessments {
            template_repo
                .insert_assessment_template(template)
                .expect("写入测评模板失败");
        }
        for template in &self.modules {
            template_repo
                .insert_module_template(template)
                .expect("写入模块模板失败");
        }
        for template in &self.items {
            template_repo
                .insert_module_item_template(template)
                .expect("写入条目模板失败");
        }
    }
}
