// ==========================================
// 课程采纳集成测试
// ==========================================
// 测试范围:
// 1. 测评克隆: 数量、溯源、讨论策略、slug
// 2. 模块克隆: 条目解析、引用缺失、先修回填
// 3. 原子性: 任何失败均不留下部分状态
// 4. 前置检查与配置策略
// ==========================================

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;

use curriculum_engine::app::AppState;
use curriculum_engine::config::config_keys;
use curriculum_engine::domain::{AssessmentType, ModuleItemKind, PrerequisitePolicy};
use curriculum_engine::engine::{CurriculumInstantiator, EngineError};
use futures::future::join_all;
use helpers::course_builder::CourseBuilder;
use helpers::mock_config::MockConfig;
use test_helpers::*;

const COURSE: &str = "CS101";
const CLASS: &str = "CS101-A";

fn instantiator(db: &TestDb, config: MockConfig) -> CurriculumInstantiator<MockConfig> {
    CurriculumInstantiator::new(&db.repos, Arc::new(config))
}

// ==========================================
// 端到端场景
// ==========================================

#[tokio::test]
async fn test_intro_lab_scenario() {
    curriculum_engine::logging::init_test();
    let db = create_test_db().expect("无法创建测试数据库");

    CourseBuilder::new(COURSE)
        .class(CLASS)
        .assessment("AT-LAB", "Intro Lab", AssessmentType::Lab, 50.0)
        .module("MT-1", "Week 1", &[])
        .page("IT-PAGE", "MT-1", "Welcome")
        .assessment_item("IT-LAB", "MT-1", "Intro Lab", Some("AT-LAB"))
        .seed(&db.conn);

    let report = instantiator(&db, MockConfig::default())
        .adopt_course(CLASS, COURSE)
        .await
        .expect("采纳失败");

    assert_eq!(report.assessments_created, 1);
    assert_eq!(report.modules_created, 1);
    assert_eq!(report.items_created, 2);
    assert!(report.dropped_prerequisites.is_empty());

    let assessments = db.repos.assessment_repo.find_by_class(CLASS).unwrap();
    assert_eq!(assessments.len(), 1);
    let lab = &assessments[0];
    assert_eq!(lab.title, "Intro Lab");
    assert_eq!(lab.slug, "intro-lab");
    assert_eq!(lab.max_points, 50.0);
    assert!(lab.is_published);
    assert!(lab.discussion.is_none());

    let modules = db.repos.module_repo.find_by_class(CLASS).unwrap();
    assert_eq!(modules.len(), 1);
    assert!(modules[0].prerequisite_ids.is_empty());

    let items = db.repos.module_repo.find_items_by_module(&modules[0].module_id).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].item_kind, ModuleItemKind::Page);
    assert_eq!(items[0].assessment_id, None);
    assert_eq!(items[1].item_kind, ModuleItemKind::Assessment);
    assert_eq!(items[1].assessment_id.as_deref(), Some(lab.assessment_id.as_str()));
}

// ==========================================
// 测评克隆
// ==========================================

#[tokio::test]
async fn test_k_active_templates_produce_k_assessments_and_mappings() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .assessment("AT-1", "Lab 1: Hello, World!", AssessmentType::Lab, 20.0)
        .assessment("AT-2", "Quiz 1", AssessmentType::Quiz, 10.0)
        .assessment("AT-3", "Midterm", AssessmentType::Exam, 100.0)
        .inactive_assessment("AT-OLD", "Retired Project")
        .seed(&db.conn);

    let created = instantiator(&db, MockConfig::default())
        .clone_assessments(CLASS, COURSE)
        .await
        .unwrap();
    assert_eq!(created, 3);

    let mappings = db.repos.provenance_repo.find_assessment_mappings_by_class(CLASS).unwrap();
    assert_eq!(mappings.len(), 3);
    let template_ids: HashSet<&str> = mappings.iter().map(|m| m.assessment_template_id.as_str()).collect();
    assert_eq!(template_ids, HashSet::from(["AT-1", "AT-2", "AT-3"]));

    let assessments = db.repos.assessment_repo.find_by_class(CLASS).unwrap();
    let titles: Vec<&str> = assessments.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Lab 1: Hello, World!", "Quiz 1", "Midterm"]);
    assert_eq!(assessments[0].slug, "lab-1-hello-world");
}

#[tokio::test]
async fn test_zero_templates_returns_zero_without_rows() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE).class(CLASS).seed(&db.conn);

    let engine = instantiator(&db, MockConfig::default());
    assert_eq!(engine.clone_assessments(CLASS, COURSE).await.unwrap(), 0);
    assert_eq!(engine.clone_modules(CLASS, COURSE).await.unwrap(), 0);
    assert_eq!(count_instance_rows(&db.conn), 0);
}

#[tokio::test]
async fn test_discussion_policy_copied_only_for_discussions() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .discussion("AT-D", "Week 1 Forum", 2)
        .assessment("AT-L", "Lab 1", AssessmentType::Lab, 50.0)
        .seed(&db.conn);

    instantiator(&db, MockConfig::default())
        .clone_assessments(CLASS, COURSE)
        .await
        .unwrap();

    let assessments = db.repos.assessment_repo.find_by_class(CLASS).unwrap();
    let forum = assessments.iter().find(|a| a.title == "Week 1 Forum").unwrap();
    let lab = assessments.iter().find(|a| a.title == "Lab 1").unwrap();

    let policy = forum.discussion.as_ref().expect("讨论应携带讨论策略");
    assert_eq!(policy.minimum_reply_count, 2);
    assert!(policy.allow_peer_replies);
    assert!(lab.discussion.is_none());
}

#[tokio::test]
async fn test_publish_settings_applied() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .assessment("AT-1", "Lab 1", AssessmentType::Lab, 50.0)
        .module("MT-1", "Week 1", &[])
        .seed(&db.conn);

    instantiator(&db, MockConfig::unpublished())
        .adopt_course(CLASS, COURSE)
        .await
        .unwrap();

    assert!(!db.repos.assessment_repo.find_by_class(CLASS).unwrap()[0].is_published);
    assert!(!db.repos.module_repo.find_by_class(CLASS).unwrap()[0].is_published);
}

// ==========================================
// 模块克隆与引用解析
// ==========================================

#[tokio::test]
async fn test_separate_entry_points_resolve_items_through_provenance() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .assessment("AT-LAB", "Lab 1", AssessmentType::Lab, 50.0)
        .discussion("AT-FORUM", "Forum", 1)
        .module("MT-1", "Week 1", &[])
        .assessment_item("IT-1", "MT-1", "Lab", Some("AT-LAB"))
        .link("IT-2", "MT-1", "Docs")
        .assessment_item("IT-3", "MT-1", "Forum", Some("AT-FORUM"))
        .seed(&db.conn);

    let engine = instantiator(&db, MockConfig::default());
    engine.clone_assessments(CLASS, COURSE).await.unwrap();
    assert_eq!(engine.clone_modules(CLASS, COURSE).await.unwrap(), 1);

    let module = &db.repos.module_repo.find_by_class(CLASS).unwrap()[0];
    let items = db.repos.module_repo.find_items_by_module(&module.module_id).unwrap();
    assert_eq!(items.len(), 3);

    for item in items.iter().filter(|i| i.item_kind == ModuleItemKind::Assessment) {
        let assessment_id = item.assessment_id.as_deref().expect("ASSESSMENT 条目必须指向测评");

        let item_mapping = db
            .repos
            .provenance_repo
            .find_module_item_mapping(&item.module_item_id)
            .unwrap()
            .unwrap();
        let item_template = db
            .repos
            .template_repo
            .find_module_item_template(&item_mapping.module_item_template_id)
            .unwrap()
            .unwrap();
        let assessment_mapping = db
            .repos
            .provenance_repo
            .find_assessment_mapping(assessment_id)
            .unwrap()
            .unwrap();

        assert_eq!(
            Some(assessment_mapping.assessment_template_id),
            item_template.assessment_template_id
        );
        assert_eq!(assessment_mapping.class_id, CLASS);
    }

    let link = items.iter().find(|i| i.item_kind == ModuleItemKind::ExternalLink).unwrap();
    assert_eq!(link.external_url.as_deref(), Some("https://example.org/reference"));
    assert!(link.assessment_id.is_none());
}

#[tokio::test]
async fn test_missing_assessment_reference_rolls_back_everything() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .assessment("AT-LAB", "Lab 1", AssessmentType::Lab, 50.0)
        .inactive_assessment("AT-RETIRED", "Retired Exam")
        .module("MT-1", "Week 1", &[])
        .page("IT-1", "MT-1", "Welcome")
        .module("MT-2", "Week 2", &[])
        .assessment_item("IT-2", "MT-2", "Old Exam", Some("AT-RETIRED"))
        .seed(&db.conn);

    let err = instantiator(&db, MockConfig::default())
        .adopt_course(CLASS, COURSE)
        .await
        .unwrap_err();

    match err {
        EngineError::MissingAssessmentReference {
            assessment_template_id,
            item_title,
        } => {
            assert_eq!(assessment_template_id, "AT-RETIRED");
            assert_eq!(item_title, "Old Exam");
        }
        other => panic!("Expected MissingAssessmentReference, got {other:?}"),
    }

    assert_eq!(count_instance_rows(&db.conn), 0, "失败的采纳不应留下任何实例或映射");
}

#[tokio::test]
async fn test_clone_modules_before_assessments_fails() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .assessment("AT-LAB", "Lab 1", AssessmentType::Lab, 50.0)
        .module("MT-1", "Week 1", &[])
        .assessment_item("IT-1", "MT-1", "Lab", Some("AT-LAB"))
        .seed(&db.conn);

    let err = instantiator(&db, MockConfig::default())
        .clone_modules(CLASS, COURSE)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::MissingAssessmentReference { .. }));
    assert_eq!(count_rows(&db.conn, "module"), 0);
    assert_eq!(count_rows(&db.conn, "module_template_mapping"), 0);
}

#[tokio::test]
async fn test_assessment_item_without_template_is_fatal() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .module("MT-1", "Week 1", &[])
        .assessment_item("IT-BROKEN", "MT-1", "Broken", None)
        .seed(&db.conn);

    let err = instantiator(&db, MockConfig::default())
        .adopt_course(CLASS, COURSE)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::AssessmentItemWithoutTemplate { .. }));
    assert_eq!(count_instance_rows(&db.conn), 0);
}

// ==========================================
// 先修回填
// ==========================================

#[tokio::test]
async fn test_prerequisites_resolve_in_template_order() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .module("MT-A", "Week 1", &[])
        .module("MT-B", "Week 2", &[])
        .module("MT-C", "Week 3", &["MT-A", "MT-B"])
        .module("MT-D", "Week 4", &["MT-B", "MT-A"])
        .seed(&db.conn);

    let report = instantiator(&db, MockConfig::default())
        .adopt_course(CLASS, COURSE)
        .await
        .unwrap();
    assert_eq!(report.prerequisite_edges_resolved, 4);

    let modules = db.repos.module_repo.find_by_class(CLASS).unwrap();
    let id_of = |title: &str| {
        modules
            .iter()
            .find(|m| m.title == title)
            .map(|m| m.module_id.clone())
            .unwrap()
    };

    let week3 = modules.iter().find(|m| m.title == "Week 3").unwrap();
    let week4 = modules.iter().find(|m| m.title == "Week 4").unwrap();
    assert_eq!(week3.prerequisite_ids, vec![id_of("Week 1"), id_of("Week 2")]);
    assert_eq!(week4.prerequisite_ids, vec![id_of("Week 2"), id_of("Week 1")]);
}

#[tokio::test]
async fn test_unresolved_prerequisite_dropped_under_warn() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .module("MT-A", "Week 1", &[])
        .module("MT-B", "Week 2", &["MT-A", "MT-GHOST"])
        .seed(&db.conn);

    let report = instantiator(&db, MockConfig::with_policy(PrerequisitePolicy::Warn))
        .adopt_course(CLASS, COURSE)
        .await
        .unwrap();

    assert_eq!(report.prerequisite_edges_resolved, 1);
    assert_eq!(report.dropped_prerequisites.len(), 1);
    assert_eq!(report.dropped_prerequisites[0].module_template_id, "MT-B");
    assert_eq!(report.dropped_prerequisites[0].prerequisite_template_id, "MT-GHOST");

    let modules = db.repos.module_repo.find_by_class(CLASS).unwrap();
    assert_eq!(modules[1].prerequisite_ids, vec![modules[0].module_id.clone()]);
}

#[tokio::test]
async fn test_inactive_module_template_is_skipped_and_its_prerequisite_dropped() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .inactive_module("MT-OFF", "Retired Week")
        .page("IT-OFF", "MT-OFF", "Old Notes")
        .module("MT-A", "Week A", &["MT-OFF", "MT-B"])
        .page("IT-A", "MT-A", "Notes A")
        .module("MT-B", "Week B", &[])
        .seed(&db.conn);

    let report = instantiator(&db, MockConfig::default())
        .adopt_course(CLASS, COURSE)
        .await
        .unwrap();

    assert_eq!(report.modules_created, 2);
    assert_eq!(report.items_created, 1);
    assert_eq!(report.prerequisite_edges_resolved, 1);
    assert_eq!(report.dropped_prerequisites.len(), 1);
    assert_eq!(report.dropped_prerequisites[0].module_template_id, "MT-A");
    assert_eq!(report.dropped_prerequisites[0].prerequisite_template_id, "MT-OFF");

    let modules = db.repos.module_repo.find_by_class(CLASS).unwrap();
    assert!(modules.iter().all(|m| m.title != "Retired Week"));
    let week_a = modules.iter().find(|m| m.title == "Week A").unwrap();
    let week_b = modules.iter().find(|m| m.title == "Week B").unwrap();
    assert_eq!(week_a.prerequisite_ids, vec![week_b.module_id.clone()]);
    assert_eq!(count_rows(&db.conn, "module_item"), 1);

    // 再次克隆模块: 新一组实例的先修指向新的 Week B
    let first_ids: HashSet<String> = modules.iter().map(|m| m.module_id.clone()).collect();
    let created = instantiator(&db, MockConfig::default())
        .clone_modules(CLASS, COURSE)
        .await
        .unwrap();
    assert_eq!(created, 2);

    let modules = db.repos.module_repo.find_by_class(CLASS).unwrap();
    assert_eq!(modules.len(), 4);
    let fresh = |title: &str| {
        modules
            .iter()
            .find(|m| m.title == title && !first_ids.contains(&m.module_id))
            .unwrap()
    };
    assert_eq!(fresh("Week A").prerequisite_ids, vec![fresh("Week B").module_id.clone()]);
}

#[tokio::test]
async fn test_unresolved_prerequisite_fails_under_fail_policy() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .assessment("AT-1", "Lab 1", AssessmentType::Lab, 50.0)
        .module("MT-A", "Week 1", &["MT-GHOST"])
        .seed(&db.conn);

    let err = instantiator(&db, MockConfig::with_policy(PrerequisitePolicy::Fail))
        .adopt_course(CLASS, COURSE)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::UnresolvedPrerequisite { .. }));
    assert_eq!(count_instance_rows(&db.conn), 0);
}

#[tokio::test]
async fn test_policy_read_from_config_table() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .module("MT-A", "Week 1", &["MT-GHOST"])
        .seed(&db.conn);

    let state = AppState::from_connection(db.conn.clone()).unwrap();
    state
        .config_manager
        .set_global_config_value(config_keys::PREREQUISITE_POLICY, "FAIL")
        .unwrap();

    let result = state.adoption_api.adopt_course(CLASS, COURSE).await;
    assert!(result.is_err());
    assert_eq!(count_rows(&db.conn, "module"), 0);

    state
        .config_manager
        .set_global_config_value(config_keys::PREREQUISITE_POLICY, "DROP")
        .unwrap();
    let report = state.adoption_api.adopt_course(CLASS, COURSE).await.unwrap();
    assert_eq!(report.dropped_prerequisites.len(), 1);
    assert!(report.config_snapshot.contains("DROP"));
}

// ==========================================
// 前置检查
// ==========================================

#[tokio::test]
async fn test_class_must_exist_and_belong_to_course() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .assessment("AT-1", "Lab 1", AssessmentType::Lab, 50.0)
        .seed(&db.conn);
    CourseBuilder::new("MATH200").class("MATH200-A").seed(&db.conn);

    let engine = instantiator(&db, MockConfig::default());

    let err = engine.adopt_course("NO-SUCH-CLASS", COURSE).await.unwrap_err();
    assert!(matches!(err, EngineError::ClassNotFound(_)));

    let err = engine.adopt_course("MATH200-A", COURSE).await.unwrap_err();
    match err {
        EngineError::ClassCourseMismatch {
            actual_course_id, ..
        } => assert_eq!(actual_course_id, "MATH200"),
        other => panic!("Expected ClassCourseMismatch, got {other:?}"),
    }

    assert_eq!(count_instance_rows(&db.conn), 0);
}

// ==========================================
// 多班级
// ==========================================

#[tokio::test]
async fn test_concurrent_adoption_keeps_classes_isolated() {
    let db = create_test_db().unwrap();
    CourseBuilder::new(COURSE)
        .class("CS101-A")
        .class("CS101-B")
        .assessment("AT-LAB", "Lab 1", AssessmentType::Lab, 50.0)
        .module("MT-1", "Week 1", &[])
        .assessment_item("IT-1", "MT-1", "Lab", Some("AT-LAB"))
        .seed(&db.conn);

    let engine = instantiator(&db, MockConfig::default());
    let results = join_all(["CS101-A", "CS101-B"].map(|class_id| engine.adopt_course(class_id, COURSE))).await;
    assert!(results.iter().all(|r| r.is_ok()));

    for class_id in ["CS101-A", "CS101-B"] {
        let assessments = db.repos.assessment_repo.find_by_class(class_id).unwrap();
        assert_eq!(assessments.len(), 1);

        let module = &db.repos.module_repo.find_by_class(class_id).unwrap()[0];
        let items = db.repos.module_repo.find_items_by_module(&module.module_id).unwrap();
        assert_eq!(
            items[0].assessment_id.as_deref(),
            Some(assessments[0].assessment_id.as_str()),
            "条目只能指向本班级的测评"
        );
    }
}
