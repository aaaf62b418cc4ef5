// ==========================================
// ProvenanceApi 集成测试
// ==========================================
// 测试范围:
// 1. 点查询: get_*_template / is_*_from_template
// 2. 无映射的实例: 返回 None / false 而不是错误
// 3. 批量查询: templated_assessment_ids
// ==========================================

mod helpers;

use chrono::Local;
use curriculum_engine::api::ApiError;
use curriculum_engine::app::AppState;
use curriculum_engine::domain::{Assessment, AssessmentType, SubmissionMode};
use curriculum_engine::repository::AssessmentRepository;
use helpers::course_builder::CourseBuilder;
use test_helpers::*;

const COURSE: &str = "BIO110";
const CLASS: &str = "BIO110-MORNING";

async fn adopted_state() -> (TestDb, AppState) {
    let db = create_test_db().expect("无法创建测试数据库");
    CourseBuilder::new(COURSE)
        .class(CLASS)
        .assessment("AT-LAB", "Microscopy Lab", AssessmentType::Lab, 40.0)
        .discussion("AT-FORUM", "Cell Theory Forum", 2)
        .module("MT-1", "Unit 1: Cells", &[])
        .page("IT-1", "MT-1", "Reading")
        .assessment_item("IT-2", "MT-1", "Microscopy Lab", Some("AT-LAB"))
        .seed(&db.conn);

    let state = AppState::from_connection(db.conn.clone()).expect("无法创建AppState");
    state
        .adoption_api
        .adopt_course(CLASS, COURSE)
        .await
        .expect("采纳失败");
    (db, state)
}

/// 手工创建的测评（无溯源）
fn insert_hand_made_assessment(db: &TestDb) -> String {
    let assessment = Assessment {
        assessment_id: "hand-made-quiz".to_string(),
        class_id: CLASS.to_string(),
        title: "Pop Quiz".to_string(),
        slug: "pop-quiz".to_string(),
        description: None,
        assessment_type: AssessmentType::Quiz,
        max_points: 5.0,
        submission_mode: SubmissionMode::NoSubmission,
        is_published: false,
        order_index: 99,
        discussion: None,
        due_at: None,
        max_attempts: Some(1),
        created_at: Local::now().naive_local(),
    };
    let guard = db.conn.lock().unwrap();
    AssessmentRepository::insert_tx(&guard, &assessment).unwrap();
    assessment.assessment_id
}

#[tokio::test]
async fn test_assessment_provenance_lookup() {
    let (db, state) = adopted_state().await;
    let api = &state.provenance_api;

    for assessment in db.repos.assessment_repo.find_by_class(CLASS).unwrap() {
        assert!(api.is_assessment_from_template(&assessment.assessment_id).unwrap());
        let template = api
            .get_assessment_template(&assessment.assessment_id)
            .unwrap()
            .expect("应返回来源模板");
        assert_eq!(template.title, assessment.title);
        assert_eq!(template.course_id, COURSE);
    }
}

#[tokio::test]
async fn test_module_and_item_provenance_lookup() {
    let (db, state) = adopted_state().await;
    let api = &state.provenance_api;

    let module = &db.repos.module_repo.find_by_class(CLASS).unwrap()[0];
    assert!(api.is_module_from_template(&module.module_id).unwrap());
    assert_eq!(
        api.get_module_template(&module.module_id).unwrap().unwrap().template_id,
        "MT-1"
    );

    let items = db.repos.module_repo.find_items_by_module(&module.module_id).unwrap();
    let item_template_ids: Vec<String> = items
        .iter()
        .map(|item| {
            assert!(api.is_module_item_from_template(&item.module_item_id).unwrap());
            api.get_module_item_template(&item.module_item_id)
                .unwrap()
                .unwrap()
                .template_id
        })
        .collect();
    assert_eq!(item_template_ids, vec!["IT-1".to_string(), "IT-2".to_string()]);
}

#[tokio::test]
async fn test_instances_without_mapping_are_not_templated() {
    let (db, state) = adopted_state().await;
    let api = &state.provenance_api;
    let hand_made = insert_hand_made_assessment(&db);

    assert!(!api.is_assessment_from_template(&hand_made).unwrap());
    assert!(api.get_assessment_template(&hand_made).unwrap().is_none());

    assert!(!api.is_module_from_template("unknown-module").unwrap());
    assert!(api.get_module_template("unknown-module").unwrap().is_none());
    assert!(!api.is_module_item_from_template("unknown-item").unwrap());
    assert!(api.get_module_item_template("unknown-item").unwrap().is_none());
}

#[tokio::test]
async fn test_templated_assessment_ids_excludes_hand_made() {
    let (db, state) = adopted_state().await;
    let hand_made = insert_hand_made_assessment(&db);

    let templated = state.provenance_api.templated_assessment_ids(CLASS).unwrap();
    assert_eq!(templated.len(), 2);
    assert!(!templated.contains(&hand_made));

    assert!(state
        .provenance_api
        .templated_assessment_ids("OTHER-CLASS")
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_blank_ids_are_rejected() {
    let (_db, state) = adopted_state().await;
    let err = state.provenance_api.is_assessment_from_template("  ").unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
