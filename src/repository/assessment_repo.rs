// ==========================================
// 课程模板实例化引擎 - 测评实例仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::SharedConnection;
use crate::domain::instance::Assessment;
use crate::domain::template::DiscussionPolicy;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_types::{format_datetime, parse_datetime, parse_enum, parse_optional_datetime};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ASSESSMENT_COLUMNS: &str = r#"
    assessment_id, class_id, title, slug, description, assessment_type,
    max_points, submission_mode, is_published, order_index,
    allow_peer_replies, minimum_reply_count, auto_complete_enabled,
    locked_after_due, require_post_before_viewing, allow_anonymous,
    due_at, max_attempts, created_at
"#;

// ==========================================
// AssessmentRepository - 测评实例仓储
// ==========================================
pub struct AssessmentRepository {
    conn: SharedConnection,
}

impl AssessmentRepository {
    /// 从共享连接创建仓储实例
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在调用方事务中写入测评实例
    pub fn insert_tx(conn: &Connection, assessment: &Assessment) -> RepositoryResult<()> {
        let policy = assessment.discussion.as_ref();
        conn.execute(
            &format!(
                "INSERT INTO assessment ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                ASSESSMENT_COLUMNS
            ),
            params![
                assessment.assessment_id,
                assessment.class_id,
                assessment.title,
                assessment.slug,
                assessment.description,
                assessment.assessment_type.to_db_str(),
                assessment.max_points,
                assessment.submission_mode.to_db_str(),
                assessment.is_published,
                assessment.order_index,
                policy.map(|p| p.allow_peer_replies),
                policy.map(|p| p.minimum_reply_count),
                policy.map(|p| p.auto_complete_enabled),
                policy.map(|p| p.locked_after_due),
                policy.map(|p| p.require_post_before_viewing),
                policy.map(|p| p.allow_anonymous),
                assessment.due_at.as_ref().map(format_datetime),
                assessment.max_attempts,
                format_datetime(&assessment.created_at),
            ],
        )?;
        Ok(())
    }

    /// 按 ID 查询
    pub fn find_by_id(&self, assessment_id: &str) -> RepositoryResult<Option<Assessment>> {
        let conn = self.get_conn()?;
        let assessment = conn
            .query_row(
                &format!("SELECT {} FROM assessment WHERE assessment_id = ?1", ASSESSMENT_COLUMNS),
                params![assessment_id],
                map_assessment,
            )
            .optional()?;
        Ok(assessment)
    }

    /// 查询班级下所有测评，按 order_index 升序
    pub fn find_by_class(&self, class_id: &str) -> RepositoryResult<Vec<Assessment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM assessment WHERE class_id = ?1 ORDER BY order_index ASC, title ASC",
            ASSESSMENT_COLUMNS
        ))?;
        let assessments = stmt
            .query_map(params![class_id], map_assessment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(assessments)
    }

    /// 统计班级下测评数量
    pub fn count_by_class(&self, class_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM assessment WHERE class_id = ?1",
            params![class_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

// ==========================================
// 行映射
// ==========================================

fn map_assessment(row: &Row<'_>) -> rusqlite::Result<Assessment> {
    // 讨论策略列整体为空表示非 DISCUSSION 类型
    let discussion = match row.get::<_, Option<bool>>(10)? {
        Some(allow_peer_replies) => Some(DiscussionPolicy {
            allow_peer_replies,
            minimum_reply_count: row.get::<_, Option<i32>>(11)?.unwrap_or(0),
            auto_complete_enabled: row.get::<_, Option<bool>>(12)?.unwrap_or(false),
            locked_after_due: row.get::<_, Option<bool>>(13)?.unwrap_or(false),
            require_post_before_viewing: row.get::<_, Option<bool>>(14)?.unwrap_or(false),
            allow_anonymous: row.get::<_, Option<bool>>(15)?.unwrap_or(false),
        }),
        None => None,
    };

    Ok(Assessment {
        assessment_id: row.get(0)?,
        class_id: row.get(1)?,
        title: row.get(2)?,
        slug: row.get(3)?,
        description: row.get(4)?,
        assessment_type: parse_enum(5, &row.get::<_, String>(5)?)?,
        max_points: row.get(6)?,
        submission_mode: parse_enum(7, &row.get::<_, String>(7)?)?,
        is_published: row.get(8)?,
        order_index: row.get(9)?,
        discussion,
        due_at: parse_optional_datetime(16, row.get(16)?)?,
        max_attempts: row.get(17)?,
        created_at: parse_datetime(18, &row.get::<_, String>(18)?)?,
    })
}
