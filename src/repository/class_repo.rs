// ==========================================
// 课程模板实例化引擎 - 课程/班级仓储
// ==========================================
// 课程与班级归外部 CRUD 子系统所有
// 本仓储只提供采纳前置校验所需的读取，以及种子数据写入
// ==========================================

use crate::db::SharedConnection;
use crate::domain::class::{Class, Course};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};

// ==========================================
// ClassRepository - 课程/班级仓储
// ==========================================
pub struct ClassRepository {
    conn: SharedConnection,
}

impl ClassRepository {
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

    /// 写入课程
    pub fn insert_course(&self, course: &Course) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO course (course_id, title) VALUES (?1, ?2)",
            params![course.course_id, course.title],
        )?;
        Ok(())
    }

    /// 写入班级
    pub fn insert_class(&self, class: &Class) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO class (class_id, course_id, name) VALUES (?1, ?2, ?3)",
            params![class.class_id, class.course_id, class.name],
        )?;
        Ok(())
    }

    /// 按 ID 查询班级
    pub fn find_by_id(&self, class_id: &str) -> RepositoryResult<Option<Class>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, class_id)
    }

    /// 在调用方连接/事务上按 ID 查询班级
    pub fn find_by_id_tx(conn: &Connection, class_id: &str) -> RepositoryResult<Option<Class>> {
        let class = conn
            .query_row(
                "SELECT class_id, course_id, name FROM class WHERE class_id = ?1",
                params![class_id],
                |row| {
                    Ok(Class {
                        class_id: row.get(0)?,
                        course_id: row.get(1)?,
                        name: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(class)
    }
}
