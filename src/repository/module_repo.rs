// ==========================================
// 课程模板实例化引擎 - 模块/模块条目实例仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::SharedConnection;
use crate::domain::instance::{Module, ModuleItem};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_types::{
    encode_id_list, format_datetime, parse_datetime, parse_enum, parse_id_list,
    parse_optional_datetime,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const MODULE_COLUMNS: &str = r#"
    module_id, class_id, title, description, order_index, is_published,
    unlock_at, prerequisite_ids, created_at
"#;

const MODULE_ITEM_COLUMNS: &str = r#"
    module_item_id, module_id, item_kind, title, assessment_id,
    custom_description, page_content, external_url, order_index, is_published, is_required
"#;

// ==========================================
// ModuleRepository - 模块实例仓储
// ==========================================
pub struct ModuleRepository {
    conn: SharedConnection,
}

impl ModuleRepository {
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

    // ==========================================
    // 事务内写入
    // ==========================================

    /// 写入模块实例
    pub fn insert_module_tx(conn: &Connection, module: &Module) -> RepositoryResult<()> {
        conn.execute(
            &format!(
                "INSERT INTO module ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                MODULE_COLUMNS
            ),
            params![
                module.module_id,
                module.class_id,
                module.title,
                module.description,
                module.order_index,
                module.is_published,
                module.unlock_at.as_ref().map(format_datetime),
                encode_id_list(&module.prerequisite_ids)?,
                format_datetime(&module.created_at),
            ],
        )?;
        Ok(())
    }

    /// 写入模块条目实例
    pub fn insert_item_tx(conn: &Connection, item: &ModuleItem) -> RepositoryResult<()> {
        conn.execute(
            &format!(
                "INSERT INTO module_item ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                MODULE_ITEM_COLUMNS
            ),
            params![
                item.module_item_id,
                item.module_id,
                item.item_kind.to_db_str(),
                item.title,
                item.assessment_id,
                item.custom_description,
                item.page_content,
                item.external_url,
                item.order_index,
                item.is_published,
                item.is_required,
            ],
        )?;
        Ok(())
    }

    /// 覆写模块的先修列表
    pub fn update_prerequisites_tx(
        conn: &Connection,
        module_id: &str,
        prerequisite_ids: &[String],
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE module SET prerequisite_ids = ?2 WHERE module_id = ?1",
            params![module_id, encode_id_list(prerequisite_ids)?],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Module".to_string(),
                id: module_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 读取
    // ==========================================

    /// 按 ID 查询模块
    pub fn find_by_id(&self, module_id: &str) -> RepositoryResult<Option<Module>> {
        let conn = self.get_conn()?;
        let module = conn
            .query_row(
                &format!("SELECT {} FROM module WHERE module_id = ?1", MODULE_COLUMNS),
                params![module_id],
                map_module,
            )
            .optional()?;
        Ok(module)
    }

    /// 查询班级下所有模块，按 order_index 升序
    pub fn find_by_class(&self, class_id: &str) -> RepositoryResult<Vec<Module>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM module WHERE class_id = ?1 ORDER BY order_index ASC, title ASC",
            MODULE_COLUMNS
        ))?;
        let modules = stmt
            .query_map(params![class_id], map_module)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(modules)
    }

    /// 查询模块下所有条目，按 order_index 升序
    pub fn find_items_by_module(&self, module_id: &str) -> RepositoryResult<Vec<ModuleItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM module_item WHERE module_id = ?1 ORDER BY order_index ASC, title ASC",
            MODULE_ITEM_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![module_id], map_module_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// 统计班级下的模块条目数量
    pub fn count_items_by_class(&self, class_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM module_item i
            JOIN module m ON m.module_id = i.module_id
            WHERE m.class_id = ?1
            "#,
            params![class_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

// ==========================================
// 行映射
// ==========================================

fn map_module(row: &Row<'_>) -> rusqlite::Result<Module> {
    Ok(Module {
        module_id: row.get(0)?,
        class_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        order_index: row.get(4)?,
        is_published: row.get(5)?,
        unlock_at: parse_optional_datetime(6, row.get(6)?)?,
        prerequisite_ids: parse_id_list(7, &row.get::<_, String>(7)?)?,
        created_at: parse_datetime(8, &row.get::<_, String>(8)?)?,
    })
}

fn map_module_item(row: &Row<'_>) -> rusqlite::Result<ModuleItem> {
    Ok(ModuleItem {
        module_item_id: row.get(0)?,
        module_id: row.get(1)?,
        item_kind: parse_enum(2, &row.get::<_, String>(2)?)?,
        title: row.get(3)?,
        assessment_id: row.get(4)?,
        custom_description: row.get(5)?,
        page_content: row.get(6)?,
        external_url: row.get(7)?,
        order_index: row.get(8)?,
        is_published: row.get(9)?,
        is_required: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    fn setup_test_db() -> SharedConnection {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO course (course_id, title) VALUES ('CS101', '导论');
            INSERT INTO class (class_id, course_id, name) VALUES ('CLS-1', 'CS101', '一班');
            "#,
        )
        .unwrap();
        Arc::new(Mutex::new(conn))
    }

    fn make_module(id: &str, order_index: i32) -> Module {
        Module {
            module_id: id.to_string(),
            class_id: "CLS-1".to_string(),
            title: format!("Week {}", order_index),
            description: None,
            order_index,
            is_published: true,
            unlock_at: None,
            prerequisite_ids: Vec::new(),
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_update_prerequisites_preserves_order() {
        let conn = setup_test_db();
        let repo = ModuleRepository::new(conn.clone());
        {
            let guard = conn.lock().unwrap();
            ModuleRepository::insert_module_tx(&guard, &make_module("m1", 1)).unwrap();
            ModuleRepository::insert_module_tx(&guard, &make_module("m2", 2)).unwrap();
            ModuleRepository::insert_module_tx(&guard, &make_module("m3", 3)).unwrap();
            ModuleRepository::update_prerequisites_tx(
                &guard,
                "m3",
                &["m2".to_string(), "m1".to_string()],
            )
            .unwrap();
        }

        let module = repo.find_by_id("m3").unwrap().unwrap();
        assert_eq!(module.prerequisite_ids, vec!["m2".to_string(), "m1".to_string()]);

        let ordered: Vec<_> = repo
            .find_by_class("CLS-1")
            .unwrap()
            .into_iter()
            .map(|m| m.module_id)
            .collect();
        assert_eq!(ordered, vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn test_update_prerequisites_on_missing_module_fails() {
        let conn = setup_test_db();
        let guard = conn.lock().unwrap();
        let err = ModuleRepository::update_prerequisites_tx(&guard, "ghost", &[]).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
