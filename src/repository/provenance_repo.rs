// ==========================================
// 课程模板实例化引擎 - 溯源映射仓储 (Provenance Recorder)
// ==========================================
// 三张映射表均以实例 ID 为主键: 每个实例至多一行溯源
// 写入只发生在采纳事务内；读取供查找表构建与溯源查询
// ==========================================

use crate::db::SharedConnection;
use crate::domain::provenance::{
    AssessmentTemplateMapping, ModuleItemTemplateMapping, ModuleTemplateMapping,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};

// ==========================================
// ProvenanceRepository - 溯源映射仓储
// ==========================================
pub struct ProvenanceRepository {
    conn: SharedConnection,
}

impl ProvenanceRepository {
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

    pub fn insert_assessment_mapping_tx(
        conn: &Connection,
        mapping: &AssessmentTemplateMapping,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO assessment_template_mapping (assessment_id, class_id, assessment_template_id)
            VALUES (?1, ?2, ?3)
            "#,
            params![mapping.assessment_id, mapping.class_id, mapping.assessment_template_id],
        )?;
        Ok(())
    }

    pub fn insert_module_mapping_tx(
        conn: &Connection,
        mapping: &ModuleTemplateMapping,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO module_template_mapping (module_id, class_id, module_template_id)
            VALUES (?1, ?2, ?3)
            "#,
            params![mapping.module_id, mapping.class_id, mapping.module_template_id],
        )?;
        Ok(())
    }

    pub fn insert_module_item_mapping_tx(
        conn: &Connection,
        mapping: &ModuleItemTemplateMapping,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO module_item_template_mapping (module_item_id, module_id, module_item_template_id)
            VALUES (?1, ?2, ?3)
            "#,
            params![mapping.module_item_id, mapping.module_id, mapping.module_item_template_id],
        )?;
        Ok(())
    }

    // ==========================================
    // 事务内按班级读取（查找表构建）
    // ==========================================

    /// 查询班级下全部测评溯源
    pub fn find_assessment_mappings_by_class_tx(
        conn: &Connection,
        class_id: &str,
    ) -> RepositoryResult<Vec<AssessmentTemplateMapping>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT class_id, assessment_id, assessment_template_id
            FROM assessment_template_mapping
            WHERE class_id = ?1
            ORDER BY rowid ASC
            "#,
        )?;
        let mappings = stmt
            .query_map(params![class_id], |row| {
                Ok(AssessmentTemplateMapping {
                    class_id: row.get(0)?,
                    assessment_id: row.get(1)?,
                    assessment_template_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(mappings)
    }

    /// 查询班级下全部模块溯源
    pub fn find_module_mappings_by_class_tx(
        conn: &Connection,
        class_id: &str,
    ) -> RepositoryResult<Vec<ModuleTemplateMapping>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT class_id, module_id, module_template_id
            FROM module_template_mapping
            WHERE class_id = ?1
            ORDER BY rowid ASC
            "#,
        )?;
        let mappings = stmt
            .query_map(params![class_id], |row| {
                Ok(ModuleTemplateMapping {
                    class_id: row.get(0)?,
                    module_id: row.get(1)?,
                    module_template_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(mappings)
    }

    /// 查询班级下全部测评溯源（独立连接）
    pub fn find_assessment_mappings_by_class(
        &self,
        class_id: &str,
    ) -> RepositoryResult<Vec<AssessmentTemplateMapping>> {
        let conn = self.get_conn()?;
        Self::find_assessment_mappings_by_class_tx(&conn, class_id)
    }

    /// 查询班级下全部模块溯源（独立连接）
    pub fn find_module_mappings_by_class(
        &self,
        class_id: &str,
    ) -> RepositoryResult<Vec<ModuleTemplateMapping>> {
        let conn = self.get_conn()?;
        Self::find_module_mappings_by_class_tx(&conn, class_id)
    }

    // ==========================================
    // 按实例 ID 点查询
    // ==========================================

    pub fn find_assessment_mapping(
        &self,
        assessment_id: &str,
    ) -> RepositoryResult<Option<AssessmentTemplateMapping>> {
        let conn = self.get_conn()?;
        let mapping = conn
            .query_row(
                r#"
                SELECT class_id, assessment_id, assessment_template_id
                FROM assessment_template_mapping
                WHERE assessment_id = ?1
                "#,
                params![assessment_id],
                |row| {
                    Ok(AssessmentTemplateMapping {
                        class_id: row.get(0)?,
                        assessment_id: row.get(1)?,
                        assessment_template_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(mapping)
    }

    pub fn find_module_mapping(
        &self,
        module_id: &str,
    ) -> RepositoryResult<Option<ModuleTemplateMapping>> {
        let conn = self.get_conn()?;
        let mapping = conn
            .query_row(
                r#"
                SELECT class_id, module_id, module_template_id
                FROM module_template_mapping
                WHERE module_id = ?1
                "#,
                params![module_id],
                |row| {
                    Ok(ModuleTemplateMapping {
                        class_id: row.get(0)?,
                        module_id: row.get(1)?,
                        module_template_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(mapping)
    }

    pub fn find_module_item_mapping(
        &self,
        module_item_id: &str,
    ) -> RepositoryResult<Option<ModuleItemTemplateMapping>> {
        let conn = self.get_conn()?;
        let mapping = conn
            .query_row(
                r#"
                SELECT module_id, module_item_id, module_item_template_id
                FROM module_item_template_mapping
                WHERE module_item_id = ?1
                "#,
                params![module_item_id],
                |row| {
                    Ok(ModuleItemTemplateMapping {
                        module_id: row.get(0)?,
                        module_item_id: row.get(1)?,
                        module_item_template_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(mapping)
    }

    /// 查询模块下全部条目溯源
    pub fn find_module_item_mappings_by_module(
        &self,
        module_id: &str,
    ) -> RepositoryResult<Vec<ModuleItemTemplateMapping>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT module_id, module_item_id, module_item_template_id
            FROM module_item_template_mapping
            WHERE module_id = ?1
            "#,
        )?;
        let mappings = stmt
            .query_map(params![module_id], |row| {
                Ok(ModuleItemTemplateMapping {
                    module_id: row.get(0)?,
                    module_item_id: row.get(1)?,
                    module_item_template_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(mappings)
    }
}
