// ==========================================
// 课程模板实例化引擎 - 模板仓储 (Template Store)
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 模板由管理员 CRUD 维护，引擎侧只读；
//       insert_* 仅供种子数据与测试使用
// ==========================================

use crate::db::SharedConnection;
use crate::domain::template::{
    AssessmentTemplate, DiscussionPolicy, ModuleItemTemplate, ModuleTemplate,
    ModuleTemplateWithItems,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_types::{
    encode_id_list, format_datetime, parse_enum, parse_id_list, parse_optional_datetime,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

const ASSESSMENT_TEMPLATE_COLUMNS: &str = r#"
    template_id, course_id, title, description, assessment_type,
    default_max_points, default_submission_mode, is_active, order_index,
    default_allow_peer_replies, default_minimum_reply_count, default_auto_complete_enabled,
    default_locked_after_due, default_require_post_before_viewing, default_allow_anonymous
"#;

const MODULE_TEMPLATE_COLUMNS: &str = r#"
    template_id, course_id, title, description, order_index, is_active,
    default_unlock_at, default_prerequisite_ids
"#;

const MODULE_ITEM_TEMPLATE_COLUMNS: &str = r#"
    template_id, module_template_id, item_kind, title, assessment_template_id,
    custom_description, page_content, external_url, order_index, is_published, is_required
"#;

// ==========================================
// TemplateRepository - 模板仓储
// ==========================================
pub struct TemplateRepository {
    conn: SharedConnection,
}

impl TemplateRepository {
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
    // 写入（种子数据）
    // ==========================================

    /// 写入测评模板
    pub fn insert_assessment_template(&self, template: &AssessmentTemplate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let policy = &template.discussion_defaults;
        conn.execute(
            &format!(
                "INSERT INTO assessment_template ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                ASSESSMENT_TEMPLATE_COLUMNS
            ),
            params![
                template.template_id,
                template.course_id,
                template.title,
                template.description,
                template.assessment_type.to_db_str(),
                template.default_max_points,
                template.default_submission_mode.to_db_str(),
                template.is_active,
                template.order_index,
                policy.allow_peer_replies,
                policy.minimum_reply_count,
                policy.auto_complete_enabled,
                policy.locked_after_due,
                policy.require_post_before_viewing,
                policy.allow_anonymous,
            ],
        )?;
        Ok(())
    }

    /// 写入模块模板
    pub fn insert_module_template(&self, template: &ModuleTemplate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO module_template ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                MODULE_TEMPLATE_COLUMNS
            ),
            params![
                template.template_id,
                template.course_id,
                template.title,
                template.description,
                template.order_index,
                template.is_active,
                template.default_unlock_at.as_ref().map(format_datetime),
                encode_id_list(&template.default_prerequisite_ids)?,
            ],
        )?;
        Ok(())
    }

    /// 写入模块条目模板
    pub fn insert_module_item_template(&self, template: &ModuleItemTemplate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO module_item_template ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                MODULE_ITEM_TEMPLATE_COLUMNS
            ),
            params![
                template.template_id,
                template.module_template_id,
                template.item_kind.to_db_str(),
                template.title,
                template.assessment_template_id,
                template.custom_description,
                template.page_content,
                template.external_url,
                template.order_index,
                template.is_published,
                template.is_required,
            ],
        )?;
        Ok(())
    }

    // ==========================================
    // 引擎读取（调用方连接/事务）
    // ==========================================

    /// 查询课程下所有启用的测评模板，按 order_index 升序
    pub fn find_active_assessment_templates_tx(
        conn: &Connection,
        course_id: &str,
    ) -> RepositoryResult<Vec<AssessmentTemplate>> {
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM assessment_template
            WHERE course_id = ?1 AND is_active = 1
            ORDER BY order_index ASC, template_id ASC
            "#,
            ASSESSMENT_TEMPLATE_COLUMNS
        ))?;

        let templates = stmt
            .query_map(params![course_id], map_assessment_template)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(templates)
    }

    /// 查询课程下所有启用的模块模板（预加载有序条目模板）
    pub fn find_active_module_templates_with_items_tx(
        conn: &Connection,
        course_id: &str,
    ) -> RepositoryResult<Vec<ModuleTemplateWithItems>> {
        let mut module_stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM module_template
            WHERE course_id = ?1 AND is_active = 1
            ORDER BY order_index ASC, template_id ASC
            "#,
            MODULE_TEMPLATE_COLUMNS
        ))?;

        let modules = module_stmt
            .query_map(params![course_id], map_module_template)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if modules.is_empty() {
            return Ok(Vec::new());
        }

        // 一次性取出所有条目模板，再按模块分组
        let mut item_stmt = conn.prepare(
            r#"
            SELECT
                i.template_id, i.module_template_id, i.item_kind, i.title, i.assessment_template_id,
                i.custom_description, i.page_content, i.external_url, i.order_index, i.is_published, i.is_required
            FROM module_item_template i
            JOIN module_template m ON m.template_id = i.module_template_id
            WHERE m.course_id = ?1 AND m.is_active = 1
            ORDER BY i.module_template_id ASC, i.order_index ASC, i.template_id ASC
            "#,
        )?;

        let mut items_by_module: HashMap<String, Vec<ModuleItemTemplate>> = HashMap::new();
        let items = item_stmt.query_map(params![course_id], map_module_item_template)?;
        for item in items {
            let item = item?;
            items_by_module
                .entry(item.module_template_id.clone())
                .or_default()
                .push(item);
        }

        Ok(modules
            .into_iter()
            .map(|module| {
                let items = items_by_module
                    .remove(&module.template_id)
                    .unwrap_or_default();
                ModuleTemplateWithItems { module, items }
            })
            .collect())
    }

    // ==========================================
    // 点查询（溯源 API 使用）
    // ==========================================

    /// 按 ID 查询测评模板（不区分启用状态）
    pub fn find_assessment_template(&self, template_id: &str) -> RepositoryResult<Option<AssessmentTemplate>> {
        let conn = self.get_conn()?;
        let template = conn
            .query_row(
                &format!(
                    "SELECT {} FROM assessment_template WHERE template_id = ?1",
                    ASSESSMENT_TEMPLATE_COLUMNS
                ),
                params![template_id],
                map_assessment_template,
            )
            .optional()?;
        Ok(template)
    }

    /// 按 ID 查询模块模板（不区分启用状态）
    pub fn find_module_template(&self, template_id: &str) -> RepositoryResult<Option<ModuleTemplate>> {
        let conn = self.get_conn()?;
        let template = conn
            .query_row(
                &format!(
                    "SELECT {} FROM module_template WHERE template_id = ?1",
                    MODULE_TEMPLATE_COLUMNS
                ),
                params![template_id],
                map_module_template,
            )
            .optional()?;
        Ok(template)
    }

    /// 按 ID 查询模块条目模板
    pub fn find_module_item_template(&self, template_id: &str) -> RepositoryResult<Option<ModuleItemTemplate>> {
        let conn = self.get_conn()?;
        let template = conn
            .query_row(
                &format!(
                    "SELECT {} FROM module_item_template WHERE template_id = ?1",
                    MODULE_ITEM_TEMPLATE_COLUMNS
                ),
                params![template_id],
                map_module_item_template,
            )
            .optional()?;
        Ok(template)
    }
}

// ==========================================
// 行映射
// ==========================================

fn map_assessment_template(row: &Row<'_>) -> rusqlite::Result<AssessmentTemplate> {
    Ok(AssessmentTemplate {
        template_id: row.get(0)?,
        course_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        assessment_type: parse_enum(4, &row.get::<_, String>(4)?)?,
        default_max_points: row.get(5)?,
        default_submission_mode: parse_enum(6, &row.get::<_, String>(6)?)?,
        is_active: row.get(7)?,
        order_index: row.get(8)?,
        discussion_defaults: DiscussionPolicy {
            allow_peer_replies: row.get(9)?,
            minimum_reply_count: row.get(10)?,
            auto_complete_enabled: row.get(11)?,
            locked_after_due: row.get(12)?,
            require_post_before_viewing: row.get(13)?,
            allow_anonymous: row.get(14)?,
        },
    })
}

fn map_module_template(row: &Row<'_>) -> rusqlite::Result<ModuleTemplate> {
    Ok(ModuleTemplate {
        template_id: row.get(0)?,
        course_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        order_index: row.get(4)?,
        is_active: row.get(5)?,
        default_unlock_at: parse_optional_datetime(6, row.get(6)?)?,
        default_prerequisite_ids: parse_id_list(7, &row.get::<_, String>(7)?)?,
    })
}

fn map_module_item_template(row: &Row<'_>) -> rusqlite::Result<ModuleItemTemplate> {
    Ok(ModuleItemTemplate {
        template_id: row.get(0)?,
        module_template_id: row.get(1)?,
        item_kind: parse_enum(2, &row.get::<_, String>(2)?)?,
        title: row.get(3)?,
        assessment_template_id: row.get(4)?,
        custom_description: row.get(5)?,
        page_content: row.get(6)?,
        external_url: row.get(7)?,
        order_index: row.get(8)?,
        is_published: row.get(9)?,
        is_required: row.get(10)?,
    })
}
