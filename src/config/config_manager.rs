// ==========================================
// 课程模板实例化引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::clone_config_trait::{CloneConfigReader, ConfigError};
use crate::db::{configure_sqlite_connection, SharedConnection};
use crate::domain::types::PrerequisitePolicy;
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: SharedConnection,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: SharedConnection) -> Result<Self, ConfigError> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取布尔配置，非法值回退默认并告警
    fn get_bool_or_default(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => {
                tracing::warn!(config_key = key, raw_value = %raw, "布尔配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }

    /// 写入/覆写 global 配置
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 在采纳报告中记录本次克隆使用的配置
    pub fn snapshot(&self) -> Result<String, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// CloneConfigReader Trait 实现
// ==========================================
#[async_trait]
impl CloneConfigReader for ConfigManager {
    async fn get_prerequisite_policy(&self) -> Result<PrerequisitePolicy, ConfigError> {
        let value = self.get_config_or_default(
            config_keys::PREREQUISITE_POLICY,
            PrerequisitePolicy::default().to_db_str(),
        )?;

        Ok(value.parse::<PrerequisitePolicy>().unwrap_or_else(|e| {
            tracing::warn!(
                config_key = config_keys::PREREQUISITE_POLICY,
                error = %e,
                "先修解析策略配置错误，使用默认值"
            );
            PrerequisitePolicy::default()
        }))
    }

    async fn get_publish_assessments_on_clone(&self) -> Result<bool, ConfigError> {
        self.get_bool_or_default(config_keys::PUBLISH_ASSESSMENTS_ON_CLONE, true)
    }

    async fn get_publish_modules_on_clone(&self) -> Result<bool, ConfigError> {
        self.get_bool_or_default(config_keys::PUBLISH_MODULES_ON_CLONE, true)
    }

    async fn get_config_snapshot(&self) -> Result<String, ConfigError> {
        self.snapshot()
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 先修模块解析策略 (DROP / WARN / FAIL)
    pub const PREREQUISITE_POLICY: &str = "curriculum/prerequisite_policy";

    // 克隆后发布状态
    pub const PUBLISH_ASSESSMENTS_ON_CLONE: &str = "curriculum/publish_assessments_on_clone";
    pub const PUBLISH_MODULES_ON_CLONE: &str = "curriculum/publish_modules_on_clone";
}
