// ==========================================
// 区域划分配置器 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::configurator_config::{ConfiguratorConfig, DEFAULT_LOCALE, DEFAULT_SESSION_KEY};
use crate::config::configurator_config_trait::ConfiguratorConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::{catalogue_size, OrderingPolicy};
use crate::engine::geography_index::DEFAULT_PLACEHOLDER_TOKENS;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            crate::db::ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now', 'localtime')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 交接前记录配置口径
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 此方法会覆盖现有的global配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    /// 解析全部配置项
    pub async fn load_configurator_config(&self) -> Result<ConfiguratorConfig, Box<dyn Error>> {
        let ordering_policy = self.get_ordering_policy().await?;
        let max_zone_count = self.get_max_zone_count().await?;
        let placeholder_tokens = self.get_placeholder_tokens().await?;
        let session_key = self.get_session_key().await?;
        let locale = self.get_locale().await?;

        Ok(ConfiguratorConfig {
            ordering_policy,
            max_zone_count,
            placeholder_tokens,
            session_key,
            locale,
        })
    }
}

// ==========================================
// ConfiguratorConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ConfiguratorConfigReader for ConfigManager {
    async fn get_ordering_policy(&self) -> Result<OrderingPolicy, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::ZONE_ORDERING_POLICY, "STRICT")?;
        match value.trim().to_uppercase().as_str() {
            "STRICT" => Ok(OrderingPolicy::Strict),
            "RELAXED" => Ok(OrderingPolicy::Relaxed),
            other => {
                tracing::warn!(
                    config_key = config_keys::ZONE_ORDERING_POLICY,
                    raw_value = other,
                    "顺序策略配置无效，使用 STRICT"
                );
                Ok(OrderingPolicy::Strict)
            }
        }
    }

    async fn get_max_zone_count(&self) -> Result<usize, Box<dyn Error>> {
        let max = catalogue_size();
        let value = self.get_config_or_default(config_keys::MAX_ZONE_COUNT, &max.to_string())?;
        Ok(value
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&n| n >= 1)
            .map(|n| n.min(max))
            .unwrap_or(max))
    }

    async fn get_placeholder_tokens(&self) -> Result<Vec<String>, Box<dyn Error>> {
        let Some(value) = self.get_config_value(config_keys::GEO_PLACEHOLDER_TOKENS)? else {
            return Ok(DEFAULT_PLACEHOLDER_TOKENS.iter().map(|t| t.to_string()).collect());
        };

        Ok(value
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect())
    }

    async fn get_session_key(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::SESSION_KEY, DEFAULT_SESSION_KEY)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(DEFAULT_SESSION_KEY.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }

    async fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(config_keys::LOCALE, DEFAULT_LOCALE)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 区域名单
    pub const ZONE_ORDERING_POLICY: &str = "zone_ordering_policy";
    pub const MAX_ZONE_COUNT: &str = "max_zone_count";

    // 地理数据
    pub const GEO_PLACEHOLDER_TOKENS: &str = "geo_placeholder_tokens";

    // 会话
    pub const SESSION_KEY: &str = "session_key";

    // 界面
    pub const LOCALE: &str = "locale";
}
