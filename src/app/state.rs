// ==========================================
// 区域划分配置器 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::ConfiguratorApi;
use crate::config::config_manager::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::repository::{HandoffRepository, SessionRepository};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "FREIGHT_ZONE_CONFIG_DB_PATH";

/// 应用状态
///
/// 持有唯一的配置器实例; 同一时刻只有一个操作员写入会话
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 配置器API
    pub configurator_api: tokio::sync::Mutex<ConfiguratorApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并建表
    /// 2. 读取 config_kv 中的配置器参数
    /// 3. 恢复上次保存的会话快照（如有）
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let session_repo = Arc::new(SessionRepository::new(conn.clone()));
        let handoff_repo = Arc::new(HandoffRepository::new(conn.clone()));

        // ==========================================
        // 读取配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn).map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let config = config_manager
            .load_configurator_config()
            .await
            .map_err(|e| format!("配置读取失败: {}", e))?;
        let locale = crate::i18n::apply_locale(&config.locale);
        tracing::debug!(locale, "界面语言已应用");

        // ==========================================
        // 创建API实例并恢复会话
        // ==========================================
        let mut configurator_api = ConfiguratorApi::new(session_repo, handoff_repo, config);
        let restored = configurator_api
            .restore_session()
            .map_err(|e| format!("会话恢复失败: {}", e))?;
        tracing::info!(restored, "AppState初始化完成");

        Ok(Self {
            db_path,
            config_manager,
            configurator_api: tokio::sync::Mutex::new(configurator_api),
        })
    }
}

/// 获取默认数据库路径
///
/// 优先使用环境变量, 其次用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./freight_zone_config.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("freight-zone-config-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("freight-zone-config");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("freight_zone_config.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_keys;
    use crate::domain::geo::RawGeoRecord;
    use crate::importer::InMemoryGeographySource;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[tokio::test]
    async fn test_state_restores_session_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();
        let source = InMemoryGeographySource::new(vec![RawGeoRecord::new("110001", "Delhi", "New Delhi", "N1")]);

        {
            let state = AppState::new(db_path.clone()).await.unwrap();
            state
                .config_manager
                .set_config_value(config_keys::SESSION_KEY, "vendor_7")
                .unwrap();
            let mut api = state.configurator_api.lock().await;
            api.load_geography(&source).await.unwrap();
            api.select_zone("N1".parse().unwrap()).unwrap();
        }

        // 会话键已变更: 新实例读不到旧快照
        let state = AppState::new(db_path.clone()).await.unwrap();
        let api = state.configurator_api.lock().await;
        assert_eq!(api.config().session_key, "vendor_7");
        assert!(api.session().zones.is_empty());
    }
}
