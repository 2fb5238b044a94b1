// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 基于临时数据库组装 ConfiguratorApi
// ==========================================

use std::sync::{Arc, Mutex};

use freight_zone_config::api::ConfiguratorApi;
use freight_zone_config::config::ConfiguratorConfig;
use freight_zone_config::db::{ensure_schema, open_sqlite_connection};
use freight_zone_config::repository::{HandoffRepository, SessionRepository};
use rusqlite::Connection;
use tempfile::NamedTempFile;

use super::geo_fixture::standard_geography;

/// API测试环境
///
/// 临时数据库文件需随环境存活
pub struct ApiTestEnv {
    pub _temp_file: NamedTempFile,
    pub db_path: String,
    pub conn: Arc<Mutex<Connection>>,
    pub session_repo: Arc<SessionRepository>,
    pub handoff_repo: Arc<HandoffRepository>,
}

impl ApiTestEnv {
    pub fn new() -> Self {
        let temp_file = NamedTempFile::new().expect("创建临时数据库失败");
        let db_path = temp_file.path().to_str().unwrap().to_string();
        let conn = open_sqlite_connection(&db_path).expect("打开数据库失败");
        ensure_schema(&conn).expect("初始化 schema 失败");
        let conn = Arc::new(Mutex::new(conn));

        Self {
            _temp_file: temp_file,
            db_path,
            session_repo: Arc::new(SessionRepository::new(conn.clone())),
            handoff_repo: Arc::new(HandoffRepository::new(conn.clone())),
            conn,
        }
    }

    /// 新建 API 实例（共享同一数据库）
    pub fn api(&self) -> ConfiguratorApi {
        self.api_with_config(ConfiguratorConfig::default())
    }

    pub fn api_with_config(&self, config: ConfiguratorConfig) -> ConfiguratorApi {
        ConfiguratorApi::new(self.session_repo.clone(), self.handoff_repo.clone(), config)
    }

    /// 新建 API 并加载标准地理数据
    pub async fn ready_api(&self) -> ConfiguratorApi {
        let mut api = self.api();
        api.load_geography(&standard_geography().source())
            .await
            .expect("加载地理数据失败");
        api
    }
}
