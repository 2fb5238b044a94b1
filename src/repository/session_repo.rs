// ==========================================
// 区域划分配置器 - 会话快照仓储
// ==========================================
// 表: zone_session（每个 session_key 一行, 整体覆盖）
// 并发: revision 乐观校验, 旧版本写入拒绝, 同版本重写幂等
// ==========================================

use crate::domain::session::{ConfiguratorSession, SESSION_SCHEMA_VERSION};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct SessionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SessionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        let repo = Self { conn };
        if let Err(e) = repo.ensure_table() {
            tracing::warn!("zone_session ensure failed: {}", e);
        }
        repo
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS zone_session (
              session_key TEXT PRIMARY KEY,
              revision INTEGER NOT NULL,
              schema_version INTEGER NOT NULL,
              payload_json TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
            );
            "#,
        )?;
        Ok(())
    }

    /// 保存会话快照
    ///
    /// # 返回
    /// - Err(VersionConflict): 已存储的 revision 比传入的新
    pub fn save(&self, session_key: &str, session: &ConfiguratorSession) -> RepositoryResult<()> {
        let payload = serde_json::to_string(session)?;
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let stored: Option<i64> = tx
            .query_row(
                "SELECT revision FROM zone_session WHERE session_key = ?1",
                params![session_key],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(stored) = stored {
            let stored = stored as u64;
            if stored > session.revision {
                tracing::warn!(session_key, stored, incoming = session.revision, "会话快照版本冲突");
                return Err(RepositoryError::VersionConflict {
                    session_key: session_key.to_string(),
                    stored,
                    incoming: session.revision,
                });
            }
        }

        tx.execute(
            r#"
            INSERT INTO zone_session (session_key, revision, schema_version, payload_json, updated_at)
            VALUES (?1, ?2, ?3, ?4, datetime('now', 'localtime'))
            ON CONFLICT(session_key) DO UPDATE SET
              revision = excluded.revision,
              schema_version = excluded.schema_version,
              payload_json = excluded.payload_json,
              updated_at = excluded.updated_at
            "#,
            params![
                session_key,
                session.revision as i64,
                session.schema_version as i64,
                payload
            ],
        )?;
        tx.commit()?;

        tracing::debug!(session_key, revision = session.revision, "会话快照已保存");
        Ok(())
    }

    /// 读取会话快照（不存在返回 None）
    pub fn load(&self, session_key: &str) -> RepositoryResult<Option<ConfiguratorSession>> {
        let conn = self.get_conn()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload_json FROM zone_session WHERE session_key = ?1",
                params![session_key],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        let session: ConfiguratorSession = serde_json::from_str(&payload)?;
        if session.schema_version > SESSION_SCHEMA_VERSION {
            return Err(RepositoryError::UnsupportedSchemaVersion {
                found: session.schema_version,
                supported: SESSION_SCHEMA_VERSION,
            });
        }
        Ok(Some(session))
    }

    /// 已存储的 revision
    pub fn stored_revision(&self, session_key: &str) -> RepositoryResult<Option<u64>> {
        let conn = self.get_conn()?;
        let revision: Option<i64> = conn
            .query_row(
                "SELECT revision FROM zone_session WHERE session_key = ?1",
                params![session_key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(revision.map(|r| r as u64))
    }

    /// 删除会话快照
    ///
    /// # 返回
    /// - 是否删除了记录
    pub fn delete(&self, session_key: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM zone_session WHERE session_key = ?1",
            params![session_key],
        )?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ZoneCode;
    use crate::domain::zone::Zone;

    fn repo() -> SessionRepository {
        let conn = Connection::open_in_memory().unwrap();
        SessionRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn session_at(revision: u64) -> ConfiguratorSession {
        let mut session = ConfiguratorSession::new();
        session.zones.push(Zone::new("N1".parse::<ZoneCode>().unwrap()));
        session.revision = revision;
        session
    }

    #[test]
    fn test_save_and_load() {
        let repo = repo();
        assert!(repo.load("vendor").unwrap().is_none());

        let session = session_at(1);
        repo.save("vendor", &session).unwrap();
        assert_eq!(repo.load("vendor").unwrap(), Some(session));
        assert_eq!(repo.stored_revision("vendor").unwrap(), Some(1));
    }

    #[test]
    fn test_same_revision_is_idempotent() {
        let repo = repo();
        let session = session_at(3);
        repo.save("vendor", &session).unwrap();
        repo.save("vendor", &session).unwrap();
        assert_eq!(repo.load("vendor").unwrap(), Some(session));
    }

    #[test]
    fn test_stale_revision_rejected() {
        let repo = repo();
        repo.save("vendor", &session_at(5)).unwrap();

        let err = repo.save("vendor", &session_at(4)).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::VersionConflict {
                stored: 5,
                incoming: 4,
                ..
            }
        ));
        assert_eq!(repo.stored_revision("vendor").unwrap(), Some(5));
    }

    #[test]
    fn test_delete() {
        let repo = repo();
        repo.save("vendor", &session_at(1)).unwrap();
        assert!(repo.delete("vendor").unwrap());
        assert!(!repo.delete("vendor").unwrap());
        assert!(repo.load("vendor").unwrap().is_none());
    }

    #[test]
    fn test_future_schema_version_rejected() {
        let repo = repo();
        let mut session = session_at(1);
        session.schema_version = SESSION_SCHEMA_VERSION + 1;
        repo.save("vendor", &session).unwrap();
        assert!(matches!(
            repo.load("vendor"),
            Err(RepositoryError::UnsupportedSchemaVersion { .. })
        ));
    }
}
