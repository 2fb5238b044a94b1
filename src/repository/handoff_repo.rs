// ==========================================
// 区域划分配置器 - 交接载荷仓储
// ==========================================
// 表: onboarding_handoff
// 写入: INSERT ... ON CONFLICT DO UPDATE（重复提交幂等）
// ==========================================

use crate::domain::session::OnboardingHandoff;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 已提交的交接记录
#[derive(Debug, Clone, PartialEq)]
pub struct HandoffRecord {
    /// 每次提交重新生成
    pub handoff_id: String,
    pub session_key: String,
    pub payload: OnboardingHandoff,
    pub zone_count: usize,
    pub submitted_at: NaiveDateTime,
}

pub struct HandoffRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HandoffRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        let repo = Self { conn };
        if let Err(e) = repo.ensure_table() {
            tracing::warn!("onboarding_handoff ensure failed: {}", e);
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
            CREATE TABLE IF NOT EXISTS onboarding_handoff (
              session_key TEXT PRIMARY KEY,
              handoff_id TEXT NOT NULL,
              payload_json TEXT NOT NULL,
              zone_count INTEGER NOT NULL,
              submitted_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// 写入交接载荷, 返回本次提交的 handoff_id
    pub fn write(&self, session_key: &str, payload: &OnboardingHandoff) -> RepositoryResult<String> {
        let handoff_id = Uuid::new_v4().to_string();
        let payload_json = serde_json::to_string(payload)?;
        let submitted_at = Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string();

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO onboarding_handoff (session_key, handoff_id, payload_json, zone_count, submitted_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(session_key) DO UPDATE SET
              handoff_id = excluded.handoff_id,
              payload_json = excluded.payload_json,
              zone_count = excluded.zone_count,
              submitted_at = excluded.submitted_at
            "#,
            params![
                session_key,
                handoff_id,
                payload_json,
                payload.zones.len() as i64,
                submitted_at
            ],
        )?;

        tracing::info!(session_key, handoff_id = %handoff_id, zones = payload.zones.len(), "交接载荷已写入");
        Ok(handoff_id)
    }

    /// 按 session_key 查询
    pub fn find(&self, session_key: &str) -> RepositoryResult<Option<HandoffRecord>> {
        let conn = self.get_conn()?;
        let row: Option<(String, String, i64, String)> = conn
            .query_row(
                "SELECT handoff_id, payload_json, zone_count, submitted_at FROM onboarding_handoff WHERE session_key = ?1",
                params![session_key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((handoff_id, payload_json, zone_count, submitted_at)) = row else {
            return Ok(None);
        };

        let submitted_at = NaiveDateTime::parse_from_str(&submitted_at, TIMESTAMP_FORMAT)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        Ok(Some(HandoffRecord {
            handoff_id,
            session_key: session_key.to_string(),
            payload: serde_json::from_str(&payload_json)?,
            zone_count: zone_count as usize,
            submitted_at,
        }))
    }

    /// 已提交数量（测试与诊断用）
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM onboarding_handoff", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::zone::ZoneRecord;

    fn repo() -> HandoffRepository {
        let conn = Connection::open_in_memory().unwrap();
        HandoffRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn payload(codes: &[&str]) -> OnboardingHandoff {
        OnboardingHandoff {
            zones: codes
                .iter()
                .map(|c| ZoneRecord {
                    zone_code: c.parse().unwrap(),
                    selected_states: vec!["Delhi".to_string()],
                    selected_cities: vec![],
                    is_complete: true,
                })
                .collect(),
            price_matrix: vec![],
        }
    }

    #[test]
    fn test_write_is_upsert() {
        let repo = repo();
        let first = repo.write("vendor", &payload(&["N1"])).unwrap();
        let second = repo.write("vendor", &payload(&["N1", "N2"])).unwrap();
        assert_ne!(first, second);

        assert_eq!(repo.count().unwrap(), 1);
        let record = repo.find("vendor").unwrap().unwrap();
        assert_eq!(record.handoff_id, second);
        assert_eq!(record.zone_count, 2);
        assert_eq!(record.payload, payload(&["N1", "N2"]));
    }

    #[test]
    fn test_find_missing() {
        assert!(repo().find("nobody").unwrap().is_none());
    }
}
