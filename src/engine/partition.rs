// ==========================================
// 区域划分配置器 - 划分引擎
// ==========================================
// 红线: 任意时刻一个 CityKey 最多归属一个区域
// 红线: 所有操作先校验后修改, 失败时会话不变
// ==========================================
// 集合口径:
// - 区域自有 (owned)
// - 剩余池 (leftover): 被主动移出、尚未被认领的城市
// - 他区占用 (owned elsewhere)
// 可选城市 = 州内城市 - 他区占用（包含自有与剩余池城市）
// ==========================================

use crate::domain::session::ConfiguratorSession;
use crate::domain::types::{CityKey, Region};
use crate::domain::zone::Zone;
use crate::engine::error::{ZoneError, ZoneResult};
use crate::engine::geography_index::{sort_city_keys, sort_state_names, GeographyIndex};
use crate::engine::roster::ensure_partitioning;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// 城市切换结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

// ==========================================
// PartitionEngine - 划分引擎
// ==========================================
// 不持有会话, 只计算并修改传入的会话副本
pub struct PartitionEngine {
    geo: Arc<GeographyIndex>,
}

impl PartitionEngine {
    pub fn new(geo: Arc<GeographyIndex>) -> Self {
        Self { geo }
    }

    pub fn geography(&self) -> &GeographyIndex {
        &self.geo
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 城市当前归属的区域下标
    pub fn owner_of(&self, session: &ConfiguratorSession, key: &CityKey) -> Option<usize> {
        session.zones.iter().position(|z| z.owns(key))
    }

    /// 除指定区域外所有区域占用的城市
    pub fn owned_by_others(&self, session: &ConfiguratorSession, zone_index: usize) -> BTreeSet<CityKey> {
        session
            .zones
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != zone_index)
            .flat_map(|(_, z)| z.assigned_cities.iter().cloned())
            .collect()
    }

    /// 同一大区内其他区域占用的城市
    fn owned_by_region_others(
        &self,
        session: &ConfiguratorSession,
        zone_index: usize,
        region: Region,
    ) -> BTreeSet<CityKey> {
        session
            .zones
            .iter()
            .enumerate()
            .filter(|(i, z)| *i != zone_index && z.region() == region)
            .flat_map(|(_, z)| z.assigned_cities.iter().cloned())
            .collect()
    }

    /// 所有区域占用的城市
    fn owned_by_any(&self, session: &ConfiguratorSession) -> BTreeSet<CityKey> {
        session
            .zones
            .iter()
            .flat_map(|z| z.assigned_cities.iter().cloned())
            .collect()
    }

    /// 区域可选城市（含自有, 含剩余池）
    pub fn available_cities(
        &self,
        session: &ConfiguratorSession,
        zone_index: usize,
        state: &str,
    ) -> ZoneResult<BTreeSet<CityKey>> {
        let zone = zone_at(session, zone_index)?;
        let others = self.owned_by_others(session, zone_index);
        Ok(self
            .geo
            .cities_of(zone.region(), state)
            .difference(&others)
            .cloned()
            .collect())
    }

    /// 可选城市（展示顺序）
    pub fn sorted_available_cities(
        &self,
        session: &ConfiguratorSession,
        zone_index: usize,
        state: &str,
    ) -> ZoneResult<Vec<CityKey>> {
        let mut keys: Vec<CityKey> = self
            .available_cities(session, zone_index, state)?
            .into_iter()
            .collect();
        sort_city_keys(&mut keys);
        Ok(keys)
    }

    /// 州内处于剩余池中的城市（界面高亮用）
    pub fn leftover_cities(
        &self,
        session: &ConfiguratorSession,
        zone_index: usize,
        state: &str,
    ) -> ZoneResult<Vec<CityKey>> {
        let zone = zone_at(session, zone_index)?;
        let mut keys: Vec<CityKey> = session
            .leftover_pool(zone.region())
            .map(|pool| pool.keys().filter(|k| k.state() == state).cloned().collect())
            .unwrap_or_default();
        sort_city_keys(&mut keys);
        Ok(keys)
    }

    /// 州是否对当前区域可见
    ///
    /// 可见条件:
    /// - 区域已拥有该州至少一个城市（保证可回改）
    /// - 或: 该州未被同大区其他区域 100% 占用, 且仍有可选城市
    pub fn state_visibility(
        &self,
        session: &ConfiguratorSession,
        zone_index: usize,
        state: &str,
    ) -> ZoneResult<bool> {
        let zone = zone_at(session, zone_index)?;
        let region = zone.region();
        let cities = self.geo.cities_of(region, state);
        if cities.is_empty() {
            return Ok(false);
        }
        if zone.cities_in_state(state).next().is_some() {
            return Ok(true);
        }

        let region_others = self.owned_by_region_others(session, zone_index, region);
        let claimed_by_region = cities.iter().all(|k| region_others.contains(k));
        if claimed_by_region {
            return Ok(false);
        }

        let others = self.owned_by_others(session, zone_index);
        Ok(cities.iter().any(|k| !others.contains(k)))
    }

    /// 区域可见的州（展示顺序）
    pub fn visible_states(&self, session: &ConfiguratorSession, zone_index: usize) -> ZoneResult<Vec<String>> {
        let zone = zone_at(session, zone_index)?;
        let mut visible = Vec::new();
        for state in self.geo.states_of(zone.region()) {
            if self.state_visibility(session, zone_index, &state)? {
                visible.push(state);
            }
        }
        sort_state_names(&mut visible);
        Ok(visible)
    }

    /// 大区内尚未被任何区域认领的城市
    pub fn unclaimed_cities(&self, session: &ConfiguratorSession, region: Region) -> BTreeSet<CityKey> {
        let owned = self.owned_by_any(session);
        self.geo
            .region_cities(region)
            .into_iter()
            .filter(|k| !owned.contains(k))
            .collect()
    }

    /// 大区是否耗尽（全部城市均已分配）
    pub fn is_region_exhausted(&self, session: &ConfiguratorSession, region: Region) -> bool {
        self.unclaimed_cities(session, region).is_empty()
    }

    /// 大区内某州是否已 100% 分配
    pub fn is_state_fully_assigned(&self, session: &ConfiguratorSession, region: Region, state: &str) -> bool {
        let owned = self.owned_by_any(session);
        self.geo
            .cities_of(region, state)
            .iter()
            .all(|k| owned.contains(k))
    }

    // ==========================================
    // 变更
    // ==========================================

    /// 切换城市归属
    ///
    /// - 已拥有: 移出区域, 进入大区剩余池（来源 = 本区域）
    /// - 未拥有且可选: 加入区域, 移出剩余池（无论来源）
    pub fn toggle_city(
        &self,
        session: &mut ConfiguratorSession,
        zone_index: usize,
        key: &CityKey,
    ) -> ZoneResult<ToggleOutcome> {
        let zone = editable_zone(session, zone_index)?;
        let (code, region) = (zone.code, zone.region());

        if zone.owns(key) {
            session.zones[zone_index].assigned_cities.remove(key);
            session
                .leftovers
                .entry(region)
                .or_default()
                .release(key.clone(), code);
            tracing::debug!(zone = %code, city = %key, "城市移出区域, 进入剩余池");
            return Ok(ToggleOutcome::Removed);
        }

        if !self.geo.contains(region, key) {
            return Err(ZoneError::CityNotInRegion {
                code,
                city: key.clone(),
            });
        }
        if let Some(owner) = self.owner_of(session, key) {
            return Err(ZoneError::CityOwnedElsewhere {
                city: key.clone(),
                owner: session.zones[owner].code,
            });
        }

        session.zones[zone_index].assigned_cities.insert(key.clone());
        claim_from_pools(session, key);
        tracing::debug!(zone = %code, city = %key, "城市加入区域");
        Ok(ToggleOutcome::Added)
    }

    /// 全选州内可选城市（含剩余池）
    ///
    /// # 返回
    /// - 新增城市数量
    pub fn select_all_for_state(
        &self,
        session: &mut ConfiguratorSession,
        zone_index: usize,
        state: &str,
    ) -> ZoneResult<usize> {
        let zone = editable_zone(session, zone_index)?;
        let (code, region) = (zone.code, zone.region());
        if !self.geo.has_state(region, state) {
            return Err(ZoneError::UnknownState {
                region,
                state: state.to_string(),
            });
        }

        let available = self.available_cities(session, zone_index, state)?;
        let additions: Vec<CityKey> = available
            .into_iter()
            .filter(|k| !session.zones[zone_index].owns(k))
            .collect();

        for key in &additions {
            session.zones[zone_index].assigned_cities.insert(key.clone());
            claim_from_pools(session, key);
        }

        tracing::debug!(zone = %code, state, added = additions.len(), "州内城市全选");
        Ok(additions.len())
    }

    /// 清空区域在该州的城市, 全部进入剩余池
    ///
    /// # 返回
    /// - 移出城市数量
    pub fn clear_state(
        &self,
        session: &mut ConfiguratorSession,
        zone_index: usize,
        state: &str,
    ) -> ZoneResult<usize> {
        let zone = editable_zone(session, zone_index)?;
        let (code, region) = (zone.code, zone.region());
        let removals: Vec<CityKey> = zone.cities_in_state(state).cloned().collect();

        for key in &removals {
            session.zones[zone_index].assigned_cities.remove(key);
            session
                .leftovers
                .entry(region)
                .or_default()
                .release(key.clone(), code);
        }

        tracing::debug!(zone = %code, state, removed = removals.len(), "州内城市清空");
        Ok(removals.len())
    }

    /// 记录区域当前聚焦的州（界面状态, 随快照持久化）
    pub fn set_active_state(
        &self,
        session: &mut ConfiguratorSession,
        zone_index: usize,
        state: &str,
    ) -> ZoneResult<()> {
        let zone = zone_at(session, zone_index)?;
        let (code, region) = (zone.code, zone.region());
        if !self.geo.has_state(region, state) {
            return Err(ZoneError::UnknownState {
                region,
                state: state.to_string(),
            });
        }
        session.active_states.insert(code, state.to_string());
        Ok(())
    }

    // ==========================================
    // 不变量校验
    // ==========================================

    /// 校验会话不变量（加载快照后 / 测试中使用）
    ///
    /// - 城市唯一归属
    /// - 区域城市属于区域所在大区
    /// - 剩余池中的城市未被任何区域占用
    /// - 区域编码不重复且按名单顺序排列
    pub fn verify_invariants(&self, session: &ConfiguratorSession) -> ZoneResult<()> {
        let mut owners: HashMap<&CityKey, &Zone> = HashMap::new();
        for zone in &session.zones {
            for key in &zone.assigned_cities {
                if let Some(previous) = owners.insert(key, zone) {
                    return Err(ZoneError::InvariantViolation(format!(
                        "城市 {} 同时属于 {} 与 {}",
                        key, previous.code, zone.code
                    )));
                }
                if !self.geo.contains(zone.region(), key) {
                    return Err(ZoneError::InvariantViolation(format!(
                        "城市 {} 不属于区域 {} 所在大区",
                        key, zone.code
                    )));
                }
            }
        }

        for (region, pool) in &session.leftovers {
            if let Some(key) = pool.keys().find(|k| owners.contains_key(k)) {
                return Err(ZoneError::InvariantViolation(format!(
                    "剩余池 {} 中的城市 {} 已被占用",
                    region, key
                )));
            }
        }

        if session.zones.windows(2).any(|w| w[0].code >= w[1].code) {
            return Err(ZoneError::InvariantViolation(
                "区域名单顺序错乱或存在重复编码".to_string(),
            ));
        }

        if let Some(matrix) = &session.price_matrix {
            if !matrix.is_well_formed() {
                return Err(ZoneError::InvariantViolation(
                    "价格矩阵尺寸与区域数量不一致".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ==========================================
// 辅助函数
// ==========================================

pub(crate) fn zone_at(session: &ConfiguratorSession, zone_index: usize) -> ZoneResult<&Zone> {
    session
        .zone(zone_index)
        .ok_or(ZoneError::ZoneNotFound(zone_index))
}

/// 可编辑区域: 划分阶段且未完成
fn editable_zone(session: &ConfiguratorSession, zone_index: usize) -> ZoneResult<&Zone> {
    ensure_partitioning(session)?;
    let zone = zone_at(session, zone_index)?;
    if zone.is_complete {
        return Err(ZoneError::ZoneLocked(zone.code));
    }
    Ok(zone)
}

/// 城市被认领后从所有剩余池移除（剩余池只保存无主城市）
fn claim_from_pools(session: &mut ConfiguratorSession, key: &CityKey) {
    for pool in session.leftovers.values_mut() {
        pool.claim(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geo::RawGeoRecord;
    use crate::domain::types::ZoneCode;
    use crate::engine::roster::ZoneRosterController;

    fn code(s: &str) -> ZoneCode {
        s.parse().unwrap()
    }

    fn north_geo() -> Arc<GeographyIndex> {
        let records = vec![
            RawGeoRecord::new("110001", "Delhi", "New Delhi", "N1"),
            RawGeoRecord::new("110085", "Delhi", "Rohini", "N1"),
            RawGeoRecord::new("143001", "Punjab", "Amritsar", "N2"),
            RawGeoRecord::new("141001", "Punjab", "Ludhiana", "N2"),
            RawGeoRecord::new("160017", "Chandigarh", "Chandigarh", "N3"),
            RawGeoRecord::new("560001", "Karnataka", "Bengaluru", "S1"),
        ];
        Arc::new(GeographyIndex::build(&records))
    }

    fn session_with(codes: &[&str]) -> ConfiguratorSession {
        let controller = ZoneRosterController::default();
        let mut session = ConfiguratorSession::new();
        for c in codes {
            controller.select_zone(&mut session, code(c)).unwrap();
        }
        session
    }

    #[test]
    fn test_toggle_round_trip_restores_zone() {
        let engine = PartitionEngine::new(north_geo());
        let mut session = session_with(&["N1"]);
        let delhi = CityKey::new("New Delhi", "Delhi");

        assert_eq!(engine.toggle_city(&mut session, 0, &delhi).unwrap(), ToggleOutcome::Added);
        let before = session.zones[0].assigned_cities.clone();

        assert_eq!(engine.toggle_city(&mut session, 0, &delhi).unwrap(), ToggleOutcome::Removed);
        let pool = session.leftover_pool(Region::North).unwrap();
        assert!(pool.sources(&delhi).unwrap().contains(&code("N1")));

        assert_eq!(engine.toggle_city(&mut session, 0, &delhi).unwrap(), ToggleOutcome::Added);
        assert_eq!(session.zones[0].assigned_cities, before);
        assert!(!session.leftover_pool(Region::North).unwrap().contains(&delhi));
        engine.verify_invariants(&session).unwrap();
    }

    #[test]
    fn test_toggle_rejects_city_owned_elsewhere() {
        let engine = PartitionEngine::new(north_geo());
        let mut session = session_with(&["N1", "N2"]);
        let amritsar = CityKey::new("Amritsar", "Punjab");
        engine.toggle_city(&mut session, 0, &amritsar).unwrap();

        let snapshot = session.clone();
        let err = engine.toggle_city(&mut session, 1, &amritsar).unwrap_err();
        assert_eq!(
            err,
            ZoneError::CityOwnedElsewhere {
                city: amritsar,
                owner: code("N1"),
            }
        );
        assert_eq!(session, snapshot);
    }

    #[test]
    fn test_toggle_rejects_city_outside_region() {
        let engine = PartitionEngine::new(north_geo());
        let mut session = session_with(&["N1"]);
        let err = engine
            .toggle_city(&mut session, 0, &CityKey::new("Bengaluru", "Karnataka"))
            .unwrap_err();
        assert!(matches!(err, ZoneError::CityNotInRegion { .. }));
        assert!(session.zones[0].is_empty());
    }

    #[test]
    fn test_available_includes_self_owned_excludes_others() {
        let engine = PartitionEngine::new(north_geo());
        let mut session = session_with(&["N1", "N2"]);
        engine.toggle_city(&mut session, 0, &CityKey::new("Amritsar", "Punjab")).unwrap();

        let for_n1 = engine.available_cities(&session, 0, "Punjab").unwrap();
        let for_n2 = engine.available_cities(&session, 1, "Punjab").unwrap();
        assert_eq!(for_n1.len(), 2);
        assert_eq!(for_n2.len(), 1);
        assert!(for_n2.contains(&CityKey::new("Ludhiana", "Punjab")));
    }

    #[test]
    fn test_state_hidden_once_exhausted_by_other_zone() {
        let engine = PartitionEngine::new(north_geo());
        let mut session = session_with(&["N1", "N2"]);
        assert_eq!(engine.select_all_for_state(&mut session, 0, "Delhi").unwrap(), 2);

        assert!(engine.state_visibility(&session, 0, "Delhi").unwrap());
        assert!(!engine.state_visibility(&session, 1, "Delhi").unwrap());
        assert_eq!(
            engine.visible_states(&session, 1).unwrap(),
            vec!["Chandigarh".to_string(), "Punjab".to_string()]
        );
    }

    #[test]
    fn test_select_all_picks_up_leftovers() {
        let engine = PartitionEngine::new(north_geo());
        let mut session = session_with(&["N1", "N2"]);
        engine.select_all_for_state(&mut session, 0, "Punjab").unwrap();
        let ludhiana = CityKey::new("Ludhiana", "Punjab");
        engine.toggle_city(&mut session, 0, &ludhiana).unwrap();
        assert_eq!(engine.leftover_cities(&session, 1, "Punjab").unwrap(), vec![ludhiana.clone()]);

        assert_eq!(engine.select_all_for_state(&mut session, 1, "Punjab").unwrap(), 1);
        assert!(session.zones[1].owns(&ludhiana));
        assert!(engine.leftover_cities(&session, 1, "Punjab").unwrap().is_empty());
        engine.verify_invariants(&session).unwrap();
    }

    #[test]
    fn test_clear_state_releases_into_pool() {
        let engine = PartitionEngine::new(north_geo());
        let mut session = session_with(&["N1"]);
        engine.select_all_for_state(&mut session, 0, "Delhi").unwrap();
        engine.select_all_for_state(&mut session, 0, "Punjab").unwrap();

        assert_eq!(engine.clear_state(&mut session, 0, "Delhi").unwrap(), 2);
        let states: Vec<String> = session.zones[0].derived_states().into_iter().collect();
        assert_eq!(states, vec!["Punjab".to_string()]);
        assert_eq!(session.leftover_pool(Region::North).unwrap().len(), 2);
    }

    #[test]
    fn test_complete_zone_is_locked() {
        let engine = PartitionEngine::new(north_geo());
        let mut session = session_with(&["N1"]);
        session.zones[0].is_complete = true;
        let err = engine
            .toggle_city(&mut session, 0, &CityKey::new("Rohini", "Delhi"))
            .unwrap_err();
        assert_eq!(err, ZoneError::ZoneLocked(code("N1")));
    }

    #[test]
    fn test_region_exhaustion_detection() {
        let engine = PartitionEngine::new(north_geo());
        let mut session = session_with(&["N1"]);
        for state in ["Delhi", "Punjab"] {
            engine.select_all_for_state(&mut session, 0, state).unwrap();
        }
        assert!(!engine.is_region_exhausted(&session, Region::North));
        assert!(engine.is_state_fully_assigned(&session, Region::North, "Punjab"));

        engine.select_all_for_state(&mut session, 0, "Chandigarh").unwrap();
        assert!(engine.is_region_exhausted(&session, Region::North));
        assert!(!engine.is_region_exhausted(&session, Region::South));
    }

    #[test]
    fn test_verify_detects_double_ownership() {
        let engine = PartitionEngine::new(north_geo());
        let mut session = session_with(&["N1", "N2"]);
        let key = CityKey::new("Rohini", "Delhi");
        session.zones[0].assigned_cities.insert(key.clone());
        session.zones[1].assigned_cities.insert(key);
        assert!(matches!(
            engine.verify_invariants(&session),
            Err(ZoneError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_unknown_state_rejected() {
        let engine = PartitionEngine::new(north_geo());
        let mut session = session_with(&["N1"]);
        assert!(matches!(
            engine.select_all_for_state(&mut session, 0, "Kerala"),
            Err(ZoneError::UnknownState { .. })
        ));
        assert!(engine.set_active_state(&mut session, 0, "Punjab").is_ok());
        assert_eq!(session.active_states.get(&code("N1")).map(String::as_str), Some("Punjab"));
    }
}
