// ==========================================
// 区域划分配置器 - 区域名单控制器
// ==========================================
// 职责: 维护按大区分组的已选区域编码
// 规则 (STRICT): 只能追加目录中的下一个槽位, 只能移除最后选择的槽位
// 保证: 任意时刻每个大区的名单都是目录的前缀
// ==========================================
// 注: 顺序规则是业务策略, 由守卫函数实现, 与城市唯一归属红线解耦
// ==========================================

use crate::domain::session::ConfiguratorSession;
use crate::domain::types::{catalogue_size, OrderingPolicy, Region, SessionPhase, ZoneCode};
use crate::domain::zone::Zone;
use crate::engine::error::{ZoneError, ZoneResult};

// ==========================================
// 顺序守卫
// ==========================================

/// 选择守卫
///
/// # 参数
/// - selected: 该大区已选编码
/// - code: 待选择编码
pub fn check_select(policy: OrderingPolicy, selected: &[ZoneCode], code: ZoneCode) -> ZoneResult<()> {
    if selected.contains(&code) {
        return Err(ZoneError::AlreadySelected(code));
    }
    match policy {
        OrderingPolicy::Relaxed => Ok(()),
        OrderingPolicy::Strict => {
            let expected = code
                .region()
                .catalogue()
                .into_iter()
                .find(|slot| !selected.contains(slot));
            if expected == Some(code) {
                Ok(())
            } else {
                Err(ZoneError::SelectOrderViolation { code, expected })
            }
        }
    }
}

/// 移除守卫
pub fn check_deselect(policy: OrderingPolicy, selected: &[ZoneCode], code: ZoneCode) -> ZoneResult<()> {
    if !selected.contains(&code) {
        return Err(ZoneError::NotSelected(code));
    }
    match policy {
        OrderingPolicy::Relaxed => Ok(()),
        OrderingPolicy::Strict => {
            let last = selected.iter().max().copied();
            if last == Some(code) {
                Ok(())
            } else {
                Err(ZoneError::DeselectOrderViolation { code, last })
            }
        }
    }
}

/// 大区名单是否为目录前缀
pub fn is_catalogue_prefix(session: &ConfiguratorSession, region: Region) -> bool {
    let roster = session.roster(region);
    let catalogue = region.catalogue();
    roster.len() <= catalogue.len() && roster[..] == catalogue[..roster.len()]
}

pub(crate) fn ensure_partitioning(session: &ConfiguratorSession) -> ZoneResult<()> {
    if session.phase != SessionPhase::Partitioning {
        return Err(ZoneError::PhaseViolation {
            expected: SessionPhase::Partitioning,
            actual: session.phase,
        });
    }
    Ok(())
}

/// 从会话中摘除区域
///
/// 区域城市随之释放为可分配; 剩余池中以其为来源的条目保持不变
pub(crate) fn detach_zone(session: &mut ConfiguratorSession, index: usize) -> Zone {
    let zone = session.zones.remove(index);
    session.active_states.remove(&zone.code);

    if index < session.current_zone {
        session.current_zone -= 1;
    }
    if session.current_zone >= session.zones.len() {
        session.current_zone = session.zones.len().saturating_sub(1);
    }

    tracing::info!(
        zone = %zone.code,
        released_cities = zone.assigned_cities.len(),
        "区域已删除"
    );
    zone
}

// ==========================================
// ZoneRosterController
// ==========================================
#[derive(Debug, Clone)]
pub struct ZoneRosterController {
    policy: OrderingPolicy,
    max_zones: usize,
}

impl Default for ZoneRosterController {
    fn default() -> Self {
        Self::new(OrderingPolicy::Strict, catalogue_size())
    }
}

impl ZoneRosterController {
    pub fn new(policy: OrderingPolicy, max_zones: usize) -> Self {
        Self {
            policy,
            max_zones: max_zones.min(catalogue_size()),
        }
    }

    pub fn policy(&self) -> OrderingPolicy {
        self.policy
    }

    /// 选择区域, 并在划分引擎中生成空区域
    pub fn select_zone(&self, session: &mut ConfiguratorSession, code: ZoneCode) -> ZoneResult<()> {
        ensure_partitioning(session)?;
        check_select(self.policy, &session.roster(code.region()), code)?;
        if session.zones.len() >= self.max_zones {
            return Err(ZoneError::ZoneLimitReached {
                max: self.max_zones,
            });
        }

        let position = session
            .zones
            .iter()
            .position(|z| z.code > code)
            .unwrap_or(session.zones.len());
        let had_zones = !session.zones.is_empty();
        session.zones.insert(position, Zone::new(code));
        if had_zones && position <= session.current_zone {
            session.current_zone += 1;
        }

        tracing::info!(zone = %code, position, "区域已选择");
        Ok(())
    }

    /// 移除区域（删除其 Zone, 城市释放为可分配）
    pub fn deselect_zone(&self, session: &mut ConfiguratorSession, code: ZoneCode) -> ZoneResult<()> {
        ensure_partitioning(session)?;
        check_deselect(self.policy, &session.roster(code.region()), code)?;

        let index = session
            .index_of(&code)
            .ok_or(ZoneError::NotSelected(code))?;
        detach_zone(session, index);
        Ok(())
    }

    /// 批量选择: 逐个推进槽位, 遇到第一次违反即停止
    ///
    /// # 返回
    /// - 本次新增的区域编码
    pub fn select_all_in_region(
        &self,
        session: &mut ConfiguratorSession,
        region: Region,
    ) -> ZoneResult<Vec<ZoneCode>> {
        ensure_partitioning(session)?;
        let mut added = Vec::new();

        for code in region.catalogue() {
            if session.index_of(&code).is_some() {
                continue;
            }
            match self.select_zone(session, code) {
                Ok(()) => added.push(code),
                Err(e) => {
                    tracing::warn!(zone = %code, error = %e, "批量选择提前停止");
                    break;
                }
            }
        }
        Ok(added)
    }

    /// 批量移除: 从最后选择的区域开始逆序移除, 遇到第一次违反即停止
    pub fn deselect_all_in_region(
        &self,
        session: &mut ConfiguratorSession,
        region: Region,
    ) -> ZoneResult<Vec<ZoneCode>> {
        ensure_partitioning(session)?;
        let mut removed = Vec::new();

        for code in session.roster(region).into_iter().rev() {
            match self.deselect_zone(session, code) {
                Ok(()) => removed.push(code),
                Err(e) => {
                    tracing::warn!(zone = %code, error = %e, "批量移除提前停止");
                    break;
                }
            }
        }
        Ok(removed)
    }
}
