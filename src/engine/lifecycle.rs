// ==========================================
// 区域划分配置器 - 区域生命周期流程
// ==========================================
// 状态机: Editable -> Complete
//         Editable -> Deleted（大区耗尽且区域从未分配城市）
// 红线: 破坏性操作必须人工确认, 取消时会话完全回到提示前
// ==========================================
// 职责:
// 1. 保存校验（空区域拒绝 / 耗尽时提示删除）
// 2. 大区耗尽级联删除
// 3. 焦点导航与导航锁
// 4. 大区切换时清理剩余池
// 5. 定稿 -> 价格矩阵阶段
// ==========================================
// 约束: 只删除大区名单尾部的空区域, 名单始终保持目录前缀
// ==========================================

use crate::domain::matrix::PriceMatrix;
use crate::domain::session::ConfiguratorSession;
use crate::domain::types::{Region, SessionPhase, ZoneCode};
use crate::domain::zone::Zone;
use crate::engine::confirm::{ConfirmationHandler, ConfirmationPrompt};
use crate::engine::error::{ZoneError, ZoneResult};
use crate::engine::partition::{zone_at, PartitionEngine};
use crate::engine::price_matrix::PriceMatrixBuilder;
use crate::engine::roster::{detach_zone, ensure_partitioning};
use std::sync::Arc;

/// 保存结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// 区域已完成; cascade_deleted 为级联删除的空区域
    Completed {
        zone: ZoneCode,
        cascade_deleted: Vec<ZoneCode>,
    },
    /// 大区耗尽, 空区域经确认后删除
    Deleted { zone: ZoneCode },
    /// 操作员取消确认, 会话未变
    Cancelled,
}

/// 保存报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub outcome: SaveOutcome,
    /// 保存后的焦点区域（无区域时为 None）
    pub focus: Option<ZoneCode>,
    /// 全部区域已完成, 可进入价格矩阵
    pub ready_for_pricing: bool,
}

// ==========================================
// ZoneLifecycleWorkflow
// ==========================================
pub struct ZoneLifecycleWorkflow {
    partition: Arc<PartitionEngine>,
    matrix_builder: PriceMatrixBuilder,
}

impl ZoneLifecycleWorkflow {
    pub fn new(partition: Arc<PartitionEngine>) -> Self {
        Self {
            partition,
            matrix_builder: PriceMatrixBuilder::new(),
        }
    }

    // ==========================================
    // 保存
    // ==========================================

    /// 保存区域
    ///
    /// # 步骤
    /// 1. 空区域且大区仍有未认领城市 -> EmptyZone
    /// 2. 空区域且大区耗尽 -> 确认删除
    /// 3. 标记完成
    /// 4. 所涉州全部分配且大区耗尽 -> 确认级联删除其余空区域, 取消则整体回滚
    /// 5. 焦点移动到下一个未完成区域
    pub fn save_zone(
        &self,
        session: &mut ConfiguratorSession,
        zone_index: usize,
        confirm: &dyn ConfirmationHandler,
    ) -> ZoneResult<SaveReport> {
        ensure_partitioning(session)?;
        let zone = zone_at(session, zone_index)?;
        let (code, region) = (zone.code, zone.region());
        let from_region = focused_region(session);

        if zone.is_empty() {
            return self.save_empty_zone(session, zone_index, code, region, confirm);
        }

        let touched_states = zone.derived_states();
        let mut draft = session.clone();
        draft.zones[zone_index].is_complete = true;

        // === 步骤 4: 大区耗尽级联 ===
        let mut cascade_deleted = Vec::new();
        let states_exhausted = touched_states
            .iter()
            .all(|state| self.partition.is_state_fully_assigned(&draft, region, state));
        if states_exhausted && self.partition.is_region_exhausted(&draft, region) {
            let candidates = empty_tail(&draft, region);

            if !candidates.is_empty() {
                let prompt = ConfirmationPrompt::RegionExhausted {
                    region,
                    zones: candidates.clone(),
                };
                if !confirm.confirm(&prompt) {
                    tracing::info!(zone = %code, %region, "大区耗尽级联被取消, 保存回滚");
                    return Ok(self.cancelled(session));
                }
                for candidate in &candidates {
                    if let Some(index) = draft.index_of(candidate) {
                        detach_zone(&mut draft, index);
                    }
                }
                cascade_deleted = candidates;
            }
            clear_pool(&mut draft, region);
            tracing::info!(%region, deleted = cascade_deleted.len(), "大区已耗尽");
        }

        if draft.is_region_complete(region) {
            clear_pool(&mut draft, region);
        }

        // === 步骤 5: 导航 ===
        let saved_index = draft
            .index_of(&code)
            .ok_or_else(|| ZoneError::InvariantViolation(format!("保存后区域 {} 丢失", code)))?;
        let target = next_incomplete(&draft, saved_index, false).unwrap_or(saved_index);
        move_focus(&mut draft, from_region, target);

        tracing::info!(zone = %code, cascade = cascade_deleted.len(), "区域已保存");
        *session = draft;
        Ok(self.report(
            session,
            SaveOutcome::Completed {
                zone: code,
                cascade_deleted,
            },
        ))
    }

    fn save_empty_zone(
        &self,
        session: &mut ConfiguratorSession,
        zone_index: usize,
        code: ZoneCode,
        region: Region,
        confirm: &dyn ConfirmationHandler,
    ) -> ZoneResult<SaveReport> {
        if !self.partition.is_region_exhausted(session, region) {
            tracing::warn!(zone = %code, "空区域保存被拒绝");
            return Err(ZoneError::EmptyZone(code));
        }
        // 名单中间的空区域不可删除, 需重新分配城市
        if session.roster(region).last() != Some(&code) {
            tracing::warn!(zone = %code, %region, "空区域不在名单末尾, 拒绝删除");
            return Err(ZoneError::EmptyZone(code));
        }

        let prompt = ConfirmationPrompt::DeleteEmptyZone { zone: code };
        if !confirm.confirm(&prompt) {
            return Ok(self.cancelled(session));
        }

        let mut draft = session.clone();
        detach_zone(&mut draft, zone_index);
        if draft.is_region_complete(region) {
            clear_pool(&mut draft, region);
        }
        // 删除后原下标指向其后一个区域
        if let Some(target) = next_incomplete(&draft, zone_index, true) {
            move_focus(&mut draft, Some(region), target);
        }

        *session = draft;
        Ok(self.report(session, SaveOutcome::Deleted { zone: code }))
    }

    fn cancelled(&self, session: &ConfiguratorSession) -> SaveReport {
        self.report(session, SaveOutcome::Cancelled)
    }

    fn report(&self, session: &ConfiguratorSession, outcome: SaveOutcome) -> SaveReport {
        SaveReport {
            outcome,
            focus: session.zone(session.current_zone).map(|z| z.code),
            ready_for_pricing: session.all_zones_complete(),
        }
    }

    // ==========================================
    // 导航
    // ==========================================

    /// 导航锁: 目标在当前位置之前（含）, 或其前序区域全部完成
    pub fn can_open_zone(&self, session: &ConfiguratorSession, target: usize) -> bool {
        if target >= session.zones.len() {
            return false;
        }
        target <= session.current_zone || session.zones[..target].iter().all(|z| z.is_complete)
    }

    /// 打开区域（切换焦点）
    pub fn open_zone(&self, session: &mut ConfiguratorSession, target: usize) -> ZoneResult<()> {
        let code = zone_at(session, target)?.code;
        if !self.can_open_zone(session, target) {
            tracing::warn!(zone = %code, "区域导航被锁定");
            return Err(ZoneError::NavigationLocked(code));
        }
        move_focus(session, focused_region(session), target);
        Ok(())
    }

    /// 重新打开已完成区域（同样受导航锁约束）
    pub fn reopen_zone(&self, session: &mut ConfiguratorSession, zone_index: usize) -> ZoneResult<()> {
        ensure_partitioning(session)?;
        let code = zone_at(session, zone_index)?.code;
        if !self.can_open_zone(session, zone_index) {
            tracing::warn!(zone = %code, "区域导航被锁定, 无法重新打开");
            return Err(ZoneError::NavigationLocked(code));
        }
        session.zones[zone_index].is_complete = false;
        move_focus(session, focused_region(session), zone_index);
        tracing::info!(zone = %code, "区域已重新打开");
        Ok(())
    }

    // ==========================================
    // 定稿
    // ==========================================

    /// 区域划分定稿, 生成全空价格矩阵并进入价格阶段
    pub fn finalize_partition(&self, session: &mut ConfiguratorSession) -> ZoneResult<()> {
        ensure_partitioning(session)?;
        if let Some(pending) = session.zones.iter().find(|z| !z.is_complete) {
            return Err(ZoneError::NotReadyToFinalize(format!(
                "区域 {} 尚未完成",
                pending.code
            )));
        }
        let matrix: PriceMatrix = self.matrix_builder.build(&session.zones);
        if matrix.zones().is_empty() {
            return Err(ZoneError::NotReadyToFinalize(
                "没有已分配城市的区域".to_string(),
            ));
        }

        session.leftovers.clear();
        session.price_matrix = Some(matrix);
        session.phase = SessionPhase::Pricing;
        tracing::info!(zones = session.zones.len(), "区域划分已定稿");
        Ok(())
    }

    /// 返回区域划分阶段（保留矩阵直至再次定稿）
    pub fn reopen_partitioning(&self, session: &mut ConfiguratorSession) -> ZoneResult<()> {
        if session.phase != SessionPhase::Pricing {
            return Err(ZoneError::PhaseViolation {
                expected: SessionPhase::Pricing,
                actual: session.phase,
            });
        }
        session.phase = SessionPhase::Partitioning;
        tracing::info!("返回区域划分阶段");
        Ok(())
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 下一个未完成区域: 先向后找, 再向前找
///
/// include_current 为 true 时从 from 本身开始向后查找
pub fn next_incomplete(session: &ConfiguratorSession, from: usize, include_current: bool) -> Option<usize> {
    let start = if include_current { from } else { from + 1 };
    (start..session.zones.len())
        .chain(0..from.min(session.zones.len()))
        .find(|&i| !session.zones[i].is_complete)
}

/// 大区名单尾部的空区域（最后一个已分配城市的区域之后）
fn empty_tail(session: &ConfiguratorSession, region: Region) -> Vec<ZoneCode> {
    let roster: Vec<&Zone> = session.zones.iter().filter(|z| z.region() == region).collect();
    let start = roster.iter().rposition(|z| !z.is_empty()).map_or(0, |i| i + 1);
    roster[start..]
        .iter()
        .filter(|z| !z.is_complete)
        .map(|z| z.code)
        .collect()
}

fn focused_region(session: &ConfiguratorSession) -> Option<Region> {
    session.zone(session.current_zone).map(|z| z.region())
}

/// 切换焦点; 离开的大区若已全部完成则清理其剩余池
///
/// from_region 由调用方在删除区域之前取得
fn move_focus(session: &mut ConfiguratorSession, from_region: Option<Region>, target: usize) {
    session.current_zone = target;
    let to_region = session.zone(target).map(|z| z.region());

    if let Some(from_region) = from_region {
        if Some(from_region) != to_region && session.is_region_complete(from_region) {
            clear_pool(session, from_region);
        }
    }
}

fn clear_pool(session: &mut ConfiguratorSession, region: Region) {
    if let Some(pool) = session.leftovers.get_mut(&region) {
        if !pool.is_empty() {
            tracing::debug!(%region, cleared = pool.len(), "剩余池已清理");
        }
        pool.clear();
    }
}
