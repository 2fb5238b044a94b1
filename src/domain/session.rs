// ==========================================
// 区域划分配置器 - 会话实体
// ==========================================
// 单一、显式、带版本的会话值:
// 区域名单 + 区域城市 + 剩余池 + 界面焦点 + 价格矩阵
// 每次变更整体替换, 不存在部分保存
// ==========================================

use crate::domain::matrix::{PriceMatrix, PriceMatrixEntry};
use crate::domain::types::{Region, SessionPhase, ZoneCode};
use crate::domain::zone::{LeftoverPool, Zone, ZoneRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 会话快照格式版本
pub const SESSION_SCHEMA_VERSION: u32 = 1;

// ==========================================
// ConfiguratorSession - 配置会话
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguratorSession {
    pub schema_version: u32,
    /// 每次提交递增
    pub revision: u64,
    pub phase: SessionPhase,
    /// 区域列表, 始终按 (大区, 槽位) 排序 = 名单顺序
    pub zones: Vec<Zone>,
    /// 各大区剩余池
    #[serde(default)]
    pub leftovers: BTreeMap<Region, LeftoverPool>,
    /// 各区域当前聚焦的州（界面状态）
    #[serde(default)]
    pub active_states: BTreeMap<ZoneCode, String>,
    /// 当前聚焦区域下标
    #[serde(default)]
    pub current_zone: usize,
    #[serde(default)]
    pub price_matrix: Option<PriceMatrix>,
}

impl Default for ConfiguratorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfiguratorSession {
    pub fn new() -> Self {
        Self {
            schema_version: SESSION_SCHEMA_VERSION,
            revision: 0,
            phase: SessionPhase::Partitioning,
            zones: Vec::new(),
            leftovers: BTreeMap::new(),
            active_states: BTreeMap::new(),
            current_zone: 0,
            price_matrix: None,
        }
    }

    pub fn zone(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    pub fn index_of(&self, code: &ZoneCode) -> Option<usize> {
        self.zones.iter().position(|z| z.code == *code)
    }

    /// 指定大区已选区域编码（名单顺序）
    pub fn roster(&self, region: Region) -> Vec<ZoneCode> {
        self.zones
            .iter()
            .filter(|z| z.region() == region)
            .map(|z| z.code)
            .collect()
    }

    /// 指定大区的区域下标
    pub fn zone_indices(&self, region: Region) -> Vec<usize> {
        self.zones
            .iter()
            .enumerate()
            .filter(|(_, z)| z.region() == region)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn leftover_pool(&self, region: Region) -> Option<&LeftoverPool> {
        self.leftovers.get(&region)
    }

    /// 大区内已选区域全部完成（无已选区域时为 false）
    pub fn is_region_complete(&self, region: Region) -> bool {
        let mut zones = self.zones.iter().filter(|z| z.region() == region).peekable();
        zones.peek().is_some() && zones.all(|z| z.is_complete)
    }

    pub fn all_zones_complete(&self) -> bool {
        !self.zones.is_empty() && self.zones.iter().all(|z| z.is_complete)
    }

    /// 进入下一修订号
    pub fn bump_revision(&mut self) {
        self.revision += 1;
    }

    /// 交接给入驻表单的最终载荷
    pub fn to_handoff(&self) -> OnboardingHandoff {
        OnboardingHandoff {
            zones: self.zones.iter().cloned().map(ZoneRecord::from).collect(),
            price_matrix: self
                .price_matrix
                .as_ref()
                .map(|m| m.entries())
                .unwrap_or_default(),
        }
    }
}

// ==========================================
// OnboardingHandoff - 最终交接载荷
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingHandoff {
    pub zones: Vec<ZoneRecord>,
    pub price_matrix: Vec<PriceMatrixEntry>,
}
