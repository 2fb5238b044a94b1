// ==========================================
// 区域划分配置器 - 区域与剩余池实体
// ==========================================
// 红线: 同一 CityKey 在任意时刻最多归属一个区域
// 红线: 区域涉及的州 (derived states) 只能由城市集合推导, 不独立存储
// ==========================================

use crate::domain::types::{CityKey, Region, ZoneCode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// Zone - 区域
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ZoneRecord", from = "ZoneRecord")]
pub struct Zone {
    pub code: ZoneCode,
    pub assigned_cities: BTreeSet<CityKey>,
    pub is_complete: bool,
}

impl Zone {
    /// 新建空区域（可编辑）
    pub fn new(code: ZoneCode) -> Self {
        Self {
            code,
            assigned_cities: BTreeSet::new(),
            is_complete: false,
        }
    }

    pub fn region(&self) -> Region {
        self.code.region()
    }

    /// 由已分配城市推导出的州集合
    pub fn derived_states(&self) -> BTreeSet<String> {
        self.assigned_cities
            .iter()
            .map(|key| key.state().to_string())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned_cities.is_empty()
    }

    pub fn owns(&self, key: &CityKey) -> bool {
        self.assigned_cities.contains(key)
    }

    /// 该区域拥有的指定州城市
    pub fn cities_in_state<'a>(&'a self, state: &'a str) -> impl Iterator<Item = &'a CityKey> + 'a {
        self.assigned_cities
            .iter()
            .filter(move |key| key.state() == state)
    }
}

// ==========================================
// ZoneRecord - 区域快照格式
// ==========================================
// 外部快照字段: zoneCode / selectedStates / selectedCities / isComplete
// 反序列化时忽略 selectedStates, 由城市集合重新推导
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRecord {
    pub zone_code: ZoneCode,
    #[serde(default)]
    pub selected_states: Vec<String>,
    #[serde(default)]
    pub selected_cities: Vec<CityKey>,
    #[serde(default)]
    pub is_complete: bool,
}

impl From<Zone> for ZoneRecord {
    fn from(zone: Zone) -> Self {
        ZoneRecord {
            zone_code: zone.code,
            selected_states: zone.derived_states().into_iter().collect(),
            selected_cities: zone.assigned_cities.into_iter().collect(),
            is_complete: zone.is_complete,
        }
    }
}

impl From<ZoneRecord> for Zone {
    fn from(record: ZoneRecord) -> Self {
        Zone {
            code: record.zone_code,
            assigned_cities: record.selected_cities.into_iter().collect(),
            is_complete: record.is_complete,
        }
    }
}

// ==========================================
// LeftoverPool - 剩余池（按大区）
// ==========================================
// 多重映射: CityKey -> 释放该城市的区域集合
// 来源仅用于提示, 不决定归属
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeftoverPool {
    entries: BTreeMap<CityKey, BTreeSet<ZoneCode>>,
}

impl LeftoverPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// 城市进入剩余池（追加来源）
    pub fn release(&mut self, key: CityKey, source: ZoneCode) {
        self.entries.entry(key).or_default().insert(source);
    }

    /// 城市被认领, 无论来源如何均移出剩余池
    ///
    /// 返回该城市此前的来源集合
    pub fn claim(&mut self, key: &CityKey) -> Option<BTreeSet<ZoneCode>> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &CityKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn sources(&self, key: &CityKey) -> Option<&BTreeSet<ZoneCode>> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CityKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
