// ==========================================
// 区域划分配置器 - 地理数据实体
// ==========================================
// RawGeoRecord: 外部地理数据源的原始记录（输入契约）
// GeoRecord: 清洗后的不可变记录
// ==========================================

use crate::domain::types::{CityKey, Region};
use serde::{Deserialize, Serialize};

/// 原始地理记录
///
/// zone 字段仅用于推导粗粒度大区,本身不是划分边界
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGeoRecord {
    pub pincode: String,
    pub state: String,
    pub city: String,
    pub zone: String,
}

impl RawGeoRecord {
    pub fn new(pincode: &str, state: &str, city: &str, zone: &str) -> Self {
        Self {
            pincode: pincode.to_string(),
            state: state.to_string(),
            city: city.to_string(),
            zone: zone.to_string(),
        }
    }
}

/// 清洗后的地理记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRecord {
    pub pincode: String,
    pub state: String,
    pub city: String,
    pub region: Region,
}

impl GeoRecord {
    pub fn city_key(&self) -> CityKey {
        CityKey::new(&self.city, &self.state)
    }
}
