// ==========================================
// 区域划分配置器 - 领域类型定义
// ==========================================
// 区域 (Region) / 区域编码 (ZoneCode) / 城市键 (CityKey)
// 红线: 区域编码只能来自固定目录,不得自造
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 大区 (Region)
// ==========================================
// 顺序即界面展示顺序: North < South < East < West < Northeast < Central
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    North,
    South,
    East,
    West,
    Northeast,
    Central,
}

impl Region {
    /// 全部大区（固定顺序）
    pub const ALL: [Region; 6] = [
        Region::North,
        Region::South,
        Region::East,
        Region::West,
        Region::Northeast,
        Region::Central,
    ];

    /// 区域编码前缀
    pub fn prefix(&self) -> &'static str {
        match self {
            Region::North => "N",
            Region::South => "S",
            Region::East => "E",
            Region::West => "W",
            Region::Northeast => "NE",
            Region::Central => "C",
        }
    }

    /// 该大区可配置的区域槽位数量
    pub fn slot_count(&self) -> usize {
        match self {
            Region::North | Region::South => 6,
            Region::East | Region::West | Region::Northeast | Region::Central => 4,
        }
    }

    /// 该大区的固定区域编码目录（按槽位顺序）
    pub fn catalogue(&self) -> Vec<ZoneCode> {
        (0..self.slot_count())
            .map(|slot| ZoneCode {
                region: *self,
                slot,
            })
            .collect()
    }

    /// 从地理数据的 zone 标签推导大区
    ///
    /// 规则: 去空白并转大写后, "NE" 前缀优先识别为 Northeast,
    /// 否则按首字母 N/S/E/W/C 判定。无法识别返回 None。
    pub fn from_zone_tag(tag: &str) -> Option<Region> {
        let tag = tag.trim().to_uppercase();
        if tag.starts_with("NE") {
            return Some(Region::Northeast);
        }
        match tag.chars().next()? {
            'N' => Some(Region::North),
            'S' => Some(Region::South),
            'E' => Some(Region::East),
            'W' => Some(Region::West),
            'C' => Some(Region::Central),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::North => write!(f, "NORTH"),
            Region::South => write!(f, "SOUTH"),
            Region::East => write!(f, "EAST"),
            Region::West => write!(f, "WEST"),
            Region::Northeast => write!(f, "NORTHEAST"),
            Region::Central => write!(f, "CENTRAL"),
        }
    }
}

/// 目录中全部区域槽位数（所有大区之和）
pub fn catalogue_size() -> usize {
    Region::ALL.iter().map(|r| r.slot_count()).sum()
}

// ==========================================
// 区域编码 (Zone Code)
// ==========================================
// 例: N1, S3, NE2; slot 从 0 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneCode {
    region: Region,
    slot: usize,
}

impl ZoneCode {
    /// 按大区和槽位创建（槽位越界返回 None）
    pub fn new(region: Region, slot: usize) -> Option<Self> {
        if slot < region.slot_count() {
            Some(Self { region, slot })
        } else {
            None
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// 目录内槽位（0 起）
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl fmt::Display for ZoneCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.region.prefix(), self.slot + 1)
    }
}

/// 区域编码解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("未知的区域编码: {0}")]
pub struct UnknownZoneCode(pub String);

impl FromStr for ZoneCode {
    type Err = UnknownZoneCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_uppercase();
        // NE 必须先于 N 判定
        let (region, rest) = if let Some(rest) = raw.strip_prefix("NE") {
            (Region::Northeast, rest)
        } else {
            let region = Region::ALL
                .iter()
                .copied()
                .filter(|r| *r != Region::Northeast)
                .find(|r| raw.starts_with(r.prefix()))
                .ok_or_else(|| UnknownZoneCode(s.to_string()))?;
            (region, &raw[region.prefix().len()..])
        };

        // 仅接受无前导零的十进制槽位号
        if rest.is_empty() || rest.starts_with('0') || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(UnknownZoneCode(s.to_string()));
        }
        let number: usize = rest
            .parse()
            .map_err(|_| UnknownZoneCode(s.to_string()))?;
        ZoneCode::new(region, number - 1).ok_or_else(|| UnknownZoneCode(s.to_string()))
    }
}

impl Serialize for ZoneCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ZoneCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ==========================================
// 城市键 (City Key)
// ==========================================
// 格式: "{city}||{state}", 同名城市在不同州视为不同城市
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityKey(String);

pub const CITY_KEY_SEPARATOR: &str = "||";

impl CityKey {
    pub fn new(city: &str, state: &str) -> Self {
        CityKey(format!("{}{}{}", city.trim(), CITY_KEY_SEPARATOR, state.trim()))
    }

    pub fn city(&self) -> &str {
        self.0
            .split_once(CITY_KEY_SEPARATOR)
            .map(|(city, _)| city)
            .unwrap_or(&self.0)
    }

    pub fn state(&self) -> &str {
        self.0
            .split_once(CITY_KEY_SEPARATOR)
            .map(|(_, state)| state)
            .unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// 区域选择顺序策略 (Ordering Policy)
// ==========================================
// STRICT: 只能追加下一个槽位 / 只能移除最后一个槽位
// RELAXED: 目录内任意槽位均可选择/移除（不影响城市唯一归属红线）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderingPolicy {
    #[default]
    Strict,
    Relaxed,
}

impl fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderingPolicy::Strict => write!(f, "STRICT"),
            OrderingPolicy::Relaxed => write!(f, "RELAXED"),
        }
    }
}

// ==========================================
// 会话阶段 (Session Phase)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    #[default]
    Partitioning, // 区域划分中
    Pricing,      // 价格矩阵录入中
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Partitioning => write!(f, "PARTITIONING"),
            SessionPhase::Pricing => write!(f, "PRICING"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_has_28_slots() {
        assert_eq!(catalogue_size(), 28);
        let north: Vec<String> = Region::North.catalogue().iter().map(|c| c.to_string()).collect();
        assert_eq!(north, vec!["N1", "N2", "N3", "N4", "N5", "N6"]);
    }

    #[test]
    fn test_zone_code_parse() {
        let ne2: ZoneCode = "ne2".parse().unwrap();
        assert_eq!(ne2.region(), Region::Northeast);
        assert_eq!(ne2.slot(), 1);
        assert_eq!(ne2.to_string(), "NE2");

        let n1: ZoneCode = " N1 ".parse().unwrap();
        assert_eq!(n1.region(), Region::North);

        assert!("N7".parse::<ZoneCode>().is_err());
        assert!("E5".parse::<ZoneCode>().is_err());
        assert!("N0".parse::<ZoneCode>().is_err());
        assert!("X1".parse::<ZoneCode>().is_err());
        assert!("".parse::<ZoneCode>().is_err());
    }

    #[test]
    fn test_zone_code_rejects_padded_or_signed_slot() {
        for raw in ["N01", "S+1", "NE-1", "E 1", "C1x", "W"] {
            assert!(raw.parse::<ZoneCode>().is_err(), "{} should be rejected", raw);
        }
        assert_eq!("n6".parse::<ZoneCode>().unwrap().to_string(), "N6");
    }

    #[test]
    fn test_zone_code_serde_as_string() {
        let code: ZoneCode = "S3".parse().unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"S3\"");
        let back: ZoneCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }

    #[test]
    fn test_region_from_zone_tag() {
        assert_eq!(Region::from_zone_tag("NE1"), Some(Region::Northeast));
        assert_eq!(Region::from_zone_tag("n2"), Some(Region::North));
        assert_eq!(Region::from_zone_tag(" C1"), Some(Region::Central));
        assert_eq!(Region::from_zone_tag("Z9"), None);
        assert_eq!(Region::from_zone_tag(""), None);
    }

    #[test]
    fn test_city_key_parts() {
        let key = CityKey::new("Aurangabad", "Bihar");
        assert_eq!(key.as_str(), "Aurangabad||Bihar");
        assert_eq!(key.city(), "Aurangabad");
        assert_eq!(key.state(), "Bihar");
        assert_ne!(key, CityKey::new("Aurangabad", "Maharashtra"));
    }
}
