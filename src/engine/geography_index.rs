// ==========================================
// 区域划分配置器 - 地理索引
// ==========================================
// 输入: 原始地理记录列表
// 输出: 大区 -> 州 -> 城市键集合, 邮编 -> 记录
// 红线: 构建后只读, 纯函数
// ==========================================

use crate::domain::geo::{GeoRecord, RawGeoRecord};
use crate::domain::types::{CityKey, Region};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// 默认占位值（州/城市字段出现时视为缺失）
pub const DEFAULT_PLACEHOLDER_TOKENS: &[&str] =
    &["", "na", "n/a", "-", "null", "undefined", "#n/a", "none"];

static EMPTY_CITIES: BTreeSet<CityKey> = BTreeSet::new();

// ==========================================
// GeographyIndex
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct GeographyIndex {
    by_region: BTreeMap<Region, BTreeMap<String, BTreeSet<CityKey>>>,
    by_pincode: HashMap<String, GeoRecord>,
    accepted: usize,
    skipped: usize,
}

impl GeographyIndex {
    /// 使用默认占位值构建索引
    pub fn build(records: &[RawGeoRecord]) -> Self {
        let tokens: Vec<String> = DEFAULT_PLACEHOLDER_TOKENS
            .iter()
            .map(|t| t.to_string())
            .collect();
        Self::build_with_placeholders(records, &tokens)
    }

    /// 构建索引
    ///
    /// # 过滤规则
    /// - 州/城市为空或为占位值
    /// - 邮编不是 6 位数字
    /// - zone 标签无法推导大区
    pub fn build_with_placeholders(records: &[RawGeoRecord], placeholders: &[String]) -> Self {
        let mut index = GeographyIndex::default();

        for raw in records {
            match clean_record(raw, placeholders) {
                Some(record) => {
                    index
                        .by_region
                        .entry(record.region)
                        .or_default()
                        .entry(record.state.clone())
                        .or_default()
                        .insert(record.city_key());
                    // 同一邮编以首条有效记录为准
                    index
                        .by_pincode
                        .entry(record.pincode.clone())
                        .or_insert(record);
                    index.accepted += 1;
                }
                None => index.skipped += 1,
            }
        }

        tracing::info!(
            accepted = index.accepted,
            skipped = index.skipped,
            pincodes = index.by_pincode.len(),
            "地理索引构建完成"
        );
        index
    }

    /// 大区内某州的全部城市
    pub fn cities_of(&self, region: Region, state: &str) -> &BTreeSet<CityKey> {
        self.by_region
            .get(&region)
            .and_then(|states| states.get(state))
            .unwrap_or(&EMPTY_CITIES)
    }

    pub fn by_pincode(&self, pincode: &str) -> Option<&GeoRecord> {
        self.by_pincode.get(pincode.trim())
    }

    /// 大区内的州（展示顺序）
    pub fn states_of(&self, region: Region) -> Vec<String> {
        let mut states: Vec<String> = self
            .by_region
            .get(&region)
            .map(|states| states.keys().cloned().collect())
            .unwrap_or_default();
        sort_state_names(&mut states);
        states
    }

    pub fn has_state(&self, region: Region, state: &str) -> bool {
        self.by_region
            .get(&region)
            .is_some_and(|states| states.contains_key(state))
    }

    /// 大区内全部城市
    pub fn region_cities(&self, region: Region) -> BTreeSet<CityKey> {
        self.by_region
            .get(&region)
            .map(|states| states.values().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// 城市是否属于该大区
    pub fn contains(&self, region: Region, key: &CityKey) -> bool {
        self.cities_of(region, key.state()).contains(key)
    }

    /// 数据中出现的大区
    pub fn regions(&self) -> Vec<Region> {
        self.by_region.keys().copied().collect()
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.by_region.is_empty()
    }
}

fn is_placeholder(value: &str, placeholders: &[String]) -> bool {
    let normalized = value.trim().to_lowercase();
    normalized.is_empty() || placeholders.iter().any(|p| p.trim().to_lowercase() == normalized)
}

fn is_valid_pincode(pincode: &str) -> bool {
    pincode.len() == 6 && pincode.bytes().all(|b| b.is_ascii_digit())
}

fn clean_record(raw: &RawGeoRecord, placeholders: &[String]) -> Option<GeoRecord> {
    let pincode = raw.pincode.trim();
    if !is_valid_pincode(pincode) {
        return None;
    }
    if is_placeholder(&raw.state, placeholders) || is_placeholder(&raw.city, placeholders) {
        return None;
    }
    let region = Region::from_zone_tag(&raw.zone)?;

    Some(GeoRecord {
        pincode: pincode.to_string(),
        state: raw.state.trim().to_string(),
        city: raw.city.trim().to_string(),
        region,
    })
}

// ==========================================
// 展示排序
// ==========================================

/// 州名排序: 不区分大小写字典序
pub fn sort_state_names(states: &mut [String]) {
    states.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
}

/// 城市排序: 城市名不区分大小写字典序, 同名按州名
pub fn sort_city_keys(keys: &mut [CityKey]) {
    keys.sort_by(|a, b| {
        a.city()
            .to_lowercase()
            .cmp(&b.city().to_lowercase())
            .then_with(|| a.state().to_lowercase().cmp(&b.state().to_lowercase()))
            .then_with(|| a.cmp(b))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pin: &str, state: &str, city: &str, zone: &str) -> RawGeoRecord {
        RawGeoRecord::new(pin, state, city, zone)
    }

    #[test]
    fn test_build_filters_invalid_rows() {
        let records = vec![
            raw("110001", "Delhi", "New Delhi", "N1"),
            raw("11001", "Delhi", "Short Pin", "N1"),
            raw("11000A", "Delhi", "Alpha Pin", "N1"),
            raw("110002", "NA", "Nowhere", "N1"),
            raw("110003", "Delhi", "  ", "N1"),
            raw("110004", "Delhi", "undefined", "N1"),
            raw("110005", "Delhi", "Unknown Zone", "Z1"),
            raw("781001", "Assam", "Guwahati", "NE1"),
        ];
        let index = GeographyIndex::build(&records);

        assert_eq!(index.accepted(), 2);
        assert_eq!(index.skipped(), 6);
        assert_eq!(index.cities_of(Region::North, "Delhi").len(), 1);
        assert_eq!(index.cities_of(Region::Northeast, "Assam").len(), 1);
        assert!(index.cities_of(Region::North, "Assam").is_empty());
        assert_eq!(index.regions(), vec![Region::North, Region::Northeast]);
    }

    #[test]
    fn test_same_city_name_in_two_states_is_distinct() {
        let records = vec![
            raw("824101", "Bihar", "Aurangabad", "E1"),
            raw("431001", "Maharashtra", "Aurangabad", "W1"),
            raw("431002", "Maharashtra", "Aurangabad", "W2"),
        ];
        let index = GeographyIndex::build(&records);

        let east = index.region_cities(Region::East);
        let west = index.region_cities(Region::West);
        assert_eq!(east.len(), 1);
        assert_eq!(west.len(), 1);
        assert_ne!(east.iter().next(), west.iter().next());
    }

    #[test]
    fn test_by_pincode_lookup() {
        let records = vec![
            raw("560001", "Karnataka", "Bengaluru", "S1"),
            raw("560001", "Karnataka", "Duplicate", "S1"),
        ];
        let index = GeographyIndex::build(&records);

        let record = index.by_pincode(" 560001 ").unwrap();
        assert_eq!(record.city, "Bengaluru");
        assert_eq!(record.region, Region::South);
        assert!(index.by_pincode("999999").is_none());
    }

    #[test]
    fn test_display_ordering_is_case_insensitive() {
        let mut states = vec!["kerala".to_string(), "Andhra Pradesh".to_string(), "Goa".to_string()];
        sort_state_names(&mut states);
        assert_eq!(states, vec!["Andhra Pradesh", "Goa", "kerala"]);

        let mut keys = vec![
            CityKey::new("salem", "Tamil Nadu"),
            CityKey::new("Aurangabad", "Maharashtra"),
            CityKey::new("Aurangabad", "Bihar"),
        ];
        sort_city_keys(&mut keys);
        assert_eq!(keys[0], CityKey::new("Aurangabad", "Bihar"));
        assert_eq!(keys[1], CityKey::new("Aurangabad", "Maharashtra"));
        assert_eq!(keys[2], CityKey::new("salem", "Tamil Nadu"));
    }
}
