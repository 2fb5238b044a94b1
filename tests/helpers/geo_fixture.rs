// ==========================================
// 地理数据测试夹具
// ==========================================
// North: Delhi(2) / Punjab(2) / Haryana(1)
// South: Kerala(2) / Karnataka(1)
// East:  West Bengal(1)
// ==========================================

use freight_zone_config::domain::geo::RawGeoRecord;
use freight_zone_config::domain::types::{CityKey, ZoneCode};
use freight_zone_config::importer::InMemoryGeographySource;

/// 地理记录构建器
#[derive(Default)]
pub struct GeoFixtureBuilder {
    records: Vec<RawGeoRecord>,
}

impl GeoFixtureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn city(mut self, pincode: &str, state: &str, city: &str, zone: &str) -> Self {
        self.records.push(RawGeoRecord::new(pincode, state, city, zone));
        self
    }

    pub fn records(self) -> Vec<RawGeoRecord> {
        self.records
    }

    pub fn source(self) -> InMemoryGeographySource {
        InMemoryGeographySource::new(self.records)
    }
}

/// 标准测试地理数据
pub fn standard_geography() -> GeoFixtureBuilder {
    GeoFixtureBuilder::new()
        .city("110001", "Delhi", "New Delhi", "N1")
        .city("110075", "Delhi", "Dwarka", "N1")
        .city("143001", "Punjab", "Amritsar", "N2")
        .city("141001", "Punjab", "Ludhiana", "N2")
        .city("122001", "Haryana", "Gurugram", "N3")
        .city("682001", "Kerala", "Kochi", "S1")
        .city("695001", "Kerala", "Thiruvananthapuram", "S2")
        .city("560001", "Karnataka", "Bengaluru", "S3")
        .city("700001", "West Bengal", "Kolkata", "E1")
}

pub fn code(s: &str) -> ZoneCode {
    s.parse().unwrap()
}

pub fn city(name: &str, state: &str) -> CityKey {
    CityKey::new(name, state)
}
