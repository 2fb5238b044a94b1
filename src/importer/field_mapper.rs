// ==========================================
// 区域划分配置器 - 字段映射器实现
// ==========================================
// 职责: 源列名（含别名, 不区分大小写）-> 输入契约字段
// ==========================================

use crate::domain::geo::RawGeoRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::geography_importer_trait::FieldMapper;
use std::collections::HashMap;

const PINCODE_ALIASES: &[&str] = &["pincode", "pin", "pin_code", "postal_code"];
const STATE_ALIASES: &[&str] = &["state", "state_name"];
const CITY_ALIASES: &[&str] = &["city", "city_name", "district"];
const ZONE_ALIASES: &[&str] = &["zone", "zone_code", "region"];

pub struct GeoFieldMapper;

impl FieldMapper for GeoFieldMapper {
    fn map_rows(&self, rows: &[HashMap<String, String>]) -> ImportResult<Vec<RawGeoRecord>> {
        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };

        let headers: Vec<&String> = first.keys().collect();
        let pincode = resolve_column(&headers, PINCODE_ALIASES, "pincode")?;
        let state = resolve_column(&headers, STATE_ALIASES, "state")?;
        let city = resolve_column(&headers, CITY_ALIASES, "city")?;
        let zone = resolve_column(&headers, ZONE_ALIASES, "zone")?;

        Ok(rows
            .iter()
            .map(|row| RawGeoRecord {
                pincode: get_string(row, &pincode),
                state: get_string(row, &state),
                city: get_string(row, &city),
                zone: get_string(row, &zone),
            })
            .collect())
    }
}

/// 在表头中查找字段的实际列名
fn resolve_column(headers: &[&String], aliases: &[&str], field: &str) -> ImportResult<String> {
    aliases
        .iter()
        .find_map(|alias| {
            headers
                .iter()
                .find(|h| normalize_header(h) == *alias)
                .map(|h| (*h).clone())
        })
        .ok_or_else(|| ImportError::MissingColumn(field.to_string()))
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace([' ', '-'], "_")
}

fn get_string(row: &HashMap<String, String>, column: &str) -> String {
    row.get(column).map(|v| v.trim().to_string()).unwrap_or_default()
}
