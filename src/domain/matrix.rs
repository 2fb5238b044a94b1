// ==========================================
// 区域划分配置器 - 价格矩阵实体
// ==========================================
// 价格范围: [0, 999], 最多 3 位小数
// 存储: 千分位整数, 保证导出/导入往返精确一致
// ==========================================

use crate::domain::types::ZoneCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 价格上限（千分位）
pub const PRICE_MAX_MILLIS: u32 = 999_000;

/// 价格精度（千分位）
const MILLIS_PER_UNIT: u32 = 1_000;

/// 价格校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceError {
    #[error("价格不是数字: {0}")]
    NotNumeric(String),

    #[error("价格超出范围 [0, 999]: {0}")]
    OutOfRange(f64),

    #[error("价格小数位超过 3 位: {0}")]
    TooManyDecimals(f64),
}

// ==========================================
// Price - 价格值对象
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct Price(u32);

impl Price {
    pub fn from_millis(millis: u32) -> Option<Self> {
        if millis <= PRICE_MAX_MILLIS {
            Some(Price(millis))
        } else {
            None
        }
    }

    pub fn millis(&self) -> u32 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / f64::from(MILLIS_PER_UNIT)
    }

    /// 解析单元格文本（去空白后按十进制数解析）
    pub fn parse(raw: &str) -> Result<Self, PriceError> {
        let trimmed = raw.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| PriceError::NotNumeric(trimmed.to_string()))?;
        Price::try_from(value)
    }
}

impl TryFrom<f64> for Price {
    type Error = PriceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(PriceError::NotNumeric(value.to_string()));
        }
        if !(0.0..=999.0).contains(&value) {
            return Err(PriceError::OutOfRange(value));
        }
        let scaled = value * f64::from(MILLIS_PER_UNIT);
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-6 {
            return Err(PriceError::TooManyDecimals(value));
        }
        Price::from_millis(rounded as u32).ok_or(PriceError::OutOfRange(value))
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.as_f64()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / MILLIS_PER_UNIT;
        let frac = self.0 % MILLIS_PER_UNIT;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            let digits = format!("{:03}", frac);
            write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
        }
    }
}

// ==========================================
// PriceMatrixEntry - 价格矩阵条目（交接格式）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceMatrixEntry {
    pub from_zone: ZoneCode,
    pub to_zone: ZoneCode,
    pub price: Option<Price>,
}

// ==========================================
// PriceMatrix - 区域 × 区域价格表
// ==========================================
// 不假设对称: (A,B) 与 (B,A) 独立
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceMatrix {
    zones: Vec<ZoneCode>,
    cells: Vec<Vec<Option<Price>>>,
}

impl PriceMatrix {
    /// 创建全空矩阵（含自身到自身）
    pub fn new(zones: Vec<ZoneCode>) -> Self {
        let n = zones.len();
        Self {
            zones,
            cells: vec![vec![None; n]; n],
        }
    }

    pub fn zones(&self) -> &[ZoneCode] {
        &self.zones
    }

    pub fn index_of(&self, zone: &ZoneCode) -> Option<usize> {
        self.zones.iter().position(|z| z == zone)
    }

    pub fn contains(&self, zone: &ZoneCode) -> bool {
        self.index_of(zone).is_some()
    }

    pub fn get(&self, from: &ZoneCode, to: &ZoneCode) -> Option<Price> {
        let i = self.index_of(from)?;
        let j = self.index_of(to)?;
        self.cells[i][j]
    }

    /// 写入单元格; 区域不在矩阵中返回 false
    pub fn set(&mut self, from: &ZoneCode, to: &ZoneCode, price: Option<Price>) -> bool {
        match (self.index_of(from), self.index_of(to)) {
            (Some(i), Some(j)) => {
                self.cells[i][j] = price;
                true
            }
            _ => false,
        }
    }

    /// 已填写价格的单元格数量
    pub fn filled_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| cell.is_some())
            .count()
    }

    /// 行列尺寸与区域数量一致
    pub fn is_well_formed(&self) -> bool {
        let n = self.zones.len();
        self.cells.len() == n && self.cells.iter().all(|row| row.len() == n)
    }

    /// 按 (from, to) 顺序展开为条目列表
    pub fn entries(&self) -> Vec<PriceMatrixEntry> {
        let mut entries = Vec::with_capacity(self.zones.len() * self.zones.len());
        for (i, from) in self.zones.iter().enumerate() {
            for (j, to) in self.zones.iter().enumerate() {
                entries.push(PriceMatrixEntry {
                    from_zone: *from,
                    to_zone: *to,
                    price: self.cells[i][j],
                });
            }
        }
        entries
    }
}
