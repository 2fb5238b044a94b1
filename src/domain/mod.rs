// ==========================================
// 区域划分配置器 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值对象、会话快照格式
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod geo;
pub mod matrix;
pub mod session;
pub mod types;
pub mod zone;

// 重导出核心类型
pub use geo::{GeoRecord, RawGeoRecord};
pub use matrix::{Price, PriceError, PriceMatrix, PriceMatrixEntry, PRICE_MAX_MILLIS};
pub use session::{ConfiguratorSession, OnboardingHandoff, SESSION_SCHEMA_VERSION};
pub use types::{
    catalogue_size, CityKey, OrderingPolicy, Region, SessionPhase, UnknownZoneCode, ZoneCode,
};
pub use zone::{LeftoverPool, Zone, ZoneRecord};
