// ==========================================
// 区域划分配置器 - API 层
// ==========================================
// 职责: 提供操作员门面接口, 供界面层调用
// ==========================================

pub mod configurator_api;
pub mod error;

// 重导出核心类型
pub use configurator_api::{ConfiguratorApi, GeographySummary, MatrixImportOutcome};
pub use error::{ApiError, ApiResult};
