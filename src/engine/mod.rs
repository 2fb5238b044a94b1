// ==========================================
// 区域划分配置器 - 引擎层
// ==========================================
// 职责: 实现区域划分与价格矩阵的业务规则
// 红线: Engine 不访问数据库, 只修改传入的会话值
// ==========================================

pub mod confirm;
pub mod error;
pub mod geography_index;
pub mod lifecycle;
pub mod partition;
pub mod price_matrix;
pub mod roster;

// 重导出核心引擎
pub use confirm::{AlwaysConfirm, AlwaysDecline, ConfirmationHandler, ConfirmationPrompt};
pub use error::{ZoneError, ZoneResult};
pub use geography_index::GeographyIndex;
pub use lifecycle::{SaveOutcome, SaveReport, ZoneLifecycleWorkflow};
pub use partition::{PartitionEngine, ToggleOutcome};
pub use price_matrix::{MatrixError, MatrixImportReport, MatrixResult, PriceMatrixBuilder, SkippedCell};
pub use roster::ZoneRosterController;
