// ==========================================
// 区域划分配置器 - 仓储层
// ==========================================
// 职责: 数据访问, 不含业务逻辑
// 红线: Repository 不含引擎规则, 只做快照读写
// ==========================================

pub mod error;
pub mod handoff_repo;
pub mod session_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use handoff_repo::{HandoffRecord, HandoffRepository};
pub use session_repo::SessionRepository;
