// ==========================================
// 区域划分配置器 - 应用层
// ==========================================
// 职责: 组装数据库、配置与 API, 供宿主程序持有
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
