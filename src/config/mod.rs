// ==========================================
// 区域划分配置器 - 配置层
// ==========================================
// 职责: 配置器运行参数管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod configurator_config;
pub mod configurator_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use configurator_config::{ConfiguratorConfig, DEFAULT_LOCALE, DEFAULT_SESSION_KEY};
pub use configurator_config_trait::ConfiguratorConfigReader;
