// ==========================================
// 区域划分配置器 - 核心库
// ==========================================
// 系统定位: 货运供应商入驻流程中的服务区域划分与价格矩阵配置
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 会话快照与交接载荷
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 地理数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 操作员门面
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CityKey, OrderingPolicy, Region, SessionPhase, ZoneCode};

// 领域实体
pub use domain::{
    ConfiguratorSession, OnboardingHandoff, Price, PriceMatrix, PriceMatrixEntry, Zone, ZoneRecord,
};

// 引擎
pub use engine::{
    GeographyIndex, PartitionEngine, PriceMatrixBuilder, ZoneLifecycleWorkflow, ZoneRosterController,
};

// API
pub use api::{ApiError, ApiResult, ConfiguratorApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "货运区域划分与价格矩阵配置器";
