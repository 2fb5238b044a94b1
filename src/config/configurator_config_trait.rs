// ==========================================
// 区域划分配置器 - 配置读取 Trait
// ==========================================
// 职责: 定义配置器所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::OrderingPolicy;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ConfiguratorConfigReader Trait
// ==========================================
// 用途: 配置器所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ConfiguratorConfigReader: Send + Sync {
    /// 获取区域名单顺序策略
    ///
    /// # 返回
    /// - OrderingPolicy::Strict: 只能追加下一槽位 / 移除最后槽位
    /// - OrderingPolicy::Relaxed: 任意顺序
    ///
    /// # 默认值
    /// - STRICT
    async fn get_ordering_policy(&self) -> Result<OrderingPolicy, Box<dyn Error>>;

    /// 获取区域数量上限
    ///
    /// # 默认值
    /// - 28（目录槽位总数）
    async fn get_max_zone_count(&self) -> Result<usize, Box<dyn Error>>;

    /// 获取地理数据占位值列表（逗号分隔）
    ///
    /// # 默认值
    /// - "",na,n/a,-,null,undefined,#n/a,none
    async fn get_placeholder_tokens(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 获取会话键
    ///
    /// # 默认值
    /// - vendor_zone_config
    async fn get_session_key(&self) -> Result<String, Box<dyn Error>>;

    /// 获取界面语言
    ///
    /// # 默认值
    /// - zh-CN
    async fn get_locale(&self) -> Result<String, Box<dyn Error>>;
}
