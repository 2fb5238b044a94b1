use crate::domain::types::{catalogue_size, OrderingPolicy};
use crate::engine::geography_index::DEFAULT_PLACEHOLDER_TOKENS;
use serde::{Deserialize, Serialize};

/// 默认会话键
pub const DEFAULT_SESSION_KEY: &str = "vendor_zone_config";

/// 默认界面语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// 配置器运行参数（由 config_kv 解析得到）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguratorConfig {
    /// 区域名单顺序策略
    #[serde(default)]
    pub ordering_policy: OrderingPolicy,

    /// 区域数量上限（不超过目录槽位数）
    pub max_zone_count: usize,

    /// 地理数据占位值
    pub placeholder_tokens: Vec<String>,

    /// 会话快照 / 交接载荷的键
    pub session_key: String,

    pub locale: String,
}

impl Default for ConfiguratorConfig {
    fn default() -> Self {
        Self {
            ordering_policy: OrderingPolicy::Strict,
            max_zone_count: catalogue_size(),
            placeholder_tokens: DEFAULT_PLACEHOLDER_TOKENS
                .iter()
                .map(|t| t.to_string())
                .collect(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}
