// ==========================================
// 区域划分配置器 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 所有错误同步返回, 返回错误时会话保持原状
// ==========================================

use crate::domain::types::{CityKey, Region, SessionPhase, ZoneCode};
use crate::i18n::{t, t_with_args};
use thiserror::Error;

/// 区域划分引擎错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ZoneError {
    // ===== 加载状态 =====
    #[error("地理数据尚未加载完成")]
    GeographyNotLoaded,

    // ===== 顺序违反 =====
    #[error("区域选择顺序违反: {code} (下一个可选: {})", display_opt(.expected))]
    SelectOrderViolation {
        code: ZoneCode,
        expected: Option<ZoneCode>,
    },

    #[error("区域移除顺序违反: {code} (只能移除最后选择的: {})", display_opt(.last))]
    DeselectOrderViolation {
        code: ZoneCode,
        last: Option<ZoneCode>,
    },

    #[error("区域已选择: {0}")]
    AlreadySelected(ZoneCode),

    #[error("区域未选择: {0}")]
    NotSelected(ZoneCode),

    #[error("区域数量已达上限: {max}")]
    ZoneLimitReached { max: usize },

    // ===== 区域 / 城市 =====
    #[error("区域下标不存在: {0}")]
    ZoneNotFound(usize),

    #[error("区域已完成, 需先重新打开: {0}")]
    ZoneLocked(ZoneCode),

    #[error("城市不属于区域所在大区: zone={code}, city={city}")]
    CityNotInRegion { code: ZoneCode, city: CityKey },

    #[error("城市已被其他区域占用: city={city}, owner={owner}")]
    CityOwnedElsewhere { city: CityKey, owner: ZoneCode },

    #[error("大区内不存在该州: region={region}, state={state}")]
    UnknownState { region: Region, state: String },

    // ===== 生命周期 =====
    #[error("区域为空, 请至少分配一个城市: {0}")]
    EmptyZone(ZoneCode),

    #[error("区域导航被锁定, 前序区域尚未完成: target={0}")]
    NavigationLocked(ZoneCode),

    #[error("当前阶段不允许该操作: expected={expected}, actual={actual}")]
    PhaseViolation {
        expected: SessionPhase,
        actual: SessionPhase,
    },

    #[error("区域划分尚不能定稿: {0}")]
    NotReadyToFinalize(String),

    // ===== 不变量 =====
    #[error("会话不变量被破坏: {0}")]
    InvariantViolation(String),
}

impl ZoneError {
    /// 面向操作员的本地化提示
    pub fn user_message(&self) -> String {
        match self {
            ZoneError::SelectOrderViolation { code, expected } => {
                let code = code.to_string();
                let expected = display_opt(expected);
                t_with_args(
                    "zone.select_order_violation",
                    &[("code", code.as_str()), ("expected", expected.as_str())],
                )
            }
            ZoneError::DeselectOrderViolation { code, last } => {
                let code = code.to_string();
                let last = display_opt(last);
                t_with_args(
                    "zone.deselect_order_violation",
                    &[("code", code.as_str()), ("last", last.as_str())],
                )
            }
            ZoneError::EmptyZone(code) => {
                let code = code.to_string();
                t_with_args("zone.empty_zone", &[("code", code.as_str())])
            }
            ZoneError::NavigationLocked(code) => {
                let code = code.to_string();
                t_with_args("zone.navigation_locked", &[("code", code.as_str())])
            }
            ZoneError::GeographyNotLoaded => t("zone.geography_not_loaded"),
            other => other.to_string(),
        }
    }
}

fn display_opt(code: &Option<ZoneCode>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Result 类型别名
pub type ZoneResult<T> = Result<T, ZoneError>;
