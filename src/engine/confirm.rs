// ==========================================
// 区域划分配置器 - 人工确认接口
// ==========================================
// 破坏性操作（删除空区域 / 大区耗尽级联删除 / 覆盖导入价格）
// 必须经操作员同步确认; 取消时会话保持提示前原状
// ==========================================

use crate::domain::types::{Region, ZoneCode};
use std::fmt;

/// 确认提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationPrompt {
    /// 大区已无可分配城市, 删除当前空区域
    DeleteEmptyZone { zone: ZoneCode },
    /// 大区耗尽, 批量删除其余空区域
    RegionExhausted { region: Region, zones: Vec<ZoneCode> },
    /// 导入 CSV 将覆盖已填写的价格
    OverwritePrices { filled_cells: usize },
}

impl fmt::Display for ConfirmationPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmationPrompt::DeleteEmptyZone { zone } => {
                write!(f, "大区已无可分配城市, 是否删除空区域 {}?", zone)
            }
            ConfirmationPrompt::RegionExhausted { region, zones } => {
                let codes: Vec<String> = zones.iter().map(|z| z.to_string()).collect();
                write!(
                    f,
                    "大区 {} 的城市已全部分配, 是否删除空区域 [{}]?",
                    region,
                    codes.join(", ")
                )
            }
            ConfirmationPrompt::OverwritePrices { filled_cells } => {
                write!(f, "导入将覆盖已填写的 {} 个价格, 是否继续?", filled_cells)
            }
        }
    }
}

// ==========================================
// ConfirmationHandler Trait
// ==========================================
/// 同步确认处理器
///
/// 返回 true 表示确认, false 表示取消
pub trait ConfirmationHandler {
    fn confirm(&self, prompt: &ConfirmationPrompt) -> bool;
}

impl<F> ConfirmationHandler for F
where
    F: Fn(&ConfirmationPrompt) -> bool,
{
    fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        self(prompt)
    }
}

/// 总是确认
pub struct AlwaysConfirm;

impl ConfirmationHandler for AlwaysConfirm {
    fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        tracing::debug!(%prompt, "自动确认");
        true
    }
}

/// 总是取消
pub struct AlwaysDecline;

impl ConfirmationHandler for AlwaysDecline {
    fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        tracing::debug!(%prompt, "自动取消");
        false
    }
}
